//! Media-stream WebSocket route configuration.

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::media_stream_handler;
use crate::state::AppState;

/// Create the media-stream WebSocket router
///
/// # Endpoint
///
/// `GET /media-stream` - WebSocket upgrade for one call's media stream.
///
/// # Protocol
///
/// After the upgrade, the call platform sends JSON envelopes keyed by
/// `event` (`connected`, `start`, `media`, `stop`); the bridge answers
/// with `media` and `clear` envelopes carrying the call's `streamSid`.
pub fn create_ws_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/media-stream", get(media_stream_handler))
        .layer(TraceLayer::new_for_http())
}
