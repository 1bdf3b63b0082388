//! Telephony media-stream WebSocket handling.

mod handler;

pub use handler::media_stream_handler;
