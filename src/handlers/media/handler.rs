//! Telephony media-stream WebSocket handler.
//!
//! Accepts the call platform's WebSocket, then runs one [`CallBridge`]
//! for the lifetime of the call: telephony frames arrive on the socket,
//! agent events arrive on the funnel channel, and a dedicated sender
//! task serializes everything going back to the platform. Each call is
//! an independent task tree; nothing is shared between calls.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::select;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::core::agent::client::{AgentEvent, ElevenLabsConnector};
use crate::core::bridge::CallBridge;
use crate::core::telephony::messages::{TelephonyInbound, TelephonyRoute};
use crate::state::AppState;

/// Channel buffer size for per-call message queues.
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Media-stream WebSocket handler.
///
/// Upgrades the HTTP connection and hands the socket to a per-call
/// bridge task.
pub async fn media_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_media_stream(socket, state))
}

/// Run one call to completion.
async fn handle_media_stream(socket: WebSocket, state: Arc<AppState>) {
    let call_id = Uuid::new_v4().to_string();
    info!(call_id, "Telephony connection established");

    let (mut sender, mut receiver) = socket.split();
    let (telephony_tx, mut telephony_rx) = mpsc::channel::<TelephonyRoute>(CHANNEL_BUFFER_SIZE);
    let (agent_event_tx, mut agent_event_rx) = mpsc::channel::<AgentEvent>(CHANNEL_BUFFER_SIZE);

    // Sender task: the only writer on the telephony socket.
    let sender_call_id = call_id.clone();
    let sender_task = tokio::spawn(async move {
        while let Some(route) = telephony_rx.recv().await {
            let result = match route {
                TelephonyRoute::Outgoing(message) => match message.to_json() {
                    Ok(json) => sender.send(Message::Text(json.into())).await,
                    Err(e) => {
                        tracing::error!(call_id = %sender_call_id, "Failed to serialize telephony message: {}", e);
                        continue;
                    }
                },
                TelephonyRoute::Close => {
                    debug!(call_id = %sender_call_id, "Closing telephony WebSocket");
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            };

            if let Err(e) = result {
                warn!(call_id = %sender_call_id, "Telephony send failed: {}", e);
                break;
            }
        }
    });

    let connector = ElevenLabsConnector::new(
        state.http.clone(),
        state.config.elevenlabs_api_base_url.clone(),
        state.config.elevenlabs_api_key.clone(),
        state.config.elevenlabs_agent_id.clone(),
    );
    let mut bridge = CallBridge::new(
        call_id.clone(),
        Arc::new(connector),
        state.config.agent_audio_format,
        telephony_tx,
        agent_event_tx,
    );

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let event: TelephonyInbound = match serde_json::from_str(&text) {
                            Ok(event) => event,
                            Err(e) => {
                                warn!(call_id, "Unparseable telephony message, discarding: {}", e);
                                continue;
                            }
                        };
                        if !bridge.handle_telephony(event).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!(call_id, "Telephony leg closed by platform");
                        break;
                    }
                    Some(Ok(_)) => {
                        // Binary/ping/pong frames are not part of the
                        // media-stream protocol.
                        debug!(call_id, "Ignoring non-text telephony frame");
                    }
                    Some(Err(e)) => {
                        warn!(call_id, "Telephony WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        info!(call_id, "Telephony connection ended");
                        break;
                    }
                }
            }
            Some(event) = agent_event_rx.recv() => {
                if !bridge.handle_agent(event).await {
                    break;
                }
            }
        }
    }

    // Idempotent: a no-op when a stop event already tore the call down.
    bridge.shutdown().await;
    drop(bridge);
    let _ = sender_task.await;

    info!(call_id, "Call terminated");
}
