//! Agent-leg WebSocket client.
//!
//! Owns the outbound connection to the conversational AI service for one
//! call. A spawned reader task decodes inbound JSON into [`AgentInbound`]
//! values and funnels them to the call's single serialized event loop;
//! outbound messages flow through an mpsc channel so sends never contend
//! with reads.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use super::messages::{AgentInbound, AgentOutbound};
use super::signed_url::fetch_signed_url;
use crate::errors::{BridgeError, BridgeResult};

/// Channel capacity for agent-leg message queues.
const AGENT_CHANNEL_CAPACITY: usize = 256;

/// Events funneled from the agent leg into the call's event loop.
#[derive(Debug)]
pub enum AgentEvent {
    /// A decoded inbound message.
    Inbound(AgentInbound),
    /// The agent closed its side of the connection.
    Closed,
    /// The connection failed at runtime.
    Errored(String),
}

/// Handle to a live agent-leg connection.
///
/// Dropping or closing the handle tears the connection down; closing an
/// already-closed handle is a no-op.
pub struct AgentHandle {
    outbound: Option<mpsc::Sender<AgentOutbound>>,
    reader: Option<JoinHandle<()>>,
}

impl AgentHandle {
    /// Assemble a handle from its channel and task. Tests use this with
    /// a bare channel and no task to observe outbound traffic.
    pub fn from_parts(
        outbound: mpsc::Sender<AgentOutbound>,
        reader: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            outbound: Some(outbound),
            reader,
        }
    }

    /// Queue a message for the agent leg.
    pub async fn send(&self, message: AgentOutbound) -> BridgeResult<()> {
        let tx = self.outbound.as_ref().ok_or(BridgeError::AgentClosed)?;
        tx.send(message)
            .await
            .map_err(|e| BridgeError::AgentSend(e.to_string()))
    }

    /// Tear down the connection. Safe to call more than once.
    pub fn close(&mut self) {
        self.outbound.take();
        if let Some(handle) = self.reader.take() {
            handle.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.outbound.is_none()
    }
}

impl Drop for AgentHandle {
    fn drop(&mut self) {
        self.close();
    }
}

/// Opens the agent leg for one call.
///
/// Abstracted behind a trait so the bridge controller can be driven by a
/// mock connection in tests.
#[async_trait]
pub trait AgentConnector: Send + Sync {
    /// Open the agent leg, wiring inbound events into `events`. Returns
    /// once the connection is established and ready for the initiation
    /// payload.
    async fn connect(
        &self,
        call_id: &str,
        events: mpsc::Sender<AgentEvent>,
    ) -> BridgeResult<AgentHandle>;
}

/// Production connector: fetches a signed URL from the provider, then
/// opens the WebSocket and spawns the per-call reader task.
pub struct ElevenLabsConnector {
    http: reqwest::Client,
    api_base_url: String,
    api_key: String,
    agent_id: String,
}

impl ElevenLabsConnector {
    pub fn new(
        http: reqwest::Client,
        api_base_url: String,
        api_key: String,
        agent_id: String,
    ) -> Self {
        Self {
            http,
            api_base_url,
            api_key,
            agent_id,
        }
    }
}

#[async_trait]
impl AgentConnector for ElevenLabsConnector {
    async fn connect(
        &self,
        call_id: &str,
        events: mpsc::Sender<AgentEvent>,
    ) -> BridgeResult<AgentHandle> {
        let signed_url =
            fetch_signed_url(&self.http, &self.api_base_url, &self.api_key, &self.agent_id).await?;

        let target = url::Url::parse(&signed_url)
            .map_err(|e| BridgeError::AgentConnect(format!("invalid signed url: {e}")))?;

        let (ws_stream, _response) = tokio_tungstenite::connect_async(target.as_str())
            .await
            .map_err(|e| BridgeError::AgentConnect(e.to_string()))?;

        tracing::info!(call_id, "Agent leg connected");

        let (mut ws_sink, mut ws_stream) = ws_stream.split();
        let (tx, mut rx) = mpsc::channel::<AgentOutbound>(AGENT_CHANNEL_CAPACITY);

        let task_call_id = call_id.to_string();
        let reader = tokio::spawn(async move {
            loop {
                tokio::select! {
                    // Outbound messages queued by the controller
                    Some(message) = rx.recv() => {
                        let json = match message.to_json() {
                            Ok(j) => j,
                            Err(e) => {
                                tracing::error!(call_id = %task_call_id, "Failed to serialize agent message: {}", e);
                                continue;
                            }
                        };
                        if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                            tracing::warn!(call_id = %task_call_id, "Agent send failed: {}", e);
                            let _ = events.send(AgentEvent::Errored(e.to_string())).await;
                            break;
                        }
                    }

                    // Inbound messages from the agent
                    msg = ws_stream.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                match serde_json::from_str::<AgentInbound>(&text) {
                                    Ok(event) => {
                                        if events.send(AgentEvent::Inbound(event)).await.is_err() {
                                            // Controller is gone; stop reading.
                                            break;
                                        }
                                    }
                                    Err(e) => {
                                        tracing::warn!(
                                            call_id = %task_call_id,
                                            "Unparseable agent message, discarding: {}", e
                                        );
                                    }
                                }
                            }
                            Some(Ok(Message::Ping(data))) => {
                                if let Err(e) = ws_sink.send(Message::Pong(data)).await {
                                    tracing::warn!(call_id = %task_call_id, "Failed to send WS pong: {}", e);
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                tracing::info!(call_id = %task_call_id, "Agent leg closed by remote");
                                let _ = events.send(AgentEvent::Closed).await;
                                break;
                            }
                            Some(Err(e)) => {
                                tracing::warn!(call_id = %task_call_id, "Agent leg error: {}", e);
                                let _ = events.send(AgentEvent::Errored(e.to_string())).await;
                                break;
                            }
                            Some(Ok(_)) => {}
                        }
                    }

                    else => break,
                }
            }
            tracing::debug!(call_id = %task_call_id, "Agent leg task ended");
        });

        Ok(AgentHandle::from_parts(tx, Some(reader)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handle_close_is_idempotent() {
        let (tx, _rx) = mpsc::channel(4);
        let mut handle = AgentHandle::from_parts(tx, None);
        assert!(!handle.is_closed());
        handle.close();
        assert!(handle.is_closed());
        handle.close();
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn send_after_close_fails() {
        let (tx, _rx) = mpsc::channel(4);
        let mut handle = AgentHandle::from_parts(tx, None);
        handle.close();
        let result = handle
            .send(AgentOutbound::UserAudioChunk {
                user_audio_chunk: "QUJD".to_string(),
            })
            .await;
        assert!(matches!(result, Err(BridgeError::AgentClosed)));
    }
}
