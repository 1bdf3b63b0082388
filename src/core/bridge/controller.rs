//! Per-call bridge controller.
//!
//! One [`CallBridge`] per telephony connection. All state transitions
//! and forwarding decisions for a call run through its two `handle_*`
//! methods, which the owning task calls from a single `select!` loop —
//! a telephony event and an agent event for the same call can never
//! race on `state` or the stream id. Suspension points (signed-URL
//! fetch, agent connect, channel sends) block only this call's loop.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::session::{BridgeState, Session};
use super::translate;
use crate::core::agent::client::{AgentConnector, AgentEvent, AgentHandle};
use crate::core::agent::config::AgentAudioFormat;
use crate::core::agent::messages::{AgentInbound, AgentOutbound, ConversationInitiation};
use crate::core::telephony::messages::{TelephonyInbound, TelephonyRoute};

/// Bridge controller for one call.
pub struct CallBridge {
    call_id: String,
    session: Session,
    agent_audio_format: AgentAudioFormat,
    connector: Arc<dyn AgentConnector>,
    telephony_tx: mpsc::Sender<TelephonyRoute>,
    agent_event_tx: mpsc::Sender<AgentEvent>,
    agent: Option<AgentHandle>,
}

impl CallBridge {
    /// # Arguments
    ///
    /// * `call_id` - correlation id for logs, assigned before the
    ///   telephony leg names its stream
    /// * `connector` - opens the agent leg when the start event arrives
    /// * `agent_audio_format` - format the agent emits, decides whether
    ///   agent audio is transcoded before playback
    /// * `telephony_tx` - channel to the telephony sender task
    /// * `agent_event_tx` - handed to the connector so agent events
    ///   funnel back into this call's loop
    pub fn new(
        call_id: String,
        connector: Arc<dyn AgentConnector>,
        agent_audio_format: AgentAudioFormat,
        telephony_tx: mpsc::Sender<TelephonyRoute>,
        agent_event_tx: mpsc::Sender<AgentEvent>,
    ) -> Self {
        Self {
            call_id,
            session: Session::new(),
            agent_audio_format,
            connector,
            telephony_tx,
            agent_event_tx,
            agent: None,
        }
    }

    pub fn state(&self) -> BridgeState {
        self.session.state()
    }

    pub fn stream_sid(&self) -> Option<&str> {
        self.session.stream_sid()
    }

    /// Handle one inbound telephony event. Returns false when the call
    /// is over and the loop should stop.
    pub async fn handle_telephony(&mut self, event: TelephonyInbound) -> bool {
        match event {
            TelephonyInbound::Connected => {
                tracing::debug!(call_id = %self.call_id, "Telephony media stream attached");
                true
            }
            TelephonyInbound::Start { start } => self.handle_start(start).await,
            TelephonyInbound::Media { media } => {
                self.handle_caller_audio(media.payload).await;
                true
            }
            TelephonyInbound::Stop => {
                if self.session.is_closed() {
                    tracing::debug!(call_id = %self.call_id, "Stop after teardown, ignoring");
                    return true;
                }
                tracing::info!(call_id = %self.call_id, "Telephony stop event, ending call");
                self.shutdown().await;
                false
            }
            TelephonyInbound::Unknown => {
                tracing::debug!(call_id = %self.call_id, "Unknown telephony event, discarding");
                true
            }
        }
    }

    /// Handle one event funneled from the agent leg. Returns false when
    /// the call is over and the loop should stop.
    pub async fn handle_agent(&mut self, event: AgentEvent) -> bool {
        match event {
            AgentEvent::Inbound(message) => self.handle_agent_message(message).await,
            AgentEvent::Closed => {
                if !self.session.is_closed() {
                    tracing::info!(call_id = %self.call_id, "Agent leg closed, ending call");
                }
                self.shutdown().await;
                false
            }
            AgentEvent::Errored(reason) => {
                if !self.session.is_closed() {
                    tracing::warn!(call_id = %self.call_id, "Agent leg error: {}", reason);
                }
                self.shutdown().await;
                false
            }
        }
    }

    /// Tear down both legs. Safe to call more than once; the second and
    /// later calls are no-ops.
    pub async fn shutdown(&mut self) {
        if !self.session.begin_closing() {
            return;
        }
        if let Some(mut agent) = self.agent.take() {
            agent.close();
        }
        let _ = self.telephony_tx.send(TelephonyRoute::Close).await;
        self.session.mark_closed();
        tracing::info!(call_id = %self.call_id, "Call session closed");
    }

    async fn handle_start(&mut self, start: crate::core::telephony::messages::StartPayload) -> bool {
        if !self
            .session
            .begin_connecting(start.stream_sid, start.custom_parameters)
        {
            return true;
        }

        tracing::info!(
            call_id = %self.call_id,
            stream_sid = self.session.stream_sid().unwrap_or_default(),
            "Call started, connecting agent leg"
        );

        match self
            .connector
            .connect(&self.call_id, self.agent_event_tx.clone())
            .await
        {
            Ok(handle) => {
                self.agent = Some(handle);
                self.session.mark_streaming();

                let initiation =
                    ConversationInitiation::from_parameters(self.session.take_parameters());
                if let Err(e) = self
                    .send_to_agent(AgentOutbound::Initiation(initiation))
                    .await
                {
                    tracing::warn!(call_id = %self.call_id, "Failed to send initiation: {}", e);
                    self.shutdown().await;
                    return false;
                }
                tracing::info!(call_id = %self.call_id, "Bridge streaming");
                true
            }
            Err(e) => {
                tracing::error!(call_id = %self.call_id, "Agent leg unavailable: {}", e);
                self.shutdown().await;
                false
            }
        }
    }

    async fn handle_caller_audio(&mut self, payload: String) {
        match self.session.state() {
            BridgeState::Streaming => {
                let chunk = translate::media_to_user_audio(&payload);
                if let Err(e) = self.send_to_agent(chunk).await {
                    tracing::warn!(call_id = %self.call_id, "Dropping caller audio: {}", e);
                }
            }
            BridgeState::Init | BridgeState::Connecting => {
                // Early media: the agent leg is not up yet. Dropped
                // rather than queued; the platform's own contract puts
                // start before media.
                tracing::warn!(
                    call_id = %self.call_id,
                    state = self.session.state().as_str(),
                    "Caller audio before start completed, dropping"
                );
            }
            BridgeState::Closing | BridgeState::Closed => {
                tracing::debug!(call_id = %self.call_id, "Caller audio after teardown, dropping");
            }
        }
    }

    async fn handle_agent_message(&mut self, message: AgentInbound) -> bool {
        match message {
            AgentInbound::Audio { audio, audio_event } => {
                self.handle_agent_audio(audio.as_ref(), audio_event.as_ref())
                    .await;
            }
            AgentInbound::Interruption { .. } => {
                if let Some(sid) = self.session.stream_sid() {
                    tracing::debug!(call_id = %self.call_id, "Barge-in, clearing telephony buffer");
                    let clear = translate::interruption_to_clear(sid);
                    let _ = self
                        .telephony_tx
                        .send(TelephonyRoute::Outgoing(clear))
                        .await;
                } else {
                    tracing::debug!(call_id = %self.call_id, "Interruption before start, ignoring");
                }
            }
            AgentInbound::Ping { ping_event } => {
                // Replied unconditionally and immediately; a missed pong
                // surfaces later as an agent-leg timeout.
                let pong = translate::ping_reply(ping_event.event_id);
                if let Err(e) = self.send_to_agent(pong).await {
                    tracing::debug!(call_id = %self.call_id, "Failed to send pong: {}", e);
                }
            }
            AgentInbound::AgentResponse {
                agent_response_event,
            } => {
                tracing::debug!(
                    call_id = %self.call_id,
                    event = ?agent_response_event,
                    "Agent response transcript"
                );
            }
            AgentInbound::UserTranscript {
                user_transcription_event,
            } => {
                tracing::debug!(
                    call_id = %self.call_id,
                    event = ?user_transcription_event,
                    "Caller transcript"
                );
            }
            AgentInbound::ConversationInitiationMetadata { .. } => {
                tracing::debug!(call_id = %self.call_id, "Conversation initiation metadata");
            }
            AgentInbound::Unknown => {
                tracing::debug!(call_id = %self.call_id, "Unknown agent message, discarding");
            }
        }
        true
    }

    async fn handle_agent_audio(
        &self,
        audio: Option<&crate::core::agent::messages::AudioPayload>,
        audio_event: Option<&crate::core::agent::messages::AudioEventPayload>,
    ) {
        // Agent audio must never reach the telephony leg without a
        // known stream id.
        let Some(sid) = self.session.stream_sid() else {
            tracing::warn!(call_id = %self.call_id, "Agent audio before start, dropping");
            return;
        };
        if self.session.is_closed() {
            tracing::debug!(call_id = %self.call_id, "Agent audio after teardown, dropping");
            return;
        }

        let Some(chunk) = translate::agent_audio_chunk(audio, audio_event) else {
            tracing::warn!(call_id = %self.call_id, "Agent audio envelope without a chunk");
            return;
        };

        match translate::agent_audio_to_media(chunk, sid, self.agent_audio_format) {
            Ok(media) => {
                let _ = self
                    .telephony_tx
                    .send(TelephonyRoute::Outgoing(media))
                    .await;
            }
            Err(e) => {
                tracing::warn!(call_id = %self.call_id, "Dropping undecodable agent audio: {}", e);
            }
        }
    }

    async fn send_to_agent(&self, message: AgentOutbound) -> crate::errors::BridgeResult<()> {
        match &self.agent {
            Some(handle) => handle.send(message).await,
            None => Err(crate::errors::BridgeError::AgentClosed),
        }
    }
}
