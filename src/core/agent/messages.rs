//! Agent-leg WebSocket message types.
//!
//! JSON envelopes exchanged with the conversational AI service over the
//! signed-URL WebSocket. Inbound messages are keyed by a `type` field;
//! unknown types collapse into [`AgentInbound::Unknown`] so protocol
//! evolution never breaks a live call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::{DEFAULT_FIRST_MESSAGE, DEFAULT_SYSTEM_PROMPT};

// =============================================================================
// Inbound Messages (Agent -> Bridge)
// =============================================================================

/// Inbound messages from the agent leg.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum AgentInbound {
    /// Synthesized agent audio. Two envelope shapes coexist in the wild:
    /// the chunk lives either in `audio.chunk` or in
    /// `audio_event.audio_base_64`. Both are decoded; first match wins.
    #[serde(rename = "audio")]
    Audio {
        #[serde(default)]
        audio: Option<AudioPayload>,
        #[serde(default)]
        audio_event: Option<AudioEventPayload>,
    },

    /// Caller barge-in: queued telephony playback must be discarded.
    #[serde(rename = "interruption")]
    Interruption {
        #[serde(default)]
        interruption_event: Option<Value>,
    },

    /// Keepalive probe. The bridge answers with a pong echoing the
    /// event id, directly on the agent leg.
    #[serde(rename = "ping")]
    Ping { ping_event: PingEvent },

    /// Agent-side transcript of its own reply. Informational only.
    #[serde(rename = "agent_response")]
    AgentResponse {
        #[serde(default)]
        agent_response_event: Option<Value>,
    },

    /// Transcript of the caller's speech. Informational only.
    #[serde(rename = "user_transcript")]
    UserTranscript {
        #[serde(default)]
        user_transcription_event: Option<Value>,
    },

    /// Conversation metadata sent once after initiation. Informational.
    #[serde(rename = "conversation_initiation_metadata")]
    ConversationInitiationMetadata {
        #[serde(default)]
        conversation_initiation_metadata_event: Option<Value>,
    },

    /// Forward compatibility: anything else is logged and discarded.
    #[serde(other)]
    Unknown,
}

/// Audio chunk in the `audio.chunk` envelope shape.
#[derive(Debug, Deserialize)]
pub struct AudioPayload {
    pub chunk: String,
}

/// Audio chunk in the `audio_event.audio_base_64` envelope shape.
#[derive(Debug, Deserialize)]
pub struct AudioEventPayload {
    pub audio_base_64: String,
    #[serde(default)]
    pub event_id: Option<Value>,
}

/// Ping payload. The event id is echoed verbatim in the pong, so it is
/// kept as a raw JSON value rather than assuming a number or a string.
#[derive(Debug, Deserialize)]
pub struct PingEvent {
    pub event_id: Value,
    #[serde(default)]
    pub ping_ms: Option<u64>,
}

// =============================================================================
// Outbound Messages (Bridge -> Agent)
// =============================================================================

/// Outbound messages to the agent leg.
///
/// Untagged because the audio-forward envelope carries no `type` field
/// in the agent protocol.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AgentOutbound {
    /// One-time initiation payload, sent when the leg becomes ready.
    Initiation(ConversationInitiation),

    /// Caller audio chunk, base64 payload forwarded unchanged.
    UserAudioChunk { user_audio_chunk: String },

    /// Reply to a ping, echoing its event id.
    Pong(Pong),
}

impl AgentOutbound {
    /// Serialize to the wire form sent on the agent leg.
    pub fn to_json(&self) -> crate::errors::BridgeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Pong envelope.
#[derive(Debug, Serialize)]
pub struct Pong {
    #[serde(rename = "type")]
    kind: &'static str,
    pub event_id: Value,
}

impl Pong {
    pub fn new(event_id: Value) -> Self {
        Self {
            kind: "pong",
            event_id,
        }
    }
}

/// `conversation_initiation_client_data` payload.
///
/// Built once per call from the custom parameters the telephony leg
/// supplied at start. All parameters are exposed as dynamic variables;
/// the `prompt` and `first_message` keys additionally override the agent
/// configuration, falling back to built-in defaults.
#[derive(Debug, Serialize)]
pub struct ConversationInitiation {
    #[serde(rename = "type")]
    kind: &'static str,
    pub dynamic_variables: HashMap<String, String>,
    pub conversation_config_override: ConversationConfigOverride,
}

#[derive(Debug, Serialize)]
pub struct ConversationConfigOverride {
    pub agent: AgentOverride,
}

#[derive(Debug, Serialize)]
pub struct AgentOverride {
    pub prompt: PromptOverride,
    pub first_message: String,
}

#[derive(Debug, Serialize)]
pub struct PromptOverride {
    pub prompt: String,
}

impl ConversationInitiation {
    /// Build the initiation payload from the call's custom parameters.
    pub fn from_parameters(parameters: HashMap<String, String>) -> Self {
        let prompt = parameters
            .get("prompt")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());
        let first_message = parameters
            .get("first_message")
            .cloned()
            .unwrap_or_else(|| DEFAULT_FIRST_MESSAGE.to_string());

        Self {
            kind: "conversation_initiation_client_data",
            dynamic_variables: parameters,
            conversation_config_override: ConversationConfigOverride {
                agent: AgentOverride {
                    prompt: PromptOverride { prompt },
                    first_message,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn audio_chunk_shape_deserializes() {
        let json = r#"{"type": "audio", "audio": {"chunk": "QUJD"}}"#;
        let msg: AgentInbound = serde_json::from_str(json).expect("should deserialize");
        match msg {
            AgentInbound::Audio { audio, audio_event } => {
                assert_eq!(audio.expect("chunk shape").chunk, "QUJD");
                assert!(audio_event.is_none());
            }
            _ => panic!("expected Audio variant"),
        }
    }

    #[test]
    fn audio_event_shape_deserializes() {
        let json = r#"{"type": "audio", "audio_event": {"audio_base_64": "QUJD", "event_id": 7}}"#;
        let msg: AgentInbound = serde_json::from_str(json).expect("should deserialize");
        match msg {
            AgentInbound::Audio { audio, audio_event } => {
                assert!(audio.is_none());
                assert_eq!(audio_event.expect("event shape").audio_base_64, "QUJD");
            }
            _ => panic!("expected Audio variant"),
        }
    }

    #[test]
    fn ping_preserves_event_id_type() {
        let msg: AgentInbound =
            serde_json::from_str(r#"{"type": "ping", "ping_event": {"event_id": "e1"}}"#)
                .expect("should deserialize");
        match msg {
            AgentInbound::Ping { ping_event } => {
                assert_eq!(ping_event.event_id, json!("e1"));
            }
            _ => panic!("expected Ping variant"),
        }
    }

    #[test]
    fn unknown_type_is_tolerated() {
        let msg: AgentInbound =
            serde_json::from_str(r#"{"type": "vad_score", "vad_score_event": {"vad_score": 0.9}}"#)
                .expect("should deserialize");
        assert!(matches!(msg, AgentInbound::Unknown));
    }

    #[test]
    fn user_audio_chunk_has_no_type_tag() {
        let msg = AgentOutbound::UserAudioChunk {
            user_audio_chunk: "QUJD".to_string(),
        };
        let json = serde_json::to_string(&msg).expect("should serialize");
        assert_eq!(json, r#"{"user_audio_chunk":"QUJD"}"#);
    }

    #[test]
    fn pong_echoes_event_id() {
        let msg = AgentOutbound::Pong(Pong::new(json!("e1")));
        let json = msg.to_json().expect("should serialize");
        assert_eq!(json, r#"{"type":"pong","event_id":"e1"}"#);
    }

    #[test]
    fn initiation_applies_defaults() {
        let init = ConversationInitiation::from_parameters(HashMap::new());
        let value = serde_json::to_value(&init).expect("should serialize");
        assert_eq!(value["type"], "conversation_initiation_client_data");
        assert_eq!(
            value["conversation_config_override"]["agent"]["prompt"]["prompt"],
            DEFAULT_SYSTEM_PROMPT
        );
        assert_eq!(
            value["conversation_config_override"]["agent"]["first_message"],
            DEFAULT_FIRST_MESSAGE
        );
    }

    #[test]
    fn initiation_forwards_custom_parameters() {
        let mut parameters = HashMap::new();
        parameters.insert("prompt".to_string(), "You are a pizza bot.".to_string());
        parameters.insert("caller_name".to_string(), "Ada".to_string());

        let init = ConversationInitiation::from_parameters(parameters);
        let value = serde_json::to_value(&init).expect("should serialize");
        assert_eq!(
            value["conversation_config_override"]["agent"]["prompt"]["prompt"],
            "You are a pizza bot."
        );
        assert_eq!(value["dynamic_variables"]["caller_name"], "Ada");
        // Absent keys still fall back.
        assert_eq!(
            value["conversation_config_override"]["agent"]["first_message"],
            DEFAULT_FIRST_MESSAGE
        );
    }
}
