//! Telephony-leg WebSocket message types.
//!
//! JSON envelopes exchanged with the call platform's media stream,
//! keyed by an `event` field. Unknown events collapse into
//! [`TelephonyInbound::Unknown`] so protocol additions never break a
//! live call.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// Incoming Messages (Telephony -> Bridge)
// =============================================================================

/// Inbound messages from the telephony leg.
#[derive(Debug, Deserialize)]
#[serde(tag = "event")]
pub enum TelephonyInbound {
    /// Sent once when the platform attaches the media stream. No state
    /// change; the call does not exist until `start`.
    #[serde(rename = "connected")]
    Connected,

    /// Start of call: assigns the stream id and carries the custom
    /// parameters consumed at agent initiation.
    #[serde(rename = "start")]
    Start { start: StartPayload },

    /// A base64 caller-audio chunk.
    #[serde(rename = "media")]
    Media { media: MediaPayload },

    /// End of call.
    #[serde(rename = "stop")]
    Stop,

    /// Forward compatibility: logged and discarded.
    #[serde(other)]
    Unknown,
}

/// Payload of the `start` event.
#[derive(Debug, Deserialize)]
pub struct StartPayload {
    #[serde(rename = "streamSid")]
    pub stream_sid: String,
    #[serde(rename = "customParameters", default)]
    pub custom_parameters: HashMap<String, String>,
}

/// Payload of an inbound `media` event.
#[derive(Debug, Deserialize)]
pub struct MediaPayload {
    pub payload: String,
}

// =============================================================================
// Outgoing Messages (Bridge -> Telephony)
// =============================================================================

/// Outbound messages to the telephony leg.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum TelephonyOutbound {
    /// Agent audio for playback, already in telephony encoding.
    #[serde(rename = "media")]
    Media {
        #[serde(rename = "streamSid")]
        stream_sid: String,
        media: OutboundMediaPayload,
    },

    /// Discard queued playback immediately (caller barge-in).
    #[serde(rename = "clear")]
    Clear {
        #[serde(rename = "streamSid")]
        stream_sid: String,
    },
}

impl TelephonyOutbound {
    /// Serialize to the wire form sent on the telephony leg.
    pub fn to_json(&self) -> crate::errors::BridgeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Payload of an outbound `media` event.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct OutboundMediaPayload {
    pub payload: String,
}

// =============================================================================
// Message Routing
// =============================================================================

/// Routing for the telephony sender task.
#[derive(Debug)]
pub enum TelephonyRoute {
    /// JSON envelope to serialize and send.
    Outgoing(TelephonyOutbound),
    /// Close the telephony WebSocket.
    Close,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_event_deserializes() {
        let json = r#"{
            "event": "start",
            "sequenceNumber": "1",
            "start": {
                "streamSid": "SM123",
                "accountSid": "AC000",
                "customParameters": {"prompt": "Be brief.", "caller_name": "Ada"}
            },
            "streamSid": "SM123"
        }"#;

        let msg: TelephonyInbound = serde_json::from_str(json).expect("should deserialize");
        match msg {
            TelephonyInbound::Start { start } => {
                assert_eq!(start.stream_sid, "SM123");
                assert_eq!(
                    start.custom_parameters.get("prompt").map(String::as_str),
                    Some("Be brief.")
                );
            }
            _ => panic!("expected Start variant"),
        }
    }

    #[test]
    fn start_without_parameters_deserializes() {
        let json = r#"{"event": "start", "start": {"streamSid": "SM1"}}"#;
        let msg: TelephonyInbound = serde_json::from_str(json).expect("should deserialize");
        match msg {
            TelephonyInbound::Start { start } => assert!(start.custom_parameters.is_empty()),
            _ => panic!("expected Start variant"),
        }
    }

    #[test]
    fn media_event_deserializes() {
        let json = r#"{"event": "media", "media": {"track": "inbound", "payload": "QUJD"}}"#;
        let msg: TelephonyInbound = serde_json::from_str(json).expect("should deserialize");
        match msg {
            TelephonyInbound::Media { media } => assert_eq!(media.payload, "QUJD"),
            _ => panic!("expected Media variant"),
        }
    }

    #[test]
    fn unknown_event_is_tolerated() {
        let msg: TelephonyInbound =
            serde_json::from_str(r#"{"event": "mark", "mark": {"name": "m1"}}"#)
                .expect("should deserialize");
        assert!(matches!(msg, TelephonyInbound::Unknown));
    }

    #[test]
    fn outbound_media_envelope_is_exact() {
        let msg = TelephonyOutbound::Media {
            stream_sid: "SM123".to_string(),
            media: OutboundMediaPayload {
                payload: "QUJD".to_string(),
            },
        };
        let json = msg.to_json().expect("should serialize");
        assert_eq!(
            json,
            r#"{"event":"media","streamSid":"SM123","media":{"payload":"QUJD"}}"#
        );
    }

    #[test]
    fn outbound_clear_envelope_is_exact() {
        let msg = TelephonyOutbound::Clear {
            stream_sid: "SM123".to_string(),
        };
        let json = msg.to_json().expect("should serialize");
        assert_eq!(json, r#"{"event":"clear","streamSid":"SM123"}"#);
    }
}
