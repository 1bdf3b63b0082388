//! Pure protocol translation between the two legs.
//!
//! Synchronous mapping functions with no I/O and no shared state, safe
//! to call concurrently from any number of call sessions. The bridge
//! controller decides *when* to translate; these functions decide *what*
//! the other leg sees.

use base64::prelude::*;
use serde_json::Value;

use crate::core::agent::config::AgentAudioFormat;
use crate::core::agent::messages::{AgentOutbound, AudioEventPayload, AudioPayload, Pong};
use crate::core::audio::mulaw;
use crate::core::telephony::messages::{OutboundMediaPayload, TelephonyOutbound};
use crate::errors::{BridgeError, BridgeResult};

/// Telephony `media` -> agent user-audio chunk. The base64 payload is
/// forwarded unchanged: caller audio is already in the agent's expected
/// input encoding.
pub fn media_to_user_audio(payload: &str) -> AgentOutbound {
    AgentOutbound::UserAudioChunk {
        user_audio_chunk: payload.to_string(),
    }
}

/// Locate the audio chunk in an agent `audio` envelope. Both protocol
/// shapes are checked; first match wins.
pub fn agent_audio_chunk<'a>(
    audio: Option<&'a AudioPayload>,
    audio_event: Option<&'a AudioEventPayload>,
) -> Option<&'a str> {
    audio
        .map(|a| a.chunk.as_str())
        .or_else(|| audio_event.map(|e| e.audio_base_64.as_str()))
}

/// Agent audio chunk -> telephony `media` envelope, transcoding when the
/// agent's output format differs from the telephony convention.
pub fn agent_audio_to_media(
    chunk: &str,
    stream_sid: &str,
    format: AgentAudioFormat,
) -> BridgeResult<TelephonyOutbound> {
    let payload = match format {
        AgentAudioFormat::Ulaw8000 => chunk.to_string(),
        AgentAudioFormat::Pcm16000 => transcode_pcm16000_to_ulaw(chunk)?,
    };

    Ok(TelephonyOutbound::Media {
        stream_sid: stream_sid.to_string(),
        media: OutboundMediaPayload { payload },
    })
}

/// Agent interruption -> telephony `clear` envelope (barge-in).
pub fn interruption_to_clear(stream_sid: &str) -> TelephonyOutbound {
    TelephonyOutbound::Clear {
        stream_sid: stream_sid.to_string(),
    }
}

/// Agent ping -> agent pong echoing the event id.
pub fn ping_reply(event_id: Value) -> AgentOutbound {
    AgentOutbound::Pong(Pong::new(event_id))
}

/// Decode a base64 chunk of 16 kHz linear PCM, decimate it to the
/// telephony rate, and compand to µ-law.
fn transcode_pcm16000_to_ulaw(chunk: &str) -> BridgeResult<String> {
    let bytes = BASE64_STANDARD
        .decode(chunk)
        .map_err(|e| BridgeError::Transcode(e.to_string()))?;
    let samples = mulaw::pcm16le_to_samples(&bytes);
    let downsampled = mulaw::decimate(&samples, 2);
    Ok(BASE64_STANDARD.encode(mulaw::encode(&downsampled)))
}
