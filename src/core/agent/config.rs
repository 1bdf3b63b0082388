//! Agent-leg configuration and defaults.

/// System prompt applied when the telephony start event carries no
/// `prompt` parameter.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a friendly voice assistant answering a phone call. Keep replies short and spoken.";

/// Greeting used when the start event carries no `first_message`.
pub const DEFAULT_FIRST_MESSAGE: &str = "Hello! How can I help you today?";

/// Audio format the agent emits on its leg.
///
/// `ulaw_8000` already matches the telephony convention and passes
/// through unchanged; `pcm_16000` is decimated to 8 kHz and companded
/// before it reaches the telephony leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentAudioFormat {
    /// 8-bit µ-law at 8 kHz (telephony-native, pass-through).
    #[default]
    Ulaw8000,
    /// 16-bit signed linear PCM at 16 kHz (requires transcoding).
    Pcm16000,
}

impl AgentAudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ulaw8000 => "ulaw_8000",
            Self::Pcm16000 => "pcm_16000",
        }
    }

    /// Parse a format name, falling back to the default for anything
    /// unrecognized.
    pub fn from_str_or_default(value: &str) -> Self {
        match value {
            "pcm_16000" => Self::Pcm16000,
            "ulaw_8000" => Self::Ulaw8000,
            other => {
                tracing::warn!(
                    "Unknown agent audio format '{}', using {}",
                    other,
                    Self::default().as_str()
                );
                Self::default()
            }
        }
    }
}
