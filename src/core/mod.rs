pub mod agent;
pub mod audio;
pub mod bridge;
pub mod telephony;

// Re-export commonly used types for convenience
pub use agent::{
    AgentAudioFormat, AgentConnector, AgentEvent, AgentHandle, AgentInbound, AgentOutbound,
    ConversationInitiation, ElevenLabsConnector, fetch_signed_url,
};
pub use bridge::{BridgeState, CallBridge, Session};
pub use telephony::{TelephonyInbound, TelephonyOutbound, TelephonyRoute};
