//! Agent leg: connection, protocol messages, and signed-URL retrieval.

pub mod client;
pub mod config;
pub mod messages;
pub mod signed_url;

pub use client::{AgentConnector, AgentEvent, AgentHandle, ElevenLabsConnector};
pub use config::{AgentAudioFormat, DEFAULT_FIRST_MESSAGE, DEFAULT_SYSTEM_PROMPT};
pub use messages::{AgentInbound, AgentOutbound, ConversationInitiation, Pong};
pub use signed_url::fetch_signed_url;
