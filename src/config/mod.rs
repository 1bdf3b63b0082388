//! Server configuration.
//!
//! Configuration is read from environment variables (a `.env` file is
//! loaded by `main` before this runs). Validation happens once at
//! startup; a missing credential fails the process, not a call.

use crate::core::agent::AgentAudioFormat;
use crate::errors::{BridgeError, BridgeResult};

/// Default provider API base; overridable for tests and proxies.
pub const DEFAULT_API_BASE_URL: &str = "https://api.elevenlabs.io";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host (default `0.0.0.0`)
    pub host: String,
    /// Bind port (default `8080`)
    pub port: u16,
    /// Provider API key, sent as `xi-api-key` on the signed-URL request
    pub elevenlabs_api_key: String,
    /// Agent to connect each call to
    pub elevenlabs_agent_id: String,
    /// Provider API base URL
    pub elevenlabs_api_base_url: String,
    /// Audio format the agent emits on its leg
    pub agent_audio_format: AgentAudioFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> BridgeResult<Self> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = match std::env::var("PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| {
                BridgeError::InvalidConfiguration(format!("PORT '{value}' is not a valid port"))
            })?,
            Err(_) => 8080,
        };

        let elevenlabs_api_key = std::env::var("ELEVENLABS_API_KEY").map_err(|_| {
            BridgeError::InvalidConfiguration("ELEVENLABS_API_KEY is required".to_string())
        })?;
        let elevenlabs_agent_id = std::env::var("ELEVENLABS_AGENT_ID").map_err(|_| {
            BridgeError::InvalidConfiguration("ELEVENLABS_AGENT_ID is required".to_string())
        })?;

        let elevenlabs_api_base_url = std::env::var("ELEVENLABS_API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let agent_audio_format = std::env::var("AGENT_AUDIO_FORMAT")
            .map(|v| AgentAudioFormat::from_str_or_default(&v))
            .unwrap_or_default();

        let config = Self {
            host,
            port,
            elevenlabs_api_key,
            elevenlabs_agent_id,
            elevenlabs_api_base_url,
            agent_audio_format,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> BridgeResult<()> {
        if self.elevenlabs_api_key.trim().is_empty() {
            return Err(BridgeError::InvalidConfiguration(
                "ELEVENLABS_API_KEY must not be empty".to_string(),
            ));
        }
        if self.elevenlabs_agent_id.trim().is_empty() {
            return Err(BridgeError::InvalidConfiguration(
                "ELEVENLABS_AGENT_ID must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The socket address string to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
