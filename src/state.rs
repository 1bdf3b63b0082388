//! Shared application state.
//!
//! Holds only process-wide, read-only resources: the configuration and
//! one HTTP client reused across signed-URL requests. Per-call state
//! never lives here.

use crate::config::ServerConfig;

/// State shared by all request handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
}
