//! Per-call session state.
//!
//! One [`Session`] per telephony connection, owned exclusively by its
//! bridge controller. Nothing here is shared across calls; concurrent
//! sessions cannot observe each other's state.

use std::collections::HashMap;
use std::fmt;

/// Lifecycle of one call.
///
/// ```text
/// Init --start--> Connecting --agent ready--> Streaming
///   Connecting/Streaming --stop | leg closed | leg error--> Closing --> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    /// Telephony connection accepted, start event not yet seen.
    Init,
    /// Start received; signed URL fetch and agent connect in flight.
    Connecting,
    /// Both legs live; audio flowing in both directions.
    Streaming,
    /// Teardown in progress.
    Closing,
    /// Terminal; both legs closed, resources released.
    Closed,
}

impl BridgeState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Connecting => "connecting",
            Self::Streaming => "streaming",
            Self::Closing => "closing",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State container for one call.
#[derive(Debug)]
pub struct Session {
    stream_sid: Option<String>,
    state: BridgeState,
    parameters: HashMap<String, String>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            stream_sid: None,
            state: BridgeState::Init,
            parameters: HashMap::new(),
        }
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// The stream id assigned by the telephony leg. `None` before start;
    /// immutable once set.
    pub fn stream_sid(&self) -> Option<&str> {
        self.stream_sid.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, BridgeState::Closing | BridgeState::Closed)
    }

    /// `Init -> Connecting`: capture the stream id and custom
    /// parameters. Returns false (and changes nothing) outside `Init`,
    /// which also covers duplicate start events.
    pub fn begin_connecting(
        &mut self,
        stream_sid: String,
        parameters: HashMap<String, String>,
    ) -> bool {
        if self.state != BridgeState::Init {
            tracing::warn!(
                state = self.state.as_str(),
                "Ignoring start event outside init state"
            );
            return false;
        }
        self.stream_sid = Some(stream_sid);
        self.parameters = parameters;
        self.state = BridgeState::Connecting;
        true
    }

    /// `Connecting -> Streaming`: the agent leg reported ready.
    pub fn mark_streaming(&mut self) -> bool {
        if self.state != BridgeState::Connecting {
            tracing::warn!(
                state = self.state.as_str(),
                "Ignoring agent-ready outside connecting state"
            );
            return false;
        }
        self.state = BridgeState::Streaming;
        true
    }

    /// Enter teardown. Returns false if teardown already started, so
    /// duplicate stop/close triggers are no-ops.
    pub fn begin_closing(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.state = BridgeState::Closing;
        true
    }

    /// Terminal transition; both legs are guaranteed closed by the
    /// caller.
    pub fn mark_closed(&mut self) {
        self.state = BridgeState::Closed;
    }

    /// Consume the custom parameters for the one-time agent initiation
    /// payload.
    pub fn take_parameters(&mut self) -> HashMap<String, String> {
        std::mem::take(&mut self.parameters)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
