//! The call bridge core: session state, controller, and translation.

pub mod controller;
pub mod session;
pub mod translate;

pub use controller::CallBridge;
pub use session::{BridgeState, Session};
