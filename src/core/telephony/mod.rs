//! Telephony leg: media-stream protocol messages.

pub mod messages;

pub use messages::{
    MediaPayload, OutboundMediaPayload, StartPayload, TelephonyInbound, TelephonyOutbound,
    TelephonyRoute,
};
