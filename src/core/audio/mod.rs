//! Audio transcoding for the telephony leg.

pub mod mulaw;

pub use mulaw::{TELEPHONY_SAMPLE_RATE, decimate, encode, linear_to_ulaw, pcm16le_to_samples};
