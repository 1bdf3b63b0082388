pub mod health;
pub mod media;

pub use health::health_check;
pub use media::media_stream_handler;
