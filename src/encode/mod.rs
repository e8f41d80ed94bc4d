//! Recording output: encoder host seam, capture throttling and still-image encoding.

pub mod ffmpeg;
pub mod host;
pub mod memory;
pub mod still;

pub use ffmpeg::FfmpegEncoderHost;
pub use host::{
    CaptureStream, EncoderConfig, EncoderEvent, EncoderHost, EncoderSession, VideoFormat,
    negotiate,
};
pub use memory::InMemoryEncoderHost;
pub use still::encode_png;
