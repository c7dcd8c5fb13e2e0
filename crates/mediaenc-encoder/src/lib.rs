//! mediaenc encoder - attributes, validation and sessions
//!
//! This crate handles:
//! - Video and audio track attributes (H.264 / VP8)
//! - Validation before an encoder is created
//! - Encode sessions with exactly-once release of the encoder handle
//! - Backends: an external ffmpeg process and an in-memory recorder
//! - Persisted encoder presets

pub mod attributes;
pub mod backend;
pub mod ffmpeg;
pub mod memory;
pub mod session;
pub mod settings;
pub mod validation;

pub use attributes::{
    AlphaLayout, AudioTrackAttributes, CodecAttributes, H264Attributes, H264Profile,
    VideoBitrateMode, VideoCodec, VideoEncoderAttributes, VideoTrackAttributes, Vp8Attributes,
};
pub use backend::{EncoderFactory, EncoderHandle};
pub use ffmpeg::{FfmpegFactory, FfmpegHandle};
pub use memory::{MemoryEncoder, MemoryHandle};
pub use session::EncoderSession;
pub use settings::{EncoderPreset, EncoderSettings};
