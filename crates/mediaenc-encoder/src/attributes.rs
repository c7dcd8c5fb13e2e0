//! Track and codec attributes describing an encode session.
//!
//! Video attributes are a shared [`VideoTrackAttributes`] block plus one
//! codec-specific payload. H.264 payloads are made profile-conformant at
//! construction; the result is immutable.

use mediaenc_core::MediaRational;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Highest number of consecutive B-frames accepted for H.264.
pub const MAX_B_FRAMES: u32 = 2;

// ── Codecs ──────────────────────────────────────────────────────

/// Video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoCodec {
    H264,
    Vp8,
}

impl VideoCodec {
    /// FFmpeg encoder name.
    pub fn ffmpeg_encoder(self) -> &'static str {
        match self {
            Self::H264 => "libx264",
            Self::Vp8 => "libvpx",
        }
    }

    /// File extension for this codec.
    pub fn extension(self) -> &'static str {
        match self {
            Self::H264 => "mp4",
            Self::Vp8 => "webm",
        }
    }
}

/// Encoder quality target used when no explicit bit rate is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VideoBitrateMode {
    Low,
    Medium,
    #[default]
    High,
}

/// H.264 profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum H264Profile {
    Baseline,
    #[default]
    Main,
    High,
}

impl H264Profile {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::Main => "main",
            Self::High => "high",
        }
    }
}

/// How VP8 carries the alpha channel when the track includes alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlphaLayout {
    /// Alpha is dropped.
    #[default]
    None,
    /// Alpha is encoded as a separate auxiliary stream.
    Separate,
    /// Alpha is stacked below the color image in the same frame.
    Stacked,
}

/// H.264-specific encoder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct H264Attributes {
    /// Group-of-pictures size in frames.
    pub gop_size: u32,
    /// Consecutive B-frames between reference frames.
    pub b_frames: u32,
    pub profile: H264Profile,
}

impl Default for H264Attributes {
    fn default() -> Self {
        Self {
            gop_size: 25,
            b_frames: 0,
            profile: H264Profile::Main,
        }
    }
}

/// VP8-specific encoder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vp8Attributes {
    /// Maximum distance between keyframes, in frames.
    pub keyframe_distance: u32,
    pub alpha_layout: AlphaLayout,
}

impl Default for Vp8Attributes {
    fn default() -> Self {
        Self {
            keyframe_distance: 25,
            alpha_layout: AlphaLayout::None,
        }
    }
}

/// Codec-specific payload of a video track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "codec", rename_all = "lowercase")]
pub enum CodecAttributes {
    H264(H264Attributes),
    Vp8(Vp8Attributes),
}

impl CodecAttributes {
    pub fn codec(&self) -> VideoCodec {
        match self {
            Self::H264(_) => VideoCodec::H264,
            Self::Vp8(_) => VideoCodec::Vp8,
        }
    }
}

// ── Tracks ──────────────────────────────────────────────────────

/// Parameters shared by every video codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VideoTrackAttributes {
    pub frame_rate: MediaRational,
    pub width: u32,
    pub height: u32,
    /// Target bit rate in bits per second. Zero selects `bitrate_mode`.
    pub target_bitrate: u32,
    pub bitrate_mode: VideoBitrateMode,
    pub include_alpha: bool,
}

impl VideoTrackAttributes {
    pub fn new(frame_rate: MediaRational, width: u32, height: u32) -> Self {
        Self {
            frame_rate,
            width,
            height,
            target_bitrate: 0,
            bitrate_mode: VideoBitrateMode::default(),
            include_alpha: false,
        }
    }

    pub fn with_target_bitrate(mut self, bits_per_second: u32) -> Self {
        self.target_bitrate = bits_per_second;
        self
    }

    pub fn with_bitrate_mode(mut self, mode: VideoBitrateMode) -> Self {
        self.bitrate_mode = mode;
        self
    }

    pub fn with_alpha(mut self, include_alpha: bool) -> Self {
        self.include_alpha = include_alpha;
        self
    }
}

/// A fully specified video track: shared parameters plus one codec payload.
///
/// Deserialization goes through the same constructors as code does, so a
/// stored value is adjusted exactly like a freshly built one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawVideoEncoderAttributes")]
pub struct VideoEncoderAttributes {
    track: VideoTrackAttributes,
    codec: CodecAttributes,
}

impl VideoEncoderAttributes {
    /// Build H.264 attributes, adjusting B-frames to what the profile allows.
    ///
    /// Baseline streams carry no B-frames; other profiles are limited to
    /// [`MAX_B_FRAMES`].
    pub fn h264(track: VideoTrackAttributes, mut h264: H264Attributes) -> Self {
        if h264.profile == H264Profile::Baseline && h264.b_frames != 0 {
            info!(
                requested = h264.b_frames,
                "H.264 baseline profile does not support B-frames, using 0"
            );
            h264.b_frames = 0;
        } else if h264.b_frames > MAX_B_FRAMES {
            info!(
                requested = h264.b_frames,
                max = MAX_B_FRAMES,
                "Clamping H.264 consecutive B-frames"
            );
            h264.b_frames = MAX_B_FRAMES;
        }
        Self {
            track,
            codec: CodecAttributes::H264(h264),
        }
    }

    /// Build VP8 attributes. Parameters are passed through unchanged.
    pub fn vp8(track: VideoTrackAttributes, vp8: Vp8Attributes) -> Self {
        Self {
            track,
            codec: CodecAttributes::Vp8(vp8),
        }
    }

    #[inline]
    pub fn track(&self) -> &VideoTrackAttributes {
        &self.track
    }

    #[inline]
    pub fn codec_attributes(&self) -> &CodecAttributes {
        &self.codec
    }

    #[inline]
    pub fn codec(&self) -> VideoCodec {
        self.codec.codec()
    }

    #[inline]
    pub fn frame_rate(&self) -> MediaRational {
        self.track.frame_rate
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.track.width, self.track.height)
    }
}

#[derive(Deserialize)]
struct RawVideoEncoderAttributes {
    track: VideoTrackAttributes,
    codec: CodecAttributes,
}

impl From<RawVideoEncoderAttributes> for VideoEncoderAttributes {
    fn from(raw: RawVideoEncoderAttributes) -> Self {
        match raw.codec {
            CodecAttributes::H264(h264) => Self::h264(raw.track, h264),
            CodecAttributes::Vp8(vp8) => Self::vp8(raw.track, vp8),
        }
    }
}

/// An audio track fed with interleaved `f32` samples.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioTrackAttributes {
    pub sample_rate: MediaRational,
    pub channel_count: u16,
    /// Language tag, empty if unspecified.
    #[serde(default)]
    pub language: String,
}

impl AudioTrackAttributes {
    pub fn new(sample_rate: MediaRational, channel_count: u16) -> Self {
        Self {
            sample_rate,
            channel_count,
            language: String::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }
}
