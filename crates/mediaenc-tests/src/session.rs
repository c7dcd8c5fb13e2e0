//! Integration tests for encode sessions.
//!
//! Exercises mediaenc-core time types flowing through mediaenc-encoder
//! attributes, validation and backends.

use mediaenc_core::{FrameBuffer, MediaEncError, MediaRational, MediaTime, PixelFormat, Result};
use mediaenc_encoder::{
    AudioTrackAttributes, CodecAttributes, EncoderFactory, EncoderHandle, EncoderPreset,
    EncoderSession, H264Attributes, H264Profile, MemoryEncoder, VideoEncoderAttributes,
    VideoTrackAttributes,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ── Helpers ────────────────────────────────────────────────────

/// Backend that only counts releases.
#[derive(Default)]
struct CountingFactory {
    releases: Arc<AtomicUsize>,
}

struct CountingHandle {
    releases: Arc<AtomicUsize>,
}

impl EncoderFactory for CountingFactory {
    type Handle = CountingHandle;

    fn create(
        &self,
        _path: &Path,
        _video: Option<&VideoEncoderAttributes>,
        _audio: &[AudioTrackAttributes],
    ) -> Result<CountingHandle> {
        Ok(CountingHandle {
            releases: Arc::clone(&self.releases),
        })
    }
}

impl EncoderHandle for CountingHandle {
    fn append_frame(&mut self, _frame: &FrameBuffer, _timestamp: Option<MediaTime>) -> bool {
        true
    }

    fn append_samples(&mut self, _track_index: usize, _samples: &[f32]) -> bool {
        true
    }

    fn release(&mut self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

fn h264(profile: H264Profile, b_frames: u32) -> VideoEncoderAttributes {
    VideoEncoderAttributes::h264(
        VideoTrackAttributes::new(MediaRational::FPS_25, 320, 240),
        H264Attributes {
            gop_size: 25,
            b_frames,
            profile,
        },
    )
}

// ── Attribute policy reaches the backend ───────────────────────

#[test]
fn backend_sees_clamped_b_frames() {
    let encoder = MemoryEncoder::new();
    let _session =
        EncoderSession::create_video(&encoder, "clamped.mp4", h264(H264Profile::Main, 5)).unwrap();

    let recording = encoder.recording();
    let recording = recording.lock();
    match recording.video.unwrap().codec_attributes() {
        CodecAttributes::H264(h) => assert_eq!(h.b_frames, 2),
        CodecAttributes::Vp8(_) => panic!("expected H.264"),
    }
}

#[test]
fn baseline_session_has_no_b_frames() {
    let encoder = MemoryEncoder::new();
    let session =
        EncoderSession::create_video(&encoder, "base.mp4", h264(H264Profile::Baseline, 5))
            .unwrap();
    match session.video_attributes().unwrap().codec_attributes() {
        CodecAttributes::H264(h) => assert_eq!(h.b_frames, 0),
        CodecAttributes::Vp8(_) => panic!("expected H.264"),
    }
}

// ── Validation gateway ─────────────────────────────────────────

#[test]
fn invalid_rates_fail_with_invalid_argument() {
    let factory = CountingFactory::default();

    let negative_video = VideoEncoderAttributes::h264(
        VideoTrackAttributes::new(MediaRational::new(-1, 1), 320, 240),
        H264Attributes::default(),
    );
    assert!(matches!(
        EncoderSession::create_video(&factory, "v.mp4", negative_video).err(),
        Some(MediaEncError::InvalidArgument(_))
    ));

    for rate in [
        MediaRational::new(0, 1),
        MediaRational::new(-48000, 1),
        MediaRational::INVALID,
    ] {
        let audio = vec![AudioTrackAttributes::new(rate, 2)];
        assert!(matches!(
            EncoderSession::create_audio(&factory, "a.m4a", audio).err(),
            Some(MediaEncError::InvalidArgument(_))
        ));
    }
}

#[test]
fn zero_rate_media_time_is_accepted_but_zero_audio_rate_is_not() {
    let time = MediaTime::new(10, MediaRational::new(0, 1)).unwrap();
    assert_eq!(time.to_seconds_f64(), 0.0);

    let audio = vec![AudioTrackAttributes::new(time.rate(), 1)];
    assert!(EncoderSession::create_audio(&MemoryEncoder::new(), "a.m4a", audio).is_err());
}

// ── Lifecycle ──────────────────────────────────────────────────

#[test]
fn dispose_twice_releases_once() {
    let factory = CountingFactory::default();
    let mut session =
        EncoderSession::create_video(&factory, "v.mp4", h264(H264Profile::High, 1)).unwrap();

    session.dispose();
    session.dispose();
    drop(session);
    assert_eq!(factory.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn dropping_open_session_releases() {
    let factory = CountingFactory::default();
    let session =
        EncoderSession::create_video(&factory, "v.mp4", h264(H264Profile::High, 1)).unwrap();
    assert!(!session.is_disposed());
    drop(session);
    assert_eq!(factory.releases.load(Ordering::SeqCst), 1);
}

#[test]
fn appends_after_dispose_fail() {
    let factory = CountingFactory::default();
    let mut session = EncoderSession::create(
        &factory,
        "v.mp4",
        Some(h264(H264Profile::Main, 0)),
        vec![AudioTrackAttributes::new(MediaRational::new(48000, 1), 2)],
    )
    .unwrap();

    let frame = FrameBuffer::new(320, 240, PixelFormat::Rgba8);
    assert!(session.append_frame(&frame, None).unwrap());
    session.dispose();

    assert!(matches!(
        session.append_frame(&frame, None),
        Err(MediaEncError::ObjectDisposed(_))
    ));
    assert!(matches!(
        session.append_samples(0, &[0.0; 4]),
        Err(MediaEncError::ObjectDisposed(_))
    ));
}

// ── Presets through a session ──────────────────────────────────

#[test]
fn vp8_preset_records_timestamped_frames() {
    let encoder = MemoryEncoder::new();
    let video = EncoderPreset::vp8_web().video.unwrap();
    let (width, height) = video.dimensions();
    let frame = FrameBuffer::test_pattern(width, height);

    let mut session = EncoderSession::create_video(&encoder, "web.webm", video).unwrap();
    for i in 0..3 {
        let ts = MediaTime::new(i, video.frame_rate()).unwrap();
        assert!(session.append_frame(&frame, Some(ts)).unwrap());
    }
    session.dispose();

    let recording = encoder.recording();
    let recording = recording.lock();
    assert_eq!(recording.frames.len(), 3);
    let last = recording.frames[2].timestamp.unwrap();
    assert!((last.to_seconds_f64() - 2.0 / 30.0).abs() < 1e-9);
    assert_eq!(recording.released, 1);
}
