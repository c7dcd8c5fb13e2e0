//! In-process encoder that records everything it is given.
//!
//! Useful for previews and for checking what a session hands to its
//! backend. The recording is shared between the factory and every handle
//! it creates.

use crate::attributes::{AudioTrackAttributes, VideoEncoderAttributes};
use crate::backend::{EncoderFactory, EncoderHandle};
use mediaenc_core::{FrameBuffer, MediaEncError, MediaTime, Result};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A frame captured by [`MemoryEncoder`], converted to packed RGBA8.
#[derive(Debug, Clone)]
pub struct RecordedFrame {
    pub width: u32,
    pub height: u32,
    pub timestamp: Option<MediaTime>,
    pub rgba: Vec<u8>,
}

/// Everything a [`MemoryEncoder`] has seen.
#[derive(Debug, Default)]
pub struct Recording {
    pub path: Option<PathBuf>,
    pub video: Option<VideoEncoderAttributes>,
    pub audio: Vec<AudioTrackAttributes>,
    pub frames: Vec<RecordedFrame>,
    /// Interleaved samples per audio track.
    pub samples: Vec<Vec<f32>>,
    pub created: usize,
    pub released: usize,
}

/// Factory for [`MemoryHandle`]s.
#[derive(Debug, Clone, Default)]
pub struct MemoryEncoder {
    recording: Arc<Mutex<Recording>>,
    fail_create: bool,
}

impl MemoryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory whose `create` always fails.
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Self::default()
        }
    }

    /// Shared view of what has been recorded.
    pub fn recording(&self) -> Arc<Mutex<Recording>> {
        Arc::clone(&self.recording)
    }

    pub fn frame_count(&self) -> usize {
        self.recording.lock().frames.len()
    }

    pub fn release_count(&self) -> usize {
        self.recording.lock().released
    }
}

impl EncoderFactory for MemoryEncoder {
    type Handle = MemoryHandle;

    fn create(
        &self,
        path: &Path,
        video: Option<&VideoEncoderAttributes>,
        audio: &[AudioTrackAttributes],
    ) -> Result<MemoryHandle> {
        if self.fail_create {
            return Err(MediaEncError::Encoder(
                "memory encoder configured to fail".into(),
            ));
        }

        let mut recording = self.recording.lock();
        recording.path = Some(path.to_path_buf());
        recording.video = video.copied();
        recording.audio = audio.to_vec();
        recording.samples = vec![Vec::new(); audio.len()];
        recording.created += 1;
        debug!(path = %path.display(), "Memory encoder created");

        Ok(MemoryHandle {
            recording: Arc::clone(&self.recording),
        })
    }
}

/// Handle writing into a shared [`Recording`].
#[derive(Debug)]
pub struct MemoryHandle {
    recording: Arc<Mutex<Recording>>,
}

impl EncoderHandle for MemoryHandle {
    fn append_frame(&mut self, frame: &FrameBuffer, timestamp: Option<MediaTime>) -> bool {
        self.recording.lock().frames.push(RecordedFrame {
            width: frame.width(),
            height: frame.height(),
            timestamp,
            rgba: frame.to_packed_rgba8(),
        });
        true
    }

    fn append_samples(&mut self, track_index: usize, samples: &[f32]) -> bool {
        let mut recording = self.recording.lock();
        match recording.samples.get_mut(track_index) {
            Some(track) => {
                track.extend_from_slice(samples);
                true
            }
            None => false,
        }
    }

    fn release(&mut self) {
        self.recording.lock().released += 1;
        debug!("Memory encoder released");
    }
}
