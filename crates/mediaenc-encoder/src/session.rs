//! Encode sessions owning one encoder handle.
//!
//! A session is open from construction until [`EncoderSession::dispose`]
//! or drop, whichever comes first. The handle is released exactly once;
//! every append after that fails with `ObjectDisposed`.

use crate::attributes::{AudioTrackAttributes, VideoEncoderAttributes};
use crate::backend::{EncoderFactory, EncoderHandle};
use crate::validation;
use mediaenc_core::{FrameBuffer, MediaEncError, MediaTime, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An open encoder writing to one output path.
pub struct EncoderSession<H: EncoderHandle> {
    path: PathBuf,
    video: Option<VideoEncoderAttributes>,
    audio: Vec<AudioTrackAttributes>,
    /// `None` once released.
    handle: Option<H>,
    frames_appended: u64,
}

impl<H: EncoderHandle> EncoderSession<H> {
    /// Validate the attributes and open an encoder through `factory`.
    pub fn create<F>(
        factory: &F,
        path: impl Into<PathBuf>,
        video: Option<VideoEncoderAttributes>,
        audio: Vec<AudioTrackAttributes>,
    ) -> Result<Self>
    where
        F: EncoderFactory<Handle = H>,
    {
        let path = path.into();
        validation::validate(video.as_ref(), &audio)?;

        let handle = factory
            .create(&path, video.as_ref(), &audio)
            .map_err(|e| {
                MediaEncError::OperationFailed(format!(
                    "could not create encoder for {}: {e}",
                    path.display()
                ))
            })?;

        info!(
            path = %path.display(),
            video = video.is_some(),
            audio_tracks = audio.len(),
            "Encoder session opened"
        );

        Ok(Self {
            path,
            video,
            audio,
            handle: Some(handle),
            frames_appended: 0,
        })
    }

    /// Open a session with a single video track.
    pub fn create_video<F>(
        factory: &F,
        path: impl Into<PathBuf>,
        video: VideoEncoderAttributes,
    ) -> Result<Self>
    where
        F: EncoderFactory<Handle = H>,
    {
        Self::create(factory, path, Some(video), Vec::new())
    }

    /// Open a session with audio tracks only.
    pub fn create_audio<F>(
        factory: &F,
        path: impl Into<PathBuf>,
        audio: Vec<AudioTrackAttributes>,
    ) -> Result<Self>
    where
        F: EncoderFactory<Handle = H>,
    {
        Self::create(factory, path, None, audio)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn video_attributes(&self) -> Option<&VideoEncoderAttributes> {
        self.video.as_ref()
    }

    pub fn audio_attributes(&self) -> &[AudioTrackAttributes] {
        &self.audio
    }

    pub fn frames_appended(&self) -> u64 {
        self.frames_appended
    }

    pub fn is_disposed(&self) -> bool {
        self.handle.is_none()
    }

    /// Append one video frame.
    ///
    /// The frame must match the video track's dimensions. Returns the
    /// encoder's verdict on the frame.
    pub fn append_frame(
        &mut self,
        frame: &FrameBuffer,
        timestamp: Option<MediaTime>,
    ) -> Result<bool> {
        let handle = self.handle.as_mut().ok_or_else(|| disposed(&self.path))?;

        let Some(video) = self.video.as_ref() else {
            return Err(MediaEncError::InvalidArgument(format!(
                "{} has no video track",
                self.path.display()
            )));
        };
        if frame.dimensions() != video.dimensions() {
            let (w, h) = video.dimensions();
            return Err(MediaEncError::InvalidArgument(format!(
                "frame is {}x{}, video track is {w}x{h}",
                frame.width(),
                frame.height()
            )));
        }

        let accepted = handle.append_frame(frame, timestamp);
        if accepted {
            self.frames_appended += 1;
        }
        debug!(frame = self.frames_appended, accepted, "Appended video frame");
        Ok(accepted)
    }

    /// Append interleaved samples to one audio track.
    pub fn append_samples(&mut self, track_index: usize, samples: &[f32]) -> Result<bool> {
        let handle = self.handle.as_mut().ok_or_else(|| disposed(&self.path))?;

        if track_index >= self.audio.len() {
            return Err(MediaEncError::InvalidArgument(format!(
                "audio track {track_index} out of range, session has {}",
                self.audio.len()
            )));
        }

        let accepted = handle.append_samples(track_index, samples);
        debug!(track_index, samples = samples.len(), accepted, "Appended audio samples");
        Ok(accepted)
    }

    /// Release the encoder. Later calls do nothing.
    pub fn dispose(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.release();
            info!(
                path = %self.path.display(),
                frames = self.frames_appended,
                "Encoder session closed"
            );
        }
    }
}

impl<H: EncoderHandle> Drop for EncoderSession<H> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn disposed(path: &Path) -> MediaEncError {
    MediaEncError::ObjectDisposed(format!("encoder session for {}", path.display()))
}
