//! Seams between sessions and the encoders that do the actual work.

use crate::attributes::{AudioTrackAttributes, VideoEncoderAttributes};
use mediaenc_core::{FrameBuffer, MediaTime, Result};
use std::path::Path;

/// One open encoder resource.
///
/// [`EncoderSession`](crate::EncoderSession) calls [`release`] exactly
/// once and never touches the handle afterwards.
///
/// [`release`]: EncoderHandle::release
pub trait EncoderHandle: Send {
    /// Queue one video frame. Returns `false` if the encoder rejected it.
    fn append_frame(&mut self, frame: &FrameBuffer, timestamp: Option<MediaTime>) -> bool;

    /// Queue interleaved samples for one audio track. Returns `false` if the
    /// encoder rejected them.
    fn append_samples(&mut self, track_index: usize, samples: &[f32]) -> bool;

    /// Flush and free the underlying resource.
    fn release(&mut self);
}

/// Creates encoder handles for an output target.
///
/// Attributes passed in have already been through
/// [`validate`](crate::validation::validate).
pub trait EncoderFactory {
    type Handle: EncoderHandle;

    fn create(
        &self,
        path: &Path,
        video: Option<&VideoEncoderAttributes>,
        audio: &[AudioTrackAttributes],
    ) -> Result<Self::Handle>;
}
