//! Checks run on track attributes before an encoder is created.

use crate::attributes::{AudioTrackAttributes, VideoEncoderAttributes};
use mediaenc_core::{MediaEncError, Result};

/// Reject a video track whose frame rate is negative.
///
/// Zero and invalid frame rates are left to the encoder backend.
pub fn validate_video(video: &VideoEncoderAttributes) -> Result<()> {
    let rate = video.frame_rate();
    if rate.is_negative() {
        return Err(MediaEncError::InvalidArgument(format!(
            "video frame rate cannot be negative, got {rate}"
        )));
    }
    Ok(())
}

/// Reject an audio track whose sample rate is invalid, zero or negative.
pub fn validate_audio_track(index: usize, track: &AudioTrackAttributes) -> Result<()> {
    let rate = track.sample_rate;
    if !rate.is_valid() {
        return Err(MediaEncError::InvalidArgument(format!(
            "audio track {index}: sample rate {rate} has a zero denominator"
        )));
    }
    if rate.is_zero() {
        return Err(MediaEncError::InvalidArgument(format!(
            "audio track {index}: sample rate cannot be zero"
        )));
    }
    if rate.is_negative() {
        return Err(MediaEncError::InvalidArgument(format!(
            "audio track {index}: sample rate cannot be negative, got {rate}"
        )));
    }
    Ok(())
}

/// Validate everything handed to an encoder factory.
pub fn validate(
    video: Option<&VideoEncoderAttributes>,
    audio: &[AudioTrackAttributes],
) -> Result<()> {
    if let Some(video) = video {
        validate_video(video)?;
    }
    for (index, track) in audio.iter().enumerate() {
        validate_audio_track(index, track)?;
    }
    Ok(())
}
