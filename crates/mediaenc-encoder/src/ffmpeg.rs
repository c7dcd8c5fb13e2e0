//! Encoder backend driving an external `ffmpeg` process.
//!
//! Raw frames or samples are piped to ffmpeg's stdin. One pipe carries one
//! stream, so a session may hold either a single video track or a single
//! audio track.

use crate::attributes::{
    AlphaLayout, AudioTrackAttributes, CodecAttributes, VideoBitrateMode, VideoEncoderAttributes,
};
use crate::backend::{EncoderFactory, EncoderHandle};
use mediaenc_core::{FrameBuffer, MediaEncError, MediaRational, MediaTime, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use tracing::{debug, info, warn};

/// Factory spawning one ffmpeg process per session.
#[derive(Debug, Clone)]
pub struct FfmpegFactory {
    program: PathBuf,
}

impl FfmpegFactory {
    /// Find `ffmpeg` on `PATH`.
    pub fn locate() -> Result<Self> {
        let program = which::which("ffmpeg")
            .map_err(|e| MediaEncError::Encoder(format!("ffmpeg not found on PATH: {e}")))?;
        debug!(program = %program.display(), "Located ffmpeg");
        Ok(Self { program })
    }

    /// Use a specific ffmpeg binary.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Build the ffmpeg command arguments for a session.
    pub fn args(
        path: &Path,
        video: Option<&VideoEncoderAttributes>,
        audio: &[AudioTrackAttributes],
    ) -> Result<Vec<String>> {
        match (video, audio) {
            (Some(video), []) => video_args(path, video),
            (None, [track]) => audio_args(path, track),
            (None, []) => Err(MediaEncError::InvalidArgument(
                "ffmpeg session needs a video or an audio track".into(),
            )),
            _ => Err(MediaEncError::UnsupportedFormat(format!(
                "ffmpeg backend encodes one stream per session, got {} video and {} audio",
                usize::from(video.is_some()),
                audio.len()
            ))),
        }
    }
}

impl EncoderFactory for FfmpegFactory {
    type Handle = FfmpegHandle;

    fn create(
        &self,
        path: &Path,
        video: Option<&VideoEncoderAttributes>,
        audio: &[AudioTrackAttributes],
    ) -> Result<FfmpegHandle> {
        let args = Self::args(path, video, audio)?;
        let stream = match (video, audio.first()) {
            (Some(video), _) => {
                let (width, height) = video.dimensions();
                StreamKind::Video { width, height }
            }
            (None, Some(track)) => StreamKind::Audio {
                channels: track.channel_count,
            },
            (None, None) => {
                return Err(MediaEncError::InvalidArgument(
                    "ffmpeg session needs a video or an audio track".into(),
                ))
            }
        };

        debug!(args = ?args, "Spawning ffmpeg");
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| MediaEncError::Encoder(format!("Failed to spawn ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MediaEncError::Encoder("Failed to open ffmpeg stdin".into()))?;

        Ok(FfmpegHandle {
            child,
            stdin: Some(stdin),
            stream,
        })
    }
}

#[derive(Debug, Clone, Copy)]
enum StreamKind {
    Video { width: u32, height: u32 },
    Audio { channels: u16 },
}

/// A running ffmpeg process fed through its stdin.
#[derive(Debug)]
pub struct FfmpegHandle {
    child: Child,
    stdin: Option<ChildStdin>,
    stream: StreamKind,
}

impl FfmpegHandle {
    fn write(&mut self, bytes: &[u8]) -> bool {
        let Some(stdin) = self.stdin.as_mut() else {
            return false;
        };
        match stdin.write_all(bytes) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to write to ffmpeg: {e}");
                false
            }
        }
    }
}

impl EncoderHandle for FfmpegHandle {
    fn append_frame(&mut self, frame: &FrameBuffer, timestamp: Option<MediaTime>) -> bool {
        let StreamKind::Video { width, height } = self.stream else {
            return false;
        };
        if frame.dimensions() != (width, height) {
            return false;
        }
        // Raw input is constant frame rate; timestamps only inform logging.
        if let Some(ts) = timestamp {
            debug!(seconds = ts.to_seconds_f64(), "Frame timestamp");
        }
        self.write(&frame.to_packed_rgba8())
    }

    fn append_samples(&mut self, track_index: usize, samples: &[f32]) -> bool {
        let StreamKind::Audio { channels } = self.stream else {
            return false;
        };
        if track_index != 0 || samples.len() % channels.max(1) as usize != 0 {
            return false;
        }
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        self.write(&bytes)
    }

    fn release(&mut self) {
        // Close stdin to signal end-of-stream
        drop(self.stdin.take());

        match self.child.wait() {
            Ok(status) if status.success() => info!("ffmpeg finished"),
            Ok(status) => warn!("ffmpeg exited with status: {status}"),
            Err(e) => warn!("Failed to wait for ffmpeg: {e}"),
        }
    }
}

// ── Argument building ───────────────────────────────────────────

fn video_args(path: &Path, video: &VideoEncoderAttributes) -> Result<Vec<String>> {
    let track = video.track();
    let rate = track.frame_rate;
    if !rate.is_valid() || rate.is_zero() {
        return Err(MediaEncError::UnsupportedFormat(format!(
            "ffmpeg needs a positive frame rate, got {rate}"
        )));
    }

    // Input from pipe (raw frames)
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pixel_format".into(),
        "rgba".into(),
        "-video_size".into(),
        format!("{}x{}", track.width, track.height),
        "-framerate".into(),
        format!("{}/{}", rate.numerator, rate.denominator),
        "-i".into(),
        "pipe:0".into(),
        "-c:v".into(),
        video.codec().ffmpeg_encoder().into(),
    ];

    let mut pix_fmt = "yuv420p";
    match video.codec_attributes() {
        CodecAttributes::H264(h264) => {
            args.extend_from_slice(&[
                "-profile:v".into(),
                h264.profile.as_str().into(),
                "-g".into(),
                h264.gop_size.to_string(),
                "-bf".into(),
                h264.b_frames.to_string(),
            ]);
        }
        CodecAttributes::Vp8(vp8) => {
            args.extend_from_slice(&["-g".into(), vp8.keyframe_distance.to_string()]);
            if track.include_alpha {
                match vp8.alpha_layout {
                    AlphaLayout::None => {}
                    AlphaLayout::Separate => {
                        pix_fmt = "yuva420p";
                        args.extend_from_slice(&["-auto-alt-ref".into(), "0".into()]);
                    }
                    AlphaLayout::Stacked => {
                        args.extend_from_slice(&[
                            "-vf".into(),
                            "split[c][a];[a]alphaextract,format=rgba[m];[c][m]vstack".into(),
                        ]);
                    }
                }
            }
        }
    }

    // Quality settings
    if track.target_bitrate > 0 {
        args.extend_from_slice(&["-b:v".into(), track.target_bitrate.to_string()]);
    } else {
        args.extend_from_slice(&["-crf".into(), crf(video, track.bitrate_mode).to_string()]);
        if matches!(video.codec_attributes(), CodecAttributes::Vp8(_)) {
            // libvpx treats -b:v as the ceiling in constrained quality mode
            args.extend_from_slice(&["-b:v".into(), "8M".into()]);
        }
    }

    args.extend_from_slice(&["-pix_fmt".into(), pix_fmt.into()]);
    args.push(path.to_string_lossy().into_owned());
    Ok(args)
}

fn crf(video: &VideoEncoderAttributes, mode: VideoBitrateMode) -> u32 {
    match (video.codec_attributes(), mode) {
        (CodecAttributes::H264(_), VideoBitrateMode::Low) => 28,
        (CodecAttributes::H264(_), VideoBitrateMode::Medium) => 23,
        (CodecAttributes::H264(_), VideoBitrateMode::High) => 18,
        (CodecAttributes::Vp8(_), VideoBitrateMode::Low) => 40,
        (CodecAttributes::Vp8(_), VideoBitrateMode::Medium) => 20,
        (CodecAttributes::Vp8(_), VideoBitrateMode::High) => 10,
    }
}

fn audio_args(path: &Path, track: &AudioTrackAttributes) -> Result<Vec<String>> {
    let sample_rate = integer_rate(track.sample_rate)?;
    if track.channel_count == 0 {
        return Err(MediaEncError::InvalidArgument(
            "audio track needs at least one channel".into(),
        ));
    }

    let codec = match path.extension().and_then(|e| e.to_str()) {
        Some("webm") | Some("ogg") | Some("opus") => "libopus",
        Some("wav") => "pcm_s16le",
        Some("flac") => "flac",
        _ => "aac",
    };

    let mut args: Vec<String> = vec![
        "-y".into(),
        "-f".into(),
        "f32le".into(),
        "-ar".into(),
        sample_rate.to_string(),
        "-ac".into(),
        track.channel_count.to_string(),
        "-i".into(),
        "pipe:0".into(),
        "-c:a".into(),
        codec.into(),
    ];
    if !track.language.is_empty() {
        args.extend_from_slice(&[
            "-metadata:s:a:0".into(),
            format!("language={}", track.language),
        ]);
    }
    args.push(path.to_string_lossy().into_owned());
    Ok(args)
}

/// ffmpeg takes whole-number sample rates only.
fn integer_rate(rate: MediaRational) -> Result<u32> {
    let reduced = rate.reduce();
    if reduced.denominator != 1 || reduced.numerator <= 0 {
        return Err(MediaEncError::UnsupportedFormat(format!(
            "ffmpeg needs a whole positive sample rate, got {rate}"
        )));
    }
    Ok(reduced.numerator as u32)
}
