//! Persisted encoder presets.
//!
//! Uses JSON with a schema version field for forward-compatible persistence.

use crate::attributes::{
    AudioTrackAttributes, H264Attributes, H264Profile, VideoBitrateMode, VideoEncoderAttributes,
    VideoTrackAttributes, Vp8Attributes,
};
use mediaenc_core::{MediaEncError, MediaRational, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Track attributes for one kind of output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderPreset {
    #[serde(default)]
    pub video: Option<VideoEncoderAttributes>,
    #[serde(default)]
    pub audio: Vec<AudioTrackAttributes>,
}

impl EncoderPreset {
    /// 1080p H.264 with stereo 48 kHz audio.
    pub fn h264_hd() -> Self {
        Self {
            video: Some(VideoEncoderAttributes::h264(
                VideoTrackAttributes::new(MediaRational::FPS_24, 1920, 1080)
                    .with_bitrate_mode(VideoBitrateMode::High),
                H264Attributes {
                    gop_size: 48,
                    b_frames: 2,
                    profile: H264Profile::High,
                },
            )),
            audio: vec![AudioTrackAttributes::new(MediaRational::from_integer(48000), 2)],
        }
    }

    /// 720p VP8 for the web.
    pub fn vp8_web() -> Self {
        Self {
            video: Some(VideoEncoderAttributes::vp8(
                VideoTrackAttributes::new(MediaRational::FPS_30, 1280, 720)
                    .with_bitrate_mode(VideoBitrateMode::Medium),
                Vp8Attributes {
                    keyframe_distance: 120,
                    ..Vp8Attributes::default()
                },
            )),
            audio: vec![AudioTrackAttributes::new(MediaRational::from_integer(48000), 2)],
        }
    }
}

/// Versioned settings file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderSettings {
    /// Schema version for migration.
    pub version: u32,
    /// Preset used when none is named.
    pub default_preset: String,
    pub presets: BTreeMap<String, EncoderPreset>,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        let mut presets = BTreeMap::new();
        presets.insert("h264-hd".to_string(), EncoderPreset::h264_hd());
        presets.insert("vp8-web".to_string(), EncoderPreset::vp8_web());
        Self {
            version: CURRENT_VERSION,
            default_preset: "h264-hd".to_string(),
            presets,
        }
    }
}

impl EncoderSettings {
    /// Default settings file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mediaenc")
            .join("settings.json")
    }

    pub fn preset(&self, name: &str) -> Option<&EncoderPreset> {
        self.presets.get(name)
    }

    pub fn default_preset(&self) -> Option<&EncoderPreset> {
        self.preset(&self.default_preset)
    }

    /// Add or replace a preset, returning the previous one.
    pub fn set_preset(
        &mut self,
        name: impl Into<String>,
        preset: EncoderPreset,
    ) -> Option<EncoderPreset> {
        self.presets.insert(name.into(), preset)
    }

    pub fn remove_preset(&mut self, name: &str) -> Option<EncoderPreset> {
        self.presets.remove(name)
    }

    /// Serialize to JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| {
            MediaEncError::Serialization(format!("Failed to serialize settings: {e}"))
        })
    }

    /// Deserialize from JSON bytes, applying migrations if needed.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_slice(data)
            .map_err(|e| MediaEncError::Serialization(format!("Invalid JSON: {e}")))?;

        let raw_version = raw.get("version").and_then(|v| v.as_u64()).unwrap_or(0);
        let version = match u32::try_from(raw_version) {
            Ok(v) if v <= CURRENT_VERSION => v,
            _ => {
                return Err(MediaEncError::Serialization(format!(
                    "Settings file version {raw_version} is newer than supported version {CURRENT_VERSION}"
                )));
            }
        };

        let migrated = migrate(raw, version)?;
        serde_json::from_value(migrated)
            .map_err(|e| MediaEncError::Serialization(format!("Failed to parse settings: {e}")))
    }

    /// Save settings to a file path, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        let data = self.to_json()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, data)?;
        debug!(path = %path.display(), "Saved encoder settings");
        Ok(())
    }

    /// Load settings from a file path. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }
        let data = std::fs::read(path)?;
        Self::from_json(&data)
    }
}

/// Apply sequential migrations from `from_version` to CURRENT_VERSION.
fn migrate(mut data: serde_json::Value, from_version: u32) -> Result<serde_json::Value> {
    let mut version = from_version;

    while version < CURRENT_VERSION {
        match version {
            0 => {
                // v0 → v1: bare preset map without version or default
                if data.get("presets").is_none() {
                    data = serde_json::json!({ "presets": data });
                }
                let default = data["presets"]
                    .as_object()
                    .and_then(|presets| presets.keys().next().cloned())
                    .unwrap_or_default();
                data["version"] = serde_json::json!(1);
                if data.get("default_preset").is_none() {
                    data["default_preset"] = serde_json::json!(default);
                }
                version = 1;
            }
            _ => {
                return Err(MediaEncError::Serialization(format!(
                    "No migration path from version {version}"
                )));
            }
        }
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_builtin_presets() {
        let settings = EncoderSettings::default();
        assert!(settings.preset("h264-hd").is_some());
        assert!(settings.preset("vp8-web").is_some());
        assert_eq!(settings.default_preset(), settings.preset("h264-hd"));
    }

    #[test]
    fn test_json_round_trip() {
        let mut settings = EncoderSettings::default();
        settings.set_preset(
            "audio-only",
            EncoderPreset {
                video: None,
                audio: vec![AudioTrackAttributes::new(MediaRational::new(44100, 1), 1)
                    .with_language("de")],
            },
        );
        let json = settings.to_json().unwrap();
        let loaded = EncoderSettings::from_json(&json).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = br#"{"version": 99, "default_preset": "", "presets": {}}"#;
        assert!(matches!(
            EncoderSettings::from_json(json),
            Err(MediaEncError::Serialization(_))
        ));
    }

    #[test]
    fn test_version_beyond_u32_rejected_as_newer() {
        // 2^32 + 1 must not wrap around to version 1.
        let json = br#"{"version": 4294967297, "default_preset": "", "presets": {}}"#;
        match EncoderSettings::from_json(json) {
            Err(MediaEncError::Serialization(msg)) => assert!(msg.contains("newer"), "{msg}"),
            other => panic!("expected a newer-version error, got {other:?}"),
        }
    }

    #[test]
    fn test_migrates_bare_preset_map() {
        let json = br#"{
            "speech": {
                "audio": [{ "sample_rate": { "numerator": 16000, "denominator": 1 }, "channel_count": 1 }]
            }
        }"#;
        let settings = EncoderSettings::from_json(json).unwrap();
        assert_eq!(settings.version, CURRENT_VERSION);
        assert_eq!(settings.default_preset, "speech");
        let preset = settings.default_preset().unwrap();
        assert!(preset.video.is_none());
        assert_eq!(preset.audio[0].channel_count, 1);
        assert_eq!(preset.audio[0].language, "");
    }

    #[test]
    fn test_remove_preset() {
        let mut settings = EncoderSettings::default();
        assert!(settings.remove_preset("vp8-web").is_some());
        assert!(settings.remove_preset("vp8-web").is_none());
    }

    #[test]
    fn test_default_path_file_name() {
        let path = EncoderSettings::default_path();
        assert!(path.ends_with("mediaenc/settings.json"));
    }
}
