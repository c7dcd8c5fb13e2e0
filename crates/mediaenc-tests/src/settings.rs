//! Integration tests for preset persistence.

use mediaenc_core::MediaRational;
use mediaenc_encoder::{
    AudioTrackAttributes, EncoderPreset, EncoderSession, EncoderSettings, MemoryEncoder,
};
use std::path::PathBuf;

fn temp_settings_path() -> PathBuf {
    std::env::temp_dir()
        .join(format!("mediaenc-test-{}", uuid::Uuid::new_v4()))
        .join("settings.json")
}

#[test]
fn missing_file_loads_defaults() {
    let path = temp_settings_path();
    let settings = EncoderSettings::load(&path).unwrap();
    assert_eq!(settings, EncoderSettings::default());
}

#[test]
fn saved_presets_load_back_and_open_sessions() {
    let path = temp_settings_path();

    let mut settings = EncoderSettings::default();
    settings.set_preset(
        "podcast",
        EncoderPreset {
            video: None,
            audio: vec![AudioTrackAttributes::new(MediaRational::new(44100, 1), 1)
                .with_language("en")],
        },
    );
    settings.default_preset = "podcast".to_string();
    settings.save(&path).unwrap();

    let loaded = EncoderSettings::load(&path).unwrap();
    assert_eq!(loaded, settings);

    let preset = loaded.default_preset().unwrap();
    let encoder = MemoryEncoder::new();
    let mut session =
        EncoderSession::create_audio(&encoder, "podcast.m4a", preset.audio.clone()).unwrap();
    assert!(session.append_samples(0, &[0.1, 0.2, 0.3]).unwrap());
    session.dispose();
    assert_eq!(encoder.recording().lock().audio[0].language, "en");

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}
