//! Integration tests for configuration system

use glimpse_core::config::{ConfigFile, RecordingConfig, SelectionConfig, sample_config};
use glimpse_core::media::{MediaStreamConstraints, TrackRequest};
use glimpse_core::types::CaptureKind;
use tempfile::TempDir;

#[test]
fn test_selection_defaults() {
    let config = SelectionConfig::default();
    assert_eq!(config.padding, 30);
    assert!(config.validate().is_empty());
}

#[test]
fn test_large_padding_warns() {
    let config = SelectionConfig::default().with_padding(2000);
    assert_eq!(config.validate().len(), 1);
}

#[test]
fn test_recording_config_builder() {
    let config = RecordingConfig::camera()
        .with_audio(true)
        .with_mime_type("video/webm;codecs=vp9")
        .with_bits_per_second(2_500_000)
        .with_content_type("video/webm");

    assert_eq!(config.kind, CaptureKind::Camera);
    assert!(config.has_audio());
    assert_eq!(
        config.recorder.mime_type.as_deref(),
        Some("video/webm;codecs=vp9")
    );
    assert_eq!(config.recorder.bits_per_second, Some(2_500_000));
    assert_eq!(config.blob.content_type.as_deref(), Some("video/webm"));
    assert!(config.validate().is_empty());
    assert!(config.validate_strict().is_ok());
}

#[test]
fn test_recording_defaults_to_screen_video_only() {
    let config = RecordingConfig::default();
    assert_eq!(config.kind, CaptureKind::Screen);
    assert!(config.constraints.video.is_requested());
    assert!(!config.has_audio());
}

#[test]
fn test_validate_warnings() {
    let config = RecordingConfig::screen().with_bits_per_second(50_000);
    assert!(config.validate().iter().any(|w| w.contains("very low")));

    let config = RecordingConfig::screen().with_mime_type("webm");
    assert!(config.validate().iter().any(|w| w.contains("type/subtype")));

    let config = RecordingConfig::screen()
        .with_mime_type("video/webm")
        .with_content_type("video/mp4");
    assert!(config.validate().iter().any(|w| w.contains("differs")));
}

#[test]
fn test_validate_strict_rejects_nothing_requested() {
    let constraints = MediaStreamConstraints {
        video: TrackRequest::Enabled(false),
        audio: TrackRequest::Enabled(false),
    };
    let config = RecordingConfig::screen().with_constraints(constraints);
    assert!(config.validate_strict().is_err());
}

#[test]
fn test_validate_strict_rejects_zero_bitrate() {
    let config = RecordingConfig::screen().with_bits_per_second(0);
    assert!(config.validate_strict().is_err());
}

#[test]
fn test_config_file_defaults() {
    let config = ConfigFile::default();
    assert_eq!(config.selection.padding, 30);
    assert_eq!(config.recording.kind, "screen");
    assert_eq!(config.recording.bits_per_second, 0);
}

#[test]
fn test_sample_config_is_valid_toml() {
    let sample = sample_config();
    let config: ConfigFile = toml::from_str(&sample).unwrap();

    let defaults = ConfigFile::default();
    assert_eq!(config.selection.padding, defaults.selection.padding);
    assert_eq!(config.recording.kind, defaults.recording.kind);
}

#[test]
fn test_partial_config_uses_defaults() {
    let config: ConfigFile = toml::from_str("[recording]\nkind = \"camera\"\n").unwrap();
    assert_eq!(config.recording.kind, "camera");
    assert_eq!(config.selection.padding, 30);

    let recording = config.recording_config().unwrap();
    assert_eq!(recording.kind, CaptureKind::Camera);
}

#[test]
fn test_unknown_kind_is_config_error() {
    let config: ConfigFile = toml::from_str("[recording]\nkind = \"hologram\"\n").unwrap();
    let err = config.recording_config().unwrap_err();
    assert!(err.to_string().contains("hologram"));
}

#[test]
fn test_config_file_roundtrip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = ConfigFile::default();
    config.selection.padding = 12;
    config.recording.kind = "camera".to_string();
    config.recording.audio = true;
    config.recording.mime_type = "video/webm".to_string();
    config.save_to(path.clone()).unwrap();

    let loaded = ConfigFile::load_from(path).unwrap();
    assert_eq!(loaded.selection_config().padding, 12);

    let recording = loaded.recording_config().unwrap();
    assert_eq!(recording.kind, CaptureKind::Camera);
    assert!(recording.has_audio());
    assert_eq!(recording.recorder.mime_type.as_deref(), Some("video/webm"));
}

#[test]
fn test_missing_file_gives_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ConfigFile::load_from(dir.path().join("absent.toml")).unwrap();
    assert_eq!(config.selection.padding, 30);
}

#[test]
fn test_malformed_file_is_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[selection\npadding = ").unwrap();

    assert!(ConfigFile::load_from(path).is_err());
}
