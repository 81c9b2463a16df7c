//! Audio settings loaded from JSON documents.

#![cfg(feature = "serde")]

use chartnav_audio::{AudioSettings, Waveform};

#[test]
fn partial_settings_fill_defaults() {
    let settings: AudioSettings =
        serde_json::from_str(r#"{"volume": 80, "segments": {"punctual": 0.25}}"#).unwrap();
    assert_eq!(settings.volume, 80);
    assert_eq!(settings.segments.punctual, 0.25);
    assert_eq!(settings.segments.extended, 2.0);
    assert_eq!(settings.max_frequency, 1000.0);
    assert!(settings.validate().is_empty());
}

#[test]
fn waveform_names_are_lowercase() {
    let json = serde_json::to_string(&Waveform::Sawtooth).unwrap();
    assert_eq!(json, "\"sawtooth\"");
}
