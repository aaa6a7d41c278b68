// Integration test for session config persistence
// Tests the save/load cycle on disk in both formats

use tempfile::TempDir;
use tempo_ramp::{
    ConfigError, ProgressionSettings, SessionConfig, Subdivision, TempoIncrement, TimeSignature,
};

fn practice_config() -> SessionConfig {
    SessionConfig {
        start_bpm: 72,
        increment: TempoIncrement::Three,
        time_signature: TimeSignature::six_eight(),
        subdivision: Subdivision::Triplet,
        progression: ProgressionSettings::Timed { interval_secs: 45 },
        units_per_cycle: 360.0,
        click_volume: 0.8,
    }
}

#[test]
fn test_save_and_load_ron() {
    let dir = TempDir::new().unwrap();
    // Parent directories are created on save
    let path = dir.path().join("nested").join("session.ron");

    let config = practice_config();
    config.save(&path).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("start_bpm: 72"));
    // Increment is stored as its BPM value
    assert!(text.contains("increment: 3"));

    let loaded = SessionConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_save_and_load_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");

    let config = practice_config();
    config.save(&path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["start_bpm"], 72);
    assert_eq!(value["progression"]["Timed"]["interval_secs"], 45);

    assert_eq!(SessionConfig::load(&path).unwrap(), config);
}

#[test]
fn test_hand_written_file_with_missing_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.ron");
    std::fs::write(&path, "(start_bpm: 100, progression: Bars(bars_per_cycle: 4))").unwrap();

    let loaded = SessionConfig::load(&path).unwrap();
    assert_eq!(loaded.start_bpm, 100);
    assert_eq!(loaded.increment, TempoIncrement::Five);
    assert_eq!(loaded.subdivision, Subdivision::Quarter);
}

#[test]
fn test_load_errors() {
    let dir = TempDir::new().unwrap();

    let missing = SessionConfig::load(&dir.path().join("absent.ron"));
    assert!(matches!(missing, Err(ConfigError::Io(_))));

    let garbled = dir.path().join("garbled.ron");
    std::fs::write(&garbled, "(start_bpm: ").unwrap();
    assert!(matches!(
        SessionConfig::load(&garbled),
        Err(ConfigError::Ron(_))
    ));

    let bad_json = dir.path().join("bad.json");
    std::fs::write(&bad_json, "{\"start_bpm\": \"fast\"}").unwrap();
    assert!(matches!(
        SessionConfig::load(&bad_json),
        Err(ConfigError::Json(_))
    ));

    let out_of_range = dir.path().join("range.ron");
    std::fs::write(&out_of_range, "(start_bpm: 0)").unwrap();
    assert!(matches!(
        SessionConfig::load(&out_of_range),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn test_invalid_config_is_not_saved() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.ron");

    let config = SessionConfig {
        click_volume: 1.5,
        ..SessionConfig::default()
    };
    assert!(config.save(&path).is_err());
    assert!(!path.exists());
}
