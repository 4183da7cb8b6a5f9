//! # Config File Tests
//!
//! Run with: cargo test -p kestrel --test config_files

use std::io::Write;

use kestrel::{AppConfig, AppError, LogLevel};

#[test]
fn load_reads_file_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        fixed_time_step = 0.05
        log_level = "warning"
        run_seconds = 0.0

        [[worlds]]
        moving_entities = 2
        static_entities = 1
        disabled_entities = 0
        seed = 99
        "#
    )
    .unwrap();

    let config = AppConfig::load(file.path()).unwrap();
    assert!((config.fixed_time_step - 0.05).abs() < f32::EPSILON);
    assert_eq!(config.log_level, LogLevel::Warning);
    assert_eq!(config.worlds.len(), 1);
    assert_eq!(config.worlds[0].entity_total(), 3);
    assert_eq!(config.worlds[0].seed, 99);
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = AppConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, AppError::Io(_)));
}

#[test]
fn load_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "fixed_time_step = 0.0\n").unwrap();

    let err = AppConfig::load(&path).unwrap_err();
    assert!(matches!(err, AppError::InvalidConfig(_)));
    assert!(err.to_string().contains("fixed_time_step"));
}

#[test]
fn serialized_defaults_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("defaults.toml");
    let mut config = AppConfig::default();
    config.worlds[0].lifetime_seconds = Some(1.5);
    std::fs::write(&path, toml::to_string(&config).unwrap()).unwrap();

    assert_eq!(AppConfig::load(&path).unwrap(), config);
}
