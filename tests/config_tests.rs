// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use qrscan::Config;
use qrscan::errors::ConfigError;

fn temp_config(tag: &str) -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("qrscan-config-{}-{}", tag, uuid::Uuid::new_v4()))
        .join("config.json")
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.mime_filter, "image/*");
    assert!(
        config.discard_stale_cycles,
        "Superseded cycles should be discarded by default"
    );
    assert!(!config.camera_command.is_empty());
    assert!(config.staging_dir.is_none());
}

#[test]
fn test_missing_file_yields_defaults() {
    let config = Config::load_from(&temp_config("missing")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_saved_config_loads_back() {
    let path = temp_config("saved");
    let config = Config {
        camera_command: vec!["libcamera-still".into(), "-o".into(), "{output}".into()],
        max_dimension: 800,
        discard_stale_cycles: false,
        ..Config::default()
    };

    config.save_to(&path).unwrap();
    assert_eq!(Config::load_from(&path).unwrap(), config);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_malformed_file_is_parse_error() {
    let path = temp_config("malformed");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::Parse(_))
    ));

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
