use super::loading::CameraList;
use super::validation::{validate_camera_id, validate_config};
use super::*;
use crate::common::constants::*;
use crate::error::ConfigError;
use serial_test::serial;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn create_test_config() -> Config {
    Config {
        storage_root: PathBuf::from("/srv/webcams"),
        cameras: vec!["camA".to_string(), "camB".to_string()],
        latitude: 40.7128,
        longitude: -74.0060,
        hour_offset: 0.0,
        encoder: PathBuf::from("ffmpeg"),
        frame_rate: 24,
        video_codec: "libx264".to_string(),
        video_filter: None,
        twilight: Twilight::Civil,
        month_offset_correction: false,
    }
}

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("daylapse.toml");
    fs::write(&path, content).unwrap();
    path
}

const MINIMAL: &str = r#"
storage_root = "/srv/webcams"
cameras = ["camA", "camB"]
latitude = 40.7128
longitude = -74.0060
"#;

#[test]
fn test_minimal_file_gets_defaults() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), MINIMAL);

    let config = load_with(Some(&path), no_env).unwrap();
    assert_eq!(config, create_test_config());
}

#[test]
fn test_full_file() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
storage_root = "/data/cams"
cameras = "north, south ,"
latitude = -33.8688
longitude = 151.2093
hour_offset = -1.5
encoder = "/usr/local/bin/ffmpeg"
frame_rate = 30
video_codec = "libx265"
video_filter = "format=yuv420p"
twilight = "nautical"
month_offset_correction = true
"#,
    );

    let config = load_with(Some(&path), no_env).unwrap();
    assert_eq!(config.storage_root, PathBuf::from("/data/cams"));
    assert_eq!(config.cameras, vec!["north", "south"]);
    assert_eq!(config.hour_offset, -1.5);
    assert_eq!(config.encoder, PathBuf::from("/usr/local/bin/ffmpeg"));
    assert_eq!(config.frame_rate, 30);
    assert_eq!(config.video_codec, "libx265");
    assert_eq!(config.video_filter.as_deref(), Some("format=yuv420p"));
    assert_eq!(config.twilight, Twilight::Nautical);
    assert!(config.month_offset_correction);
}

#[test]
fn test_missing_required_key() {
    let dir = tempdir().unwrap();
    let path = write_config(
        dir.path(),
        r#"
storage_root = "/srv/webcams"
cameras = ["camA"]
latitude = 40.0
"#,
    );

    let result = load_with(Some(&path), no_env);
    assert!(matches!(result, Err(ConfigError::Missing("longitude"))));
}

#[test]
fn test_explicit_path_must_exist() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = load_with(Some(&missing), no_env);
    assert!(matches!(result, Err(ConfigError::NotFound(p)) if p == missing));
}

#[test]
fn test_parse_error_names_file() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), "latitude = \"north\"\n");

    match load_with(Some(&path), no_env) {
        Err(ConfigError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_unknown_twilight_in_file() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), &format!("{MINIMAL}twilight = \"golden\"\n"));

    assert!(matches!(
        load_with(Some(&path), no_env),
        Err(ConfigError::Parse { .. })
    ));
}

#[test]
fn test_env_overrides_file() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), MINIMAL);

    let env = env_from(&[
        ("CAMERAS", "camC"),
        ("LATITUDE", "51.5074"),
        ("FRAME_RATE", "12"),
        ("TWILIGHT", "Astronomical"),
        ("MONTH_OFFSET_CORRECTION", "yes"),
        ("VIDEO_CODEC", "  "),
    ]);
    let config = load_with(Some(&path), env).unwrap();

    assert_eq!(config.cameras, vec!["camC"]);
    assert_eq!(config.latitude, 51.5074);
    assert_eq!(config.longitude, -74.0060);
    assert_eq!(config.frame_rate, 12);
    assert_eq!(config.twilight, Twilight::Astronomical);
    assert!(config.month_offset_correction);
    // Blank values are ignored
    assert_eq!(config.video_codec, "libx264");
}

#[test]
fn test_env_invalid_number() {
    let mut file = ConfigFile::default();
    let result = file.apply_env(env_from(&[("FRAME_RATE", "fast")]));
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            field: "frame_rate",
            ..
        })
    ));

    let result = file.apply_env(env_from(&[("MONTH_OFFSET_CORRECTION", "maybe")]));
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            field: "month_offset_correction",
            ..
        })
    ));
}

#[test]
fn test_env_alone_is_enough() {
    let mut file = ConfigFile::default();
    file.apply_env(env_from(&[
        ("STORAGE_ROOT", "/srv/webcams"),
        ("CAMERAS", "camA,camB"),
        ("LATITUDE", "40.7128"),
        ("LONGITUDE", "-74.0060"),
    ]))
    .unwrap();

    assert_eq!(file.resolve().unwrap(), create_test_config());
}

#[test]
#[serial]
fn test_load_reads_process_environment() {
    let dir = tempdir().unwrap();
    let path = write_config(dir.path(), MINIMAL);

    unsafe {
        std::env::set_var("DAYLAPSE_HOUR_OFFSET", "2.5");
    }
    let result = load(Some(&path));
    unsafe {
        std::env::remove_var("DAYLAPSE_HOUR_OFFSET");
    }

    assert_eq!(result.unwrap().hour_offset, 2.5);
}

#[test]
#[serial]
fn test_default_path_uses_config_home() {
    let dir = tempdir().unwrap();

    let original = std::env::var("XDG_CONFIG_HOME").ok();
    unsafe {
        std::env::set_var("XDG_CONFIG_HOME", dir.path());
    }
    let path = default_config_path();
    unsafe {
        match original {
            Some(val) => std::env::set_var("XDG_CONFIG_HOME", val),
            None => std::env::remove_var("XDG_CONFIG_HOME"),
        }
    }

    if cfg!(target_os = "linux") {
        assert_eq!(
            path.unwrap(),
            dir.path().join("daylapse").join("daylapse.toml")
        );
    }
}

#[test]
fn test_camera_list_forms() {
    assert_eq!(
        CameraList::Csv(" camA, ,camB ".to_string()).ids(),
        vec!["camA", "camB"]
    );
    assert_eq!(
        CameraList::List(vec!["camA".to_string(), "".to_string()]).ids(),
        vec!["camA"]
    );
    assert!(CameraList::Csv(",,".to_string()).ids().is_empty());
}

#[test]
fn test_config_validation_basic() {
    assert!(validate_config(&create_test_config()).is_ok());

    let mut config = create_test_config();
    config.cameras.clear();
    assert!(matches!(
        validate_config(&config),
        Err(ConfigError::Invalid {
            field: "cameras",
            ..
        })
    ));
}

#[test]
fn test_coordinate_ranges() {
    let mut config = create_test_config();
    config.latitude = 90.5;
    assert!(validate_config(&config).is_err());

    let mut config = create_test_config();
    config.longitude = -180.0;
    assert!(validate_config(&config).is_ok());
    config.longitude = f64::NAN;
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_hour_offset_and_frame_rate_ranges() {
    let mut config = create_test_config();
    config.hour_offset = MAXIMUM_HOUR_OFFSET;
    assert!(validate_config(&config).is_ok());
    config.hour_offset = MAXIMUM_HOUR_OFFSET + 0.5;
    assert!(validate_config(&config).is_err());

    let mut config = create_test_config();
    config.frame_rate = MINIMUM_FRAME_RATE - 1;
    assert!(validate_config(&config).is_err());
    config.frame_rate = MAXIMUM_FRAME_RATE;
    assert!(validate_config(&config).is_ok());
}

#[test]
fn test_camera_ids_stay_inside_storage_root() {
    assert!(validate_camera_id("camA").is_ok());
    assert!(validate_camera_id("roof-cam.01").is_ok());
    assert!(validate_camera_id("..").is_err());
    assert!(validate_camera_id(".").is_err());
    assert!(validate_camera_id("a/b").is_err());
    assert!(validate_camera_id("a\\b").is_err());
}

#[test]
fn test_empty_encoder_or_codec() {
    let mut config = create_test_config();
    config.encoder = PathBuf::new();
    assert!(validate_config(&config).is_err());

    let mut config = create_test_config();
    config.video_codec = " ".to_string();
    assert!(validate_config(&config).is_err());
}

#[test]
fn test_calculator_carries_settings() {
    let mut config = create_test_config();
    config.hour_offset = 1.0;
    config.twilight = Twilight::Horizon;
    config.month_offset_correction = true;

    let calc = config.calculator();
    assert_eq!(calc.latitude, 40.7128);
    assert_eq!(calc.hour_offset, 1.0);
    assert_eq!(calc.twilight, Twilight::Horizon);
    assert!(calc.month_offset_correction);
    assert_eq!(config.camera_root("camA"), PathBuf::from("/srv/webcams/camA"));
}
