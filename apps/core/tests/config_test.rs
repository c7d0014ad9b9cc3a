use std::time::{SystemTime, UNIX_EPOCH};

use launchdeck_core::config::{self, Config, ConfigError, RequeryPolicy};
use launchdeck_core::dispatcher::PostLaunchReset;

fn unique_config_path(label: &str) -> std::path::PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir()
        .join("launchdeck")
        .join(format!("{label}-{unique}.toml"))
}

#[test]
fn accepts_default_config() {
    let cfg = Config::default();
    assert_eq!(cfg.bucket, "main");
    assert_eq!(cfg.requery_policy, RequeryPolicy::LatestQuery);
    assert_eq!(cfg.post_launch_reset, PostLaunchReset::AppOnly);
    assert!(cfg.store_path.to_string_lossy().contains("launchdeck"));
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn rejects_scan_depth_out_of_range() {
    let cfg = Config {
        app_scan_depth: 40,
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn rejects_blank_bucket() {
    let cfg = Config {
        bucket: "  ".to_string(),
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn missing_file_loads_defaults() {
    let path = unique_config_path("missing");
    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.config_path, path);
    assert_eq!(cfg.bucket, "main");
}

#[test]
fn partial_file_overrides_only_given_keys() {
    let path = unique_config_path("partial");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        "requery_policy = \"stored_search_value\"\npost_launch_reset = \"always\"\napp_scan_depth = 2\n",
    )
    .unwrap();

    let cfg = config::load(Some(&path)).unwrap();
    assert_eq!(cfg.requery_policy, RequeryPolicy::StoredSearchValue);
    assert_eq!(cfg.post_launch_reset, PostLaunchReset::Always);
    assert_eq!(cfg.app_scan_depth, 2);
    assert_eq!(cfg.bucket, "main");

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn saved_config_loads_back() {
    let path = unique_config_path("saved");
    let cfg = Config {
        config_path: path.clone(),
        bucket: "launcher".to_string(),
        discovery_enabled: false,
        ..Default::default()
    };

    config::save(&cfg).unwrap();
    let loaded = config::load(Some(&path)).unwrap();
    assert_eq!(loaded, cfg);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn invalid_file_reports_parse_error() {
    let path = unique_config_path("invalid");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "app_scan_depth = \"deep\"\n").unwrap();

    let result = config::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn invalid_values_are_rejected_on_load() {
    let path = unique_config_path("out-of-range");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "app_scan_depth = 0\n").unwrap();

    let result = config::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Invalid(_))));

    std::fs::remove_file(&path).unwrap();
}
