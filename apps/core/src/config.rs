use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::catalog::DEFAULT_BUCKET;
use crate::dispatcher::PostLaunchReset;

const APP_DIR_NAME: &str = "launchdeck";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Which query is re-applied once background discovery lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequeryPolicy {
    /// The last query handed to search, including an empty one.
    #[default]
    LatestQuery,
    /// The stored search value, which an empty query never clears.
    StoredSearchValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store_path: PathBuf,
    #[serde(skip)]
    pub config_path: PathBuf,
    pub bucket: String,
    pub requery_policy: RequeryPolicy,
    pub post_launch_reset: PostLaunchReset,
    pub discovery_enabled: bool,
    pub app_dirs: Vec<PathBuf>,
    pub app_scan_depth: usize,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        let base = stable_app_data_dir();
        Self {
            store_path: base.join("store.sqlite3"),
            config_path: base.join(CONFIG_FILE_NAME),
            bucket: DEFAULT_BUCKET.to_string(),
            requery_policy: RequeryPolicy::default(),
            post_launch_reset: PostLaunchReset::default(),
            discovery_enabled: true,
            app_dirs: default_app_dirs(),
            app_scan_depth: 3,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("{0}")]
    Invalid(String),
}

pub fn stable_app_data_dir() -> PathBuf {
    let base = std::env::var_os("XDG_DATA_HOME")
        .or_else(|| std::env::var_os("APPDATA"))
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share")))
        .unwrap_or_else(std::env::temp_dir);
    base.join(APP_DIR_NAME)
}

fn default_app_dirs() -> Vec<PathBuf> {
    if cfg!(target_os = "macos") {
        vec![
            PathBuf::from("/Applications"),
            PathBuf::from("/System/Applications"),
        ]
    } else if cfg!(target_os = "windows") {
        std::env::var_os("APPDATA")
            .map(|appdata| {
                vec![PathBuf::from(appdata).join("Microsoft\\Windows\\Start Menu\\Programs")]
            })
            .unwrap_or_default()
    } else {
        let mut dirs = vec![PathBuf::from("/usr/share/applications")];
        if let Some(home) = std::env::var_os("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/applications"));
        }
        dirs
    }
}

/// Loads `path` (or the default location). A missing file yields defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| stable_app_data_dir().join(CONFIG_FILE_NAME));

    let mut config = match std::fs::read_to_string(&config_path) {
        Ok(raw) => toml::from_str::<Config>(&raw).map_err(|source| ConfigError::Parse {
            path: config_path.clone(),
            source,
        })?,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(source) => {
            return Err(ConfigError::Io {
                path: config_path,
                source,
            })
        }
    };
    config.config_path = config_path;
    validate(&config).map_err(ConfigError::Invalid)?;
    Ok(config)
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    let encoded = toml::to_string_pretty(cfg)?;
    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&cfg.config_path, encoded).map_err(|source| ConfigError::Io {
        path: cfg.config_path.clone(),
        source,
    })
}

pub fn validate(cfg: &Config) -> Result<(), String> {
    if cfg.store_path.as_os_str().is_empty() {
        return Err("store_path is required".into());
    }

    if cfg.bucket.trim().is_empty() {
        return Err("bucket is required".into());
    }

    if !(1..=8).contains(&cfg.app_scan_depth) {
        return Err("app_scan_depth out of range".into());
    }

    if cfg.log_level.trim().is_empty() {
        return Err("log_level is required".into());
    }

    Ok(())
}
