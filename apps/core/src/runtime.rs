use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{self, ConfigError};
use crate::contract::DisplayResponse;
use crate::core_service::{DiscoveryReport, Launcher, ServiceError};
use crate::discovery::{ApplicationDirProvider, PathIconDecoder};
use crate::dispatcher::LaunchDispatcher;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("service error: {0}")]
    Service(#[from] ServiceError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOptions {
    pub config_path: Option<PathBuf>,
    pub query: String,
    pub discovery: bool,
}

pub fn parse_cli_args(args: &[String]) -> Result<RuntimeOptions, String> {
    let mut options = RuntimeOptions {
        discovery: true,
        ..Default::default()
    };

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let value = iter.next().ok_or("--config requires a path")?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--query" => {
                let value = iter.next().ok_or("--query requires a value")?;
                options.query = value.clone();
            }
            "--no-discovery" => options.discovery = false,
            other => return Err(format!("unknown argument '{other}'")),
        }
    }

    Ok(options)
}

pub fn run_with_options(options: RuntimeOptions) -> Result<(), RuntimeError> {
    let config = config::load(options.config_path.as_deref())?;
    if !config.config_path.exists() {
        config::save(&config)?;
    }
    let logging = crate::logging::init(&config)?;
    tracing::info!(
        event = "startup",
        config_path = %config.config_path.display(),
        store_path = %config.store_path.display(),
        log_dir = %logging.log_dir.display()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let discover = options.discovery && config.discovery_enabled;
        let provider = Arc::new(ApplicationDirProvider::new(
            config.app_dirs.clone(),
            config.app_scan_depth,
        ));
        let mut launcher = Launcher::bind(config, LaunchDispatcher::default()).await?;

        if discover {
            let pending = launcher.start_discovery(provider, Arc::new(PathIconDecoder));
            if let DiscoveryReport::Failed(error) = launcher.finish_discovery(pending).await? {
                eprintln!("[launchdeck-core] discovery failed: {error}");
            }
        }

        let display = launcher.on_search(&options.query)?;
        let encoded = serde_json::to_string_pretty(&DisplayResponse::from(display))?;
        println!("{encoded}");
        Ok::<(), RuntimeError>(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn defaults_enable_discovery_with_empty_query() {
        let options = parse_cli_args(&[]).unwrap();
        assert!(options.discovery);
        assert!(options.query.is_empty());
        assert_eq!(options.config_path, None);
    }

    #[test]
    fn parses_all_flags() {
        let options = parse_cli_args(&args(&[
            "--config",
            "/tmp/launchdeck.toml",
            "--query",
            "calc",
            "--no-discovery",
        ]))
        .unwrap();
        assert_eq!(options.config_path, Some(PathBuf::from("/tmp/launchdeck.toml")));
        assert_eq!(options.query, "calc");
        assert!(!options.discovery);
    }

    #[test]
    fn rejects_missing_values_and_unknown_flags() {
        assert_eq!(
            parse_cli_args(&args(&["--query"])),
            Err("--query requires a value".to_string())
        );
        assert_eq!(
            parse_cli_args(&args(&["--verbose"])),
            Err("unknown argument '--verbose'".to_string())
        );
    }
}
