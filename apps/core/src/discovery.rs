use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinHandle;
use walkdir::WalkDir;

use crate::model::PluginItem;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ProviderError {
    message: String,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns an application's icon source into something the UI can display.
pub trait IconDecoder: Send + Sync {
    fn decode(&self, source: &Path) -> Option<String>;
}

/// Hands icon paths through untouched; the UI resolves them itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct PathIconDecoder;

impl IconDecoder for PathIconDecoder {
    fn decode(&self, source: &Path) -> Option<String> {
        Some(source.to_string_lossy().into_owned())
    }
}

pub trait DiscoveryProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;
    fn discover(&self, icons: &dyn IconDecoder) -> Result<Vec<PluginItem>, ProviderError>;
}

pub struct AppProvider {
    apps: Vec<PluginItem>,
}

impl AppProvider {
    pub fn from_apps(apps: Vec<PluginItem>) -> Self {
        Self { apps }
    }

    pub fn deterministic_fixture() -> Self {
        Self {
            apps: vec![
                PluginItem::app(
                    "Calculator",
                    "open -a \"/Applications/Calculator.app\"",
                    "/Applications/Calculator.app",
                )
                .with_description("/Applications/Calculator.app"),
                PluginItem::app(
                    "Terminal",
                    "open -a \"/Applications/Utilities/Terminal.app\"",
                    "/Applications/Utilities/Terminal.app",
                )
                .with_description("/Applications/Utilities/Terminal.app"),
            ],
        }
    }
}

impl DiscoveryProvider for AppProvider {
    fn provider_name(&self) -> &'static str {
        "app"
    }

    fn discover(&self, _icons: &dyn IconDecoder) -> Result<Vec<PluginItem>, ProviderError> {
        Ok(self.apps.clone())
    }
}

/// Scans application folders for `.app` bundles and freedesktop `.desktop` entries.
pub struct ApplicationDirProvider {
    roots: Vec<PathBuf>,
    max_depth: usize,
}

impl ApplicationDirProvider {
    pub fn new(roots: Vec<PathBuf>, max_depth: usize) -> Self {
        Self { roots, max_depth }
    }
}

impl DiscoveryProvider for ApplicationDirProvider {
    fn provider_name(&self) -> &'static str {
        "application_dirs"
    }

    fn discover(&self, icons: &dyn IconDecoder) -> Result<Vec<PluginItem>, ProviderError> {
        let mut apps = Vec::new();

        for root in &self.roots {
            if !root.is_dir() {
                tracing::debug!(event = "discovery_root_skipped", root = %root.display());
                continue;
            }

            let mut walker = WalkDir::new(root)
                .max_depth(self.max_depth)
                .follow_links(false)
                .into_iter();
            while let Some(entry) = walker.next() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(error) => {
                        tracing::debug!(event = "discovery_entry_unreadable", error = %error);
                        continue;
                    }
                };
                let path = entry.path();
                let extension = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(str::to_ascii_lowercase);

                match extension.as_deref() {
                    Some("app") if entry.file_type().is_dir() => {
                        apps.push(bundle_item(path, icons));
                        // bundles nest helper apps; never descend into them
                        walker.skip_current_dir();
                    }
                    Some("desktop") if entry.file_type().is_file() => {
                        match std::fs::read_to_string(path) {
                            Ok(raw) => {
                                if let Some(item) = desktop_entry_item(path, &raw, icons) {
                                    apps.push(item);
                                }
                            }
                            Err(error) => tracing::debug!(
                                event = "discovery_desktop_entry_unreadable",
                                path = %path.display(),
                                error = %error
                            ),
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(apps)
    }
}

fn bundle_item(path: &Path, icons: &dyn IconDecoder) -> PluginItem {
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let display = path.to_string_lossy();
    let logo = icons.decode(path).unwrap_or_default();
    PluginItem::app(&name, &format!("open -a \"{display}\""), &logo).with_description(&display)
}

fn desktop_entry_item(path: &Path, raw: &str, icons: &dyn IconDecoder) -> Option<PluginItem> {
    let mut in_entry = false;
    let mut name = None;
    let mut exec = None;
    let mut icon = None;

    for line in raw.lines().map(str::trim) {
        if line.starts_with('[') {
            in_entry = line == "[Desktop Entry]";
            continue;
        }
        if !in_entry {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim() {
            "Name" => name = Some(value.trim().to_string()),
            "Exec" => exec = Some(strip_field_codes(value)),
            "Icon" => icon = Some(value.trim().to_string()),
            "NoDisplay" | "Hidden" if value.trim().eq_ignore_ascii_case("true") => return None,
            _ => {}
        }
    }

    let name = name.filter(|name| !name.is_empty())?;
    let exec = exec.filter(|exec| !exec.is_empty())?;
    let logo = icon
        .and_then(|icon| icons.decode(Path::new(&icon)))
        .unwrap_or_default();
    Some(PluginItem::app(&name, &exec, &logo).with_description(&path.to_string_lossy()))
}

/// Drops `%f`, `%U` and friends from a desktop `Exec` line.
fn strip_field_codes(exec: &str) -> String {
    exec.split_whitespace()
        .filter(|part| !(part.len() == 2 && part.starts_with('%')))
        .collect::<Vec<_>>()
        .join(" ")
}

/// One in-flight discovery run.
pub struct PendingDiscovery {
    provider: &'static str,
    handle: JoinHandle<Result<Vec<PluginItem>, ProviderError>>,
}

impl PendingDiscovery {
    pub fn provider_name(&self) -> &'static str {
        self.provider
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn wait(self) -> Result<Vec<PluginItem>, ProviderError> {
        match self.handle.await {
            Ok(result) => result,
            Err(error) if error.is_panic() => Err(ProviderError::new(format!(
                "{} discovery panicked",
                self.provider
            ))),
            Err(error) => Err(ProviderError::new(format!(
                "{} discovery did not complete: {error}",
                self.provider
            ))),
        }
    }
}

/// Runs the provider on the blocking pool. Must be called inside a tokio runtime.
pub fn spawn_discovery(
    provider: Arc<dyn DiscoveryProvider>,
    icons: Arc<dyn IconDecoder>,
) -> PendingDiscovery {
    let name = provider.provider_name();
    tracing::info!(event = "discovery_started", provider = name);
    let handle = tokio::task::spawn_blocking(move || provider.discover(icons.as_ref()));
    PendingDiscovery {
        provider: name,
        handle,
    }
}
