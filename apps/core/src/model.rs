use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginType {
    App,
    Dev,
    Installed,
}

impl PluginType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::App => "app",
            Self::Dev => "dev",
            Self::Installed => "installed",
        }
    }
}

/// Structured command entry, e.g. `{"type": "regex", "label": "Open URL", "match": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    Text(String),
    Descriptor(CommandDescriptor),
}

impl Command {
    pub fn text(value: &str) -> Self {
        Self::Text(value.to_string())
    }

    /// Text the search query is matched against.
    pub fn match_text(&self) -> &str {
        match self {
            Self::Text(text) => text.as_str(),
            Self::Descriptor(descriptor) => descriptor.kind.as_str(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Text(text) => text.as_str(),
            Self::Descriptor(descriptor) => descriptor
                .label
                .as_deref()
                .filter(|label| !label.is_empty())
                .unwrap_or(descriptor.kind.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub cmds: Vec<Command>,
    #[serde(default)]
    pub explain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl Feature {
    pub fn new(cmds: Vec<Command>, explain: &str) -> Self {
        Self {
            cmds,
            explain: explain.to_string(),
            code: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PluginType,
    #[serde(default = "default_status")]
    pub status: bool,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub key_words: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(default)]
    pub logo: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub description: String,
}

fn default_status() -> bool {
    true
}

impl PluginItem {
    pub fn new(name: &str, kind: PluginType) -> Self {
        Self {
            name: name.to_string(),
            kind,
            status: true,
            features: Vec::new(),
            key_words: Vec::new(),
            source_file: None,
            logo: String::new(),
            action: String::new(),
            description: String::new(),
        }
    }

    pub fn app(name: &str, action: &str, logo: &str) -> Self {
        Self {
            key_words: vec![name.to_string()],
            action: action.to_string(),
            logo: logo.to_string(),
            ..Self::new(name, PluginType::App)
        }
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features = features;
        self
    }

    pub fn with_key_words(mut self, key_words: &[&str]) -> Self {
        self.key_words = key_words.iter().map(|kw| kw.to_string()).collect();
        self
    }

    pub fn with_source_file(mut self, source_file: &str) -> Self {
        self.source_file = Some(source_file.to_string());
        self
    }

    pub fn with_status(mut self, status: bool) -> Self {
        self.status = status;
        self
    }

    pub fn with_logo(mut self, logo: &str) -> Self {
        self.logo = logo.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Deduplication key: the plugin's manifest path when known, else type and name.
    pub fn identity_key(&self) -> String {
        match self.source_file.as_deref() {
            Some(source) if !source.is_empty() => format!("file:{source}"),
            _ => format!("{}:{}", self.kind.as_str(), self.name),
        }
    }

    /// Apps and disabled dev plugins never contribute command matches.
    pub fn takes_command_matches(&self) -> bool {
        match self.kind {
            PluginType::App => false,
            PluginType::Dev => self.status,
            PluginType::Installed => true,
        }
    }

    pub fn resolved_icon(&self) -> String {
        match self.source_file.as_deref() {
            Some(source) if !source.is_empty() => {
                let joined = Path::new(source).join("..").join(&self.logo);
                format!("image://{}", normalize_path(&joined).to_string_lossy())
            }
            _ => self.logo.clone(),
        }
    }
}

/// Lexically resolves `.` and `..` components without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

pub fn fold_case(input: &str) -> String {
    input.to_lowercase()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LaunchRequest {
    Plugin {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cmd: Option<Command>,
        item: PluginItem,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        feature: Option<Feature>,
    },
    App {
        item: PluginItem,
    },
}

impl LaunchRequest {
    pub fn for_item(item: PluginItem) -> Self {
        if item.kind == PluginType::App {
            Self::App { item }
        } else {
            Self::Plugin {
                cmd: None,
                item,
                feature: None,
            }
        }
    }

    pub fn item(&self) -> &PluginItem {
        match self {
            Self::Plugin { item, .. } | Self::App { item } => item,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOption {
    pub name: String,
    pub value: String,
    pub icon: String,
    pub desc: String,
    #[serde(rename = "type")]
    pub kind: PluginType,
    pub launch: LaunchRequest,
}
