use serde::{Deserialize, Serialize};

use crate::model::{PluginItem, SearchOption};
use crate::search::DisplayList;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayEntryDto {
    pub name: String,
    pub value: String,
    pub icon: String,
    pub desc: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayResponse {
    pub entries: Vec<DisplayEntryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenResponse {
    pub launched: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreRequest {
    Search { query: String },
    Open { index: usize, route: Option<String> },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "payload")]
pub enum CoreResponse {
    Search(DisplayResponse),
    Open(OpenResponse),
}

impl From<&PluginItem> for DisplayEntryDto {
    fn from(value: &PluginItem) -> Self {
        Self {
            name: value.name.clone(),
            value: value.kind.as_str().to_string(),
            icon: value.resolved_icon(),
            desc: value.description.clone(),
            kind: value.kind.as_str().to_string(),
        }
    }
}

impl From<&SearchOption> for DisplayEntryDto {
    fn from(value: &SearchOption) -> Self {
        Self {
            name: value.name.clone(),
            value: value.value.clone(),
            icon: value.icon.clone(),
            desc: value.desc.clone(),
            kind: value.kind.as_str().to_string(),
        }
    }
}

impl From<&DisplayList> for DisplayResponse {
    fn from(value: &DisplayList) -> Self {
        let entries = match value {
            DisplayList::Catalog(items) => items.iter().map(DisplayEntryDto::from).collect(),
            DisplayList::Matches(options) => options.iter().map(DisplayEntryDto::from).collect(),
        };
        Self { entries }
    }
}
