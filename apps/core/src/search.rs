use std::collections::HashSet;

use serde::Serialize;

use crate::model::{fold_case, LaunchRequest, PluginItem, SearchOption};

/// What the UI shows: the raw catalog for an empty query, otherwise the ranked options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DisplayList {
    Catalog(Vec<PluginItem>),
    Matches(Vec<SearchOption>),
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::Catalog(Vec::new())
    }
}

impl DisplayList {
    pub fn len(&self) -> usize {
        match self {
            Self::Catalog(items) => items.len(),
            Self::Matches(options) => options.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Launch request for the entry at `index`.
    pub fn launch_request(&self, index: usize) -> Option<LaunchRequest> {
        match self {
            Self::Catalog(items) => items.get(index).cloned().map(LaunchRequest::for_item),
            Self::Matches(options) => options.get(index).map(|option| option.launch.clone()),
        }
    }

    pub fn options(&self) -> Option<&[SearchOption]> {
        match self {
            Self::Matches(options) => Some(options.as_slice()),
            Self::Catalog(_) => None,
        }
    }
}

pub fn search(catalog: &[PluginItem], query: &str) -> DisplayList {
    if query.is_empty() {
        return DisplayList::Catalog(catalog.to_vec());
    }

    let needle = fold_case(query);
    let mut options = command_matches(catalog, &needle);
    options.extend(keyword_matches(catalog, &needle));
    DisplayList::Matches(options)
}

fn command_matches(catalog: &[PluginItem], needle: &str) -> Vec<SearchOption> {
    let mut options = Vec::new();

    for item in catalog.iter().filter(|item| item.takes_command_matches()) {
        let icon = item.resolved_icon();
        for feature in &item.features {
            for cmd in &feature.cmds {
                if !fold_case(cmd.match_text()).contains(needle) {
                    continue;
                }
                options.push(SearchOption {
                    name: cmd.label().to_string(),
                    value: "plugin".to_string(),
                    icon: icon.clone(),
                    desc: feature.explain.clone(),
                    kind: item.kind,
                    launch: LaunchRequest::Plugin {
                        cmd: Some(cmd.clone()),
                        item: item.clone(),
                        feature: Some(feature.clone()),
                    },
                });
            }
        }
    }

    options
}

fn keyword_matches(catalog: &[PluginItem], needle: &str) -> Vec<SearchOption> {
    let mut visited: HashSet<String> = HashSet::with_capacity(catalog.len());
    let mut options = Vec::new();

    for item in catalog {
        if !visited.insert(item.identity_key()) {
            continue;
        }
        // first hit wins, even when a later keyword would be a closer match
        let Some(keyword) = item
            .key_words
            .iter()
            .find(|keyword| fold_case(keyword).contains(needle))
        else {
            continue;
        };

        options.push(SearchOption {
            name: keyword.clone(),
            value: item.kind.as_str().to_string(),
            icon: item.resolved_icon(),
            desc: item.description.clone(),
            kind: item.kind,
            launch: LaunchRequest::for_item(item.clone()),
        });
    }

    options
}
