use serde::Deserialize;

use crate::merge::merge_plugins;
use crate::model::{PluginItem, SearchOption};
use crate::revision_store::{DocumentStore, PutRequest, StoreError};
use crate::search::DisplayList;

pub const DEFAULT_BUCKET: &str = "main";
pub const TOTAL_PLUGINS_ID: &str = "totalPlugins";
pub const CACHE_PLUGINS_ID: &str = "cachePlugins";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogDocument {
    /// Full catalog snapshot.
    Total,
    /// Display list snapshot.
    Cache,
}

impl CatalogDocument {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Total => TOTAL_PLUGINS_ID,
            Self::Cache => CACHE_PLUGINS_ID,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevisionMarkers {
    pub total: Option<String>,
    pub cache: Option<String>,
}

impl RevisionMarkers {
    pub fn get(&self, document: CatalogDocument) -> Option<&str> {
        match document {
            CatalogDocument::Total => self.total.as_deref(),
            CatalogDocument::Cache => self.cache.as_deref(),
        }
    }

    fn slot(&mut self, document: CatalogDocument) -> &mut Option<String> {
        match document {
            CatalogDocument::Total => &mut self.total,
            CatalogDocument::Cache => &mut self.cache,
        }
    }
}

/// Reads and writes the two catalog documents, chaining each write on the
/// revision returned by the previous one.
pub struct CatalogDocuments<S: DocumentStore> {
    store: S,
    bucket: String,
    revisions: RevisionMarkers,
}

impl<S: DocumentStore> CatalogDocuments<S> {
    pub fn new(store: S, bucket: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
            revisions: RevisionMarkers::default(),
        }
    }

    pub fn revisions(&self) -> &RevisionMarkers {
        &self.revisions
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads a document and adopts its revision. A missing document is an empty list.
    pub fn load(&mut self, document: CatalogDocument) -> Result<Vec<PluginItem>, StoreError> {
        let stored = self.store.get(&self.bucket, document.id())?;
        let Some(stored) = stored else {
            *self.revisions.slot(document) = None;
            return Ok(Vec::new());
        };
        *self.revisions.slot(document) = Some(stored.revision);
        Ok(decode_snapshot(document, &stored.data))
    }

    /// Re-reads both revision tokens without touching any in-memory catalog.
    pub fn reload_revisions(&mut self) -> Result<(), StoreError> {
        for document in [CatalogDocument::Total, CatalogDocument::Cache] {
            let current = self
                .store
                .get(&self.bucket, document.id())?
                .map(|stored| stored.revision);
            *self.revisions.slot(document) = current;
        }
        Ok(())
    }

    pub fn persist<T: serde::Serialize + ?Sized>(
        &mut self,
        document: CatalogDocument,
        payload: &T,
    ) -> Result<String, StoreError> {
        let request = PutRequest {
            id: document.id().to_string(),
            data: serde_json::to_value(payload)?,
            expected_revision: self.revisions.get(document).map(str::to_string),
        };
        let revision = self.store.put(&self.bucket, request)?;
        *self.revisions.slot(document) = Some(revision.clone());
        tracing::debug!(
            event = "catalog_document_persisted",
            document = document.id(),
            revision = revision.as_str()
        );
        Ok(revision)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotEntry {
    Option(Box<SearchOption>),
    Item(Box<PluginItem>),
}

/// Decodes a persisted snapshot leniently. Cached search options are folded back
/// into the items they launch; undecodable entries are dropped.
pub fn decode_snapshot(document: CatalogDocument, data: &serde_json::Value) -> Vec<PluginItem> {
    let Some(entries) = data.as_array() else {
        tracing::warn!(
            event = "catalog_snapshot_malformed",
            document = document.id(),
            reason = "payload is not a list"
        );
        return Vec::new();
    };

    let mut dropped = 0_usize;
    let items: Vec<PluginItem> = entries
        .iter()
        .filter_map(|entry| match SnapshotEntry::deserialize(entry) {
            Ok(SnapshotEntry::Item(item)) => Some(*item),
            Ok(SnapshotEntry::Option(option)) => Some(option.launch.item().clone()),
            Err(_) => {
                dropped += 1;
                None
            }
        })
        .collect();

    if dropped > 0 {
        tracing::warn!(
            event = "catalog_snapshot_entries_dropped",
            document = document.id(),
            dropped
        );
    }
    merge_plugins(&items, &[])
}

/// Field-by-field update of the shared session state; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPatch {
    pub selected: Option<Option<usize>>,
    pub show_main: Option<bool>,
    pub options: Option<Vec<SearchOption>>,
    pub search_value: Option<String>,
}

impl SessionPatch {
    /// State after a completed app launch.
    pub fn reset() -> Self {
        Self {
            selected: Some(None),
            show_main: Some(false),
            options: Some(Vec::new()),
            search_value: Some(String::new()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub selected: Option<usize>,
    pub show_main: bool,
    pub options: Vec<SearchOption>,
    pub search_value: String,
    query: String,
}

impl SessionState {
    pub fn apply(&mut self, patch: SessionPatch) {
        if let Some(selected) = patch.selected {
            self.selected = selected;
        }
        if let Some(show_main) = patch.show_main {
            self.show_main = show_main;
        }
        if let Some(options) = patch.options {
            self.options = options;
        }
        if let Some(search_value) = patch.search_value {
            self.query.clone_from(&search_value);
            self.search_value = search_value;
        }
    }

    /// Query currently applied to the display list, empty queries included.
    /// Follows every write to `search_value` made through a patch.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Records a search. Only non-empty queries replace `search_value`.
    pub(crate) fn record_query(&mut self, query: &str) {
        self.query = query.to_string();
        if !query.is_empty() {
            self.search_value = query.to_string();
        }
    }
}

/// In-memory catalog plus its derived display list.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    catalog: Vec<PluginItem>,
    display: DisplayList,
    pub session: SessionState,
}

impl CatalogState {
    pub fn catalog(&self) -> &[PluginItem] {
        &self.catalog
    }

    pub fn display(&self) -> &DisplayList {
        &self.display
    }

    pub(crate) fn set_catalog(&mut self, catalog: Vec<PluginItem>) {
        self.catalog = catalog;
    }

    pub(crate) fn set_display(&mut self, display: DisplayList) {
        self.display = display;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patch_only_touches_present_fields() {
        let mut session = SessionState {
            selected: Some(2),
            show_main: true,
            options: Vec::new(),
            search_value: "calc".to_string(),
            query: "calc".to_string(),
        };
        session.apply(SessionPatch {
            show_main: Some(false),
            ..Default::default()
        });
        assert_eq!(session.selected, Some(2));
        assert!(!session.show_main);
        assert_eq!(session.search_value, "calc");
        assert_eq!(session.query(), "calc");
    }

    #[test]
    fn reset_clears_the_applied_query() {
        let mut session = SessionState::default();
        session.record_query("calc");
        assert_eq!(session.query(), "calc");

        session.apply(SessionPatch::reset());
        assert_eq!(session.query(), "");
        assert_eq!(session.search_value, "");
    }

    #[test]
    fn empty_search_keeps_search_value_but_clears_query() {
        let mut session = SessionState::default();
        session.record_query("calc");
        session.record_query("");
        assert_eq!(session.query(), "");
        assert_eq!(session.search_value, "calc");
    }

    #[test]
    fn non_list_snapshot_is_empty() {
        let data = serde_json::json!({"unexpected": true});
        assert!(decode_snapshot(CatalogDocument::Total, &data).is_empty());
    }
}
