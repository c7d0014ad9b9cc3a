use std::sync::Arc;

use crate::action_executor::LaunchError;
use crate::catalog::{CatalogDocument, CatalogDocuments, CatalogState, RevisionMarkers, SessionPatch, SessionState};
use crate::config::{validate, Config, RequeryPolicy};
use crate::contract::{CoreRequest, CoreResponse, DisplayResponse, OpenResponse};
use crate::discovery::{spawn_discovery, DiscoveryProvider, IconDecoder, PendingDiscovery, ProviderError};
use crate::dispatcher::{LaunchDispatcher, RoutingContext};
use crate::merge::merge_plugins;
use crate::model::{LaunchRequest, PluginItem};
use crate::revision_store::{self, DocumentStore, SqliteDocumentStore, StoreError};
use crate::search::{search, DisplayList};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("config error: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("launch error: {0}")]
    Launch(#[from] LaunchError),
    #[error("no display entry at index {0}")]
    EntryNotFound(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryReport {
    /// Catalog grew to `catalog_len` after merging `discovered` items.
    Merged {
        discovered: usize,
        catalog_len: usize,
    },
    /// Discovery failed; the catalog was left as it was.
    Failed(ProviderError),
}

/// Owns everything the launcher core mutates: documents, revisions, catalog and session.
pub struct Launcher<S: DocumentStore = SqliteDocumentStore> {
    config: Config,
    documents: CatalogDocuments<S>,
    state: CatalogState,
    dispatcher: LaunchDispatcher,
}

impl Launcher<SqliteDocumentStore> {
    /// Binds the configured store, then initializes from it.
    pub async fn bind(config: Config, dispatcher: LaunchDispatcher) -> Result<Self, ServiceError> {
        validate(&config).map_err(ServiceError::Config)?;
        let store = revision_store::bind(config.store_path.clone()).await?;
        Self::init(config, store, dispatcher)
    }
}

impl<S: DocumentStore> Launcher<S> {
    /// Loads both documents, merges cache over total and persists the result to both.
    pub fn init(config: Config, store: S, dispatcher: LaunchDispatcher) -> Result<Self, ServiceError> {
        validate(&config).map_err(ServiceError::Config)?;
        let dispatcher = dispatcher.with_reset(config.post_launch_reset);
        let mut documents = CatalogDocuments::new(store, &config.bucket);

        let total = documents.load(CatalogDocument::Total)?;
        let cache = documents.load(CatalogDocument::Cache)?;
        let merged = merge_plugins(&cache, &total);
        tracing::info!(
            event = "catalog_initialized",
            cached = cache.len(),
            total = total.len(),
            merged = merged.len()
        );

        let mut launcher = Self {
            config,
            documents,
            state: CatalogState::default(),
            dispatcher,
        };
        launcher.update_display(DisplayList::Catalog(merged.clone()))?;
        launcher.update_catalog(merged)?;
        Ok(launcher)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &[PluginItem] {
        self.state.catalog()
    }

    pub fn display(&self) -> &DisplayList {
        self.state.display()
    }

    pub fn search_value(&self) -> &str {
        &self.state.session.search_value
    }

    pub fn session(&self) -> &SessionState {
        &self.state.session
    }

    pub fn revisions(&self) -> &RevisionMarkers {
        self.documents.revisions()
    }

    pub fn store(&self) -> &S {
        self.documents.store()
    }

    /// Generic session patch used by the UI layer.
    pub fn commit(&mut self, patch: SessionPatch) {
        self.state.session.apply(patch);
    }

    /// Re-reads both revision tokens, e.g. before retrying after a conflict.
    pub fn reload_revisions(&mut self) -> Result<(), ServiceError> {
        self.documents.reload_revisions()?;
        Ok(())
    }

    pub fn start_discovery(
        &self,
        provider: Arc<dyn DiscoveryProvider>,
        icons: Arc<dyn IconDecoder>,
    ) -> PendingDiscovery {
        spawn_discovery(provider, icons)
    }

    pub async fn finish_discovery(
        &mut self,
        pending: PendingDiscovery,
    ) -> Result<DiscoveryReport, ServiceError> {
        let outcome = pending.wait().await;
        self.apply_discovery(outcome)
    }

    /// Folds discovered apps into the catalog and refreshes the display list once.
    pub fn apply_discovery(
        &mut self,
        outcome: Result<Vec<PluginItem>, ProviderError>,
    ) -> Result<DiscoveryReport, ServiceError> {
        let discovered = match outcome {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!(
                    event = "discovery_failed",
                    error = %error,
                    catalog_len = self.state.catalog().len()
                );
                return Ok(DiscoveryReport::Failed(error));
            }
        };

        let merged = merge_plugins(self.state.catalog(), &discovered);
        let catalog_len = merged.len();
        self.update_display(DisplayList::Catalog(merged.clone()))?;
        self.update_catalog(merged)?;

        let query = match self.config.requery_policy {
            RequeryPolicy::LatestQuery => self.state.session.query().to_string(),
            RequeryPolicy::StoredSearchValue => self.state.session.search_value.clone(),
        };
        tracing::info!(
            event = "discovery_merged",
            discovered = discovered.len(),
            catalog_len,
            requery = query.as_str()
        );
        self.on_search(&query)?;

        Ok(DiscoveryReport::Merged {
            discovered: discovered.len(),
            catalog_len,
        })
    }

    /// Recomputes the display list for `query` and persists it to the cache document.
    /// On a store error nothing in memory changes.
    pub fn on_search(&mut self, query: &str) -> Result<&DisplayList, ServiceError> {
        let listed = search(self.state.catalog(), query);
        tracing::debug!(event = "search", query, results = listed.len());
        self.update_display(listed)?;
        self.state.session.record_query(query);
        Ok(self.state.display())
    }

    /// Launches the display entry at `index`.
    pub fn open(&mut self, index: usize, routing: RoutingContext) -> Result<(), ServiceError> {
        let request = self
            .state
            .display()
            .launch_request(index)
            .ok_or(ServiceError::EntryNotFound(index))?;
        self.dispatch(&request, routing)
    }

    pub fn dispatch(&mut self, request: &LaunchRequest, routing: RoutingContext) -> Result<(), ServiceError> {
        self.dispatcher
            .dispatch(request, routing, &mut self.state.session)
            .map_err(ServiceError::from)
    }

    pub fn handle_command(&mut self, request: CoreRequest) -> Result<CoreResponse, ServiceError> {
        match request {
            CoreRequest::Search { query } => {
                let display = self.on_search(&query)?;
                Ok(CoreResponse::Search(DisplayResponse::from(display)))
            }
            CoreRequest::Open { index, route } => {
                let routing = RoutingContext { route };
                self.open(index, routing)?;
                Ok(CoreResponse::Open(OpenResponse { launched: true }))
            }
        }
    }

    // Both writers persist first, so a rejected write leaves memory as it was.
    fn update_display(&mut self, display: DisplayList) -> Result<(), ServiceError> {
        self.documents.persist(CatalogDocument::Cache, &display)?;
        self.state.set_display(display);
        Ok(())
    }

    fn update_catalog(&mut self, catalog: Vec<PluginItem>) -> Result<(), ServiceError> {
        self.documents.persist(CatalogDocument::Total, &catalog)?;
        self.state.set_catalog(catalog);
        Ok(())
    }
}
