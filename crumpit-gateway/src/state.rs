//! Shared application state handed to every handler.

use std::sync::Arc;

use axum::response::Response;
use crumpit_backends::{
    ClusterInspector, LiveRunsClient, LiveRunsConnector, MetadataClient, MetadataConnector,
    UnlinkedConnector, UnlinkedInspector,
};
use crumpit_core::{BackendKind, ConfigHandle, Outcome, Serializer};

use crate::response::respond;

/// Configuration, collaborators and serializer shared by all requests.
///
/// Connectors build a fresh client on every request; nothing is pooled.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ConfigHandle>,
    pub live_runs: Arc<LiveRunsConnector>,
    pub metadata: Arc<MetadataConnector>,
    pub cluster: Arc<dyn ClusterInspector>,
    pub serializer: Arc<Serializer>,
}

impl AppState {
    /// Assemble state from explicit collaborators, with the default serializer.
    #[must_use]
    pub fn new(
        config: Arc<ConfigHandle>,
        live_runs: Arc<LiveRunsConnector>,
        metadata: Arc<MetadataConnector>,
        cluster: Arc<dyn ClusterInspector>,
    ) -> Self {
        Self { config, live_runs, metadata, cluster, serializer: Arc::new(Serializer::default()) }
    }

    /// State with no store drivers linked: every backend endpoint reports
    /// its store as unavailable.
    #[must_use]
    pub fn unlinked(config: Arc<ConfigHandle>) -> Self {
        Self::new(
            config,
            Arc::new(UnlinkedConnector::<dyn LiveRunsClient>::new(BackendKind::DocumentStore)),
            Arc::new(UnlinkedConnector::<dyn MetadataClient>::new(BackendKind::RelationalStore)),
            Arc::new(UnlinkedInspector),
        )
    }

    /// Envelope response with HTTP 200.
    #[must_use]
    pub fn reply(&self, outcome: Outcome) -> Response {
        respond(&self.serializer, outcome, Some(200))
    }
}
