//! Contracts of the external collaborators the API delegates to.
//!
//! The live-run client, the metadata client and the cluster inspector are
//! implemented outside this workspace; handlers only see these traits.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use crumpit_core::{ClusterConfig, Document, StoreValue};

use crate::BackendError;

/// Queries over live sequencing-run state held in the document store.
///
/// Implementations must be `Send + Sync` to allow use across async tasks.
#[async_trait]
pub trait LiveRunsClient: Send + Sync {
    /// All runs currently known to the store.
    ///
    /// # Errors
    /// Returns [`BackendError::Unavailable`] if the store cannot be reached.
    async fn list_runs(&self) -> Result<StoreValue, BackendError>;

    /// Render the runs graph to an image file.
    ///
    /// Returns `Ok(None)` when there was nothing to draw or the renderer
    /// declined to produce a file.
    ///
    /// # Errors
    /// Returns [`BackendError`] if the run data could not be gathered.
    async fn build_runs_graph(&self) -> Result<Option<PathBuf>, BackendError>;

    /// Aggregated statistics over the live runs.
    ///
    /// # Errors
    /// Returns [`BackendError`] if the statistics could not be computed.
    async fn live_stats(&self) -> Result<StoreValue, BackendError>;
}

/// Run metadata held in the relational store.
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Information about previously registered runs.
    ///
    /// # Errors
    /// Returns [`BackendError::Unavailable`] if the store cannot be reached.
    async fn list_prior_runs(&self) -> Result<StoreValue, BackendError>;

    /// Field schema for a new run, including the `sequenceKits` table that
    /// maps each sequencing kit to its default barcode kit.
    ///
    /// # Errors
    /// Returns [`BackendError::Unavailable`] if the store cannot be reached.
    async fn run_field_schema(&self) -> Result<StoreValue, BackendError>;

    /// Register a new run from client-supplied fields.
    ///
    /// # Errors
    /// Returns [`BackendError`] if the insert fails.
    async fn create_run(&self, fields: &Document) -> Result<StoreValue, BackendError>;
}

/// Inspects local and remote storage of the sequencing cluster.
#[async_trait]
pub trait ClusterInspector: Send + Sync {
    /// Backup state for each run in `runs`, keyed by run.
    ///
    /// # Errors
    /// Returns [`BackendError`] if either storage location cannot be read.
    async fn backup_info(
        &self,
        log_dir: &Path,
        runs: &StoreValue,
        remote_storage: &serde_json::Value,
    ) -> Result<StoreValue, BackendError>;

    /// Local cluster storage and host information.
    ///
    /// # Errors
    /// Returns [`BackendError`] if the local information cannot be gathered.
    async fn local_info(&self, cluster: &ClusterConfig) -> Result<StoreValue, BackendError>;

    /// Remote backup storage information.
    ///
    /// # Errors
    /// Returns [`BackendError`] if the remote storage cannot be inspected.
    async fn remote_info(&self, remote_storage: &serde_json::Value) -> Result<StoreValue, BackendError>;
}
