//! In-memory collaborators for tests.
//!
//! Enabled inside this crate's tests and for dependents through the
//! `test-support` feature.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use crumpit_core::{BackendKind, ClusterConfig, Document, StoreValue};
use serde_json::Value;

use crate::{
    host_field, port_field, BackendConnector, BackendError, ClusterInspector, Construction, LiveRunsClient,
    MetadataClient,
};

fn canned<T: Clone>(result: &Result<T, String>) -> Result<T, BackendError> {
    result.clone().map_err(BackendError::Query)
}

/// Connector that hands out one shared client and records each constructor call.
///
/// Like a real driver it rejects a non-string host or an unusable port; the
/// call is recorded either way.
pub struct FakeConnector<C: ?Sized> {
    kind: BackendKind,
    client: Option<Arc<C>>,
    calls: Mutex<Vec<Construction>>,
}

impl<C: ?Sized> FakeConnector<C> {
    /// Every constructor succeeds and returns `client`.
    pub fn serving(kind: BackendKind, client: Arc<C>) -> Self {
        Self { kind, client: Some(client), calls: Mutex::new(Vec::new()) }
    }

    /// Every constructor fails as if the store were down.
    pub fn refusing(kind: BackendKind) -> Self {
        Self { kind, client: None, calls: Mutex::new(Vec::new()) }
    }

    /// The constructor calls made so far, in order.
    ///
    /// # Panics
    /// Panics if the internal `Mutex` is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<Construction> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let calls = self.calls.lock().expect("fake connector lock poisoned");
        calls.clone()
    }

    fn connect(&self, construction: Construction) -> Result<Arc<C>, BackendError> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.calls.lock().expect("fake connector lock poisoned").push(construction.clone());
        match &construction {
            Construction::Defaults => {}
            Construction::Host(ip) => {
                host_field(self.kind, ip)?;
            }
            Construction::Address(ip, port) => {
                host_field(self.kind, ip)?;
                port_field(self.kind, port)?;
            }
        }
        self.client.clone().ok_or_else(|| BackendError::Unavailable {
            kind: self.kind,
            reason: format!("connection refused ({construction})"),
        })
    }
}

#[async_trait]
impl<C: ?Sized + Send + Sync> BackendConnector for FakeConnector<C> {
    type Client = C;

    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn connect_default(&self) -> Result<Arc<C>, BackendError> {
        self.connect(Construction::Defaults)
    }

    async fn connect_host(&self, ip: &Value) -> Result<Arc<C>, BackendError> {
        self.connect(Construction::Host(ip.clone()))
    }

    async fn connect_addr(&self, ip: &Value, port: &Value) -> Result<Arc<C>, BackendError> {
        self.connect(Construction::Address(ip.clone(), port.clone()))
    }
}

/// Document-store client answering from canned results.
#[derive(Debug, Clone)]
pub struct FakeLiveRuns {
    pub runs: Result<StoreValue, String>,
    pub graph: Result<Option<PathBuf>, String>,
    pub stats: Result<StoreValue, String>,
}

impl Default for FakeLiveRuns {
    fn default() -> Self {
        Self {
            runs: Ok(StoreValue::Array(Vec::new())),
            graph: Ok(None),
            stats: Ok(StoreValue::Document(Document::new())),
        }
    }
}

#[async_trait]
impl LiveRunsClient for FakeLiveRuns {
    async fn list_runs(&self) -> Result<StoreValue, BackendError> {
        canned(&self.runs)
    }

    async fn build_runs_graph(&self) -> Result<Option<PathBuf>, BackendError> {
        canned(&self.graph)
    }

    async fn live_stats(&self) -> Result<StoreValue, BackendError> {
        canned(&self.stats)
    }
}

/// Relational-store client answering from canned results and recording created runs.
#[derive(Debug)]
pub struct FakeMetadata {
    pub prior_runs: Result<StoreValue, String>,
    pub schema: Result<StoreValue, String>,
    pub create_result: Result<StoreValue, String>,
    created: Mutex<Vec<Document>>,
}

impl FakeMetadata {
    /// A client whose schema is `schema` and whose other calls succeed with empty data.
    #[must_use]
    pub fn with_schema(schema: StoreValue) -> Self {
        Self { schema: Ok(schema), ..Self::default() }
    }

    /// Field sets passed to `create_run`, in call order.
    ///
    /// # Panics
    /// Panics if the internal `Mutex` is poisoned.
    #[must_use]
    pub fn created(&self) -> Vec<Document> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let created = self.created.lock().expect("fake metadata lock poisoned");
        created.clone()
    }
}

impl Default for FakeMetadata {
    fn default() -> Self {
        Self {
            prior_runs: Ok(StoreValue::Array(Vec::new())),
            schema: Ok(StoreValue::Document(Document::new())),
            create_result: Ok(StoreValue::Bool(true)),
            created: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl MetadataClient for FakeMetadata {
    async fn list_prior_runs(&self) -> Result<StoreValue, BackendError> {
        canned(&self.prior_runs)
    }

    async fn run_field_schema(&self) -> Result<StoreValue, BackendError> {
        canned(&self.schema)
    }

    async fn create_run(&self, fields: &Document) -> Result<StoreValue, BackendError> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        self.created.lock().expect("fake metadata lock poisoned").push(fields.clone());
        canned(&self.create_result)
    }
}

/// Cluster inspector that echoes its inputs back inside canned documents.
#[derive(Debug, Clone, Default)]
pub struct FakeInspector {
    /// When set, every call fails with this message.
    pub failure: Option<String>,
}

impl FakeInspector {
    fn check(&self) -> Result<(), BackendError> {
        match &self.failure {
            Some(reason) => Err(BackendError::Query(reason.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterInspector for FakeInspector {
    async fn backup_info(
        &self,
        log_dir: &Path,
        runs: &StoreValue,
        remote_storage: &serde_json::Value,
    ) -> Result<StoreValue, BackendError> {
        self.check()?;
        let mut info = Document::new();
        info.insert("logDir".to_owned(), log_dir.display().to_string().into());
        info.insert("runs".to_owned(), runs.clone());
        info.insert("remoteStorage".to_owned(), remote_storage.clone().into());
        Ok(info.into())
    }

    async fn local_info(&self, cluster: &ClusterConfig) -> Result<StoreValue, BackendError> {
        self.check()?;
        Ok(serde_json::Value::Object(cluster.local.clone()).into())
    }

    async fn remote_info(&self, remote_storage: &serde_json::Value) -> Result<StoreValue, BackendError> {
        self.check()?;
        Ok(remote_storage.clone().into())
    }
}
