//! Stand-ins used when no store driver is compiled into the binary.
//!
//! Every call fails, so each endpoint answers with its backend-unavailable
//! envelope instead of the server refusing to start.

use std::{marker::PhantomData, path::Path, sync::Arc};

use async_trait::async_trait;
use crumpit_core::{BackendKind, ClusterConfig, StoreValue};
use serde_json::Value;

use crate::{BackendConnector, BackendError, ClusterInspector, Construction};

/// Connector whose constructors always report the store as unavailable.
pub struct UnlinkedConnector<C: ?Sized> {
    kind: BackendKind,
    _client: PhantomData<fn() -> Arc<C>>,
}

impl<C: ?Sized> UnlinkedConnector<C> {
    /// A connector for `kind` with no driver behind it.
    #[must_use]
    pub fn new(kind: BackendKind) -> Self {
        Self { kind, _client: PhantomData }
    }

    fn refuse(&self, target: &Construction) -> BackendError {
        tracing::warn!(backend = %self.kind, %target, "no driver linked for backend");
        BackendError::Unavailable {
            kind: self.kind,
            reason: format!("no {} driver is linked into this build", self.kind.section()),
        }
    }
}

#[async_trait]
impl<C: ?Sized + Send + Sync> BackendConnector for UnlinkedConnector<C> {
    type Client = C;

    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn connect_default(&self) -> Result<Arc<C>, BackendError> {
        Err(self.refuse(&Construction::Defaults))
    }

    async fn connect_host(&self, ip: &Value) -> Result<Arc<C>, BackendError> {
        Err(self.refuse(&Construction::Host(ip.clone())))
    }

    async fn connect_addr(&self, ip: &Value, port: &Value) -> Result<Arc<C>, BackendError> {
        Err(self.refuse(&Construction::Address(ip.clone(), port.clone())))
    }
}

/// Cluster inspector that always reports that no inspector is available.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnlinkedInspector;

impl UnlinkedInspector {
    fn refuse() -> BackendError {
        BackendError::Query("no cluster inspector is linked into this build".to_owned())
    }
}

#[async_trait]
impl ClusterInspector for UnlinkedInspector {
    async fn backup_info(
        &self,
        _log_dir: &Path,
        _runs: &StoreValue,
        _remote_storage: &Value,
    ) -> Result<StoreValue, BackendError> {
        Err(Self::refuse())
    }

    async fn local_info(&self, _cluster: &ClusterConfig) -> Result<StoreValue, BackendError> {
        Err(Self::refuse())
    }

    async fn remote_info(&self, _remote_storage: &Value) -> Result<StoreValue, BackendError> {
        Err(Self::refuse())
    }
}
