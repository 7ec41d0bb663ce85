//! Client construction capability.

use std::sync::Arc;

use async_trait::async_trait;
use crumpit_core::BackendKind;
use serde_json::Value;

use crate::{BackendError, LiveRunsClient, MetadataClient};

/// Builds fresh clients for one backend kind.
///
/// Each constructor corresponds to how much of the address is configured:
/// nothing, the host only, or host and port. The address fields arrive as
/// written in the configuration file; converting them is part of connecting
/// (see [`host_field`] and [`port_field`]). Construction may already open the
/// connection, so any of them can fail.
#[async_trait]
pub trait BackendConnector: Send + Sync {
    /// The client trait object this connector produces.
    type Client: ?Sized + Send + Sync;

    /// Which store this connector talks to.
    fn kind(&self) -> BackendKind;

    /// Construct a client using the driver's built-in defaults.
    ///
    /// # Errors
    /// Returns [`BackendError::Unavailable`] if the client cannot connect.
    async fn connect_default(&self) -> Result<Arc<Self::Client>, BackendError>;

    /// Construct a client for `ip` on the driver's default port.
    ///
    /// # Errors
    /// Returns [`BackendError::Unavailable`] if `ip` is not a usable host or
    /// the client cannot connect.
    async fn connect_host(&self, ip: &Value) -> Result<Arc<Self::Client>, BackendError>;

    /// Construct a client for `ip:port`.
    ///
    /// # Errors
    /// Returns [`BackendError::Unavailable`] if either field is unusable or
    /// the client cannot connect.
    async fn connect_addr(&self, ip: &Value, port: &Value) -> Result<Arc<Self::Client>, BackendError>;
}

/// Connector producing document-store clients.
pub type LiveRunsConnector = dyn BackendConnector<Client = dyn LiveRunsClient>;

/// Connector producing relational-store clients.
pub type MetadataConnector = dyn BackendConnector<Client = dyn MetadataClient>;

/// The configured host of a `kind` section, as text.
///
/// # Errors
/// Returns [`BackendError::Unavailable`] if `ip` is not a string.
pub fn host_field(kind: BackendKind, ip: &Value) -> Result<&str, BackendError> {
    ip.as_str().ok_or_else(|| BackendError::Unavailable {
        kind,
        reason: format!("{}.ip must be a string, found {ip}", kind.section()),
    })
}

/// The configured port of a `kind` section, as a TCP port number.
///
/// # Errors
/// Returns [`BackendError::Unavailable`] if `port` is not an integer in
/// `0..=65535`. Numeric strings are rejected like any other string.
pub fn port_field(kind: BackendKind, port: &Value) -> Result<u16, BackendError> {
    port.as_u64().and_then(|p| u16::try_from(p).ok()).ok_or_else(|| BackendError::Unavailable {
        kind,
        reason: format!("{}.port must be an integer in 0..=65535, found {port}", kind.section()),
    })
}
