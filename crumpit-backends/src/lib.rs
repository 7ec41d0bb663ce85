//! Backend collaborators of the crumpit manager API.
//!
//! Declares the client contracts for the document store, the relational
//! store and the cluster inspector, and the resolver that builds a fresh
//! client per request from whatever address configuration is present.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod backend;
pub mod connector;
pub mod error;
pub mod resolver;
pub mod unlinked;

#[cfg(any(test, feature = "test-support"))]
pub mod doubles;

pub use backend::{ClusterInspector, LiveRunsClient, MetadataClient};
pub use connector::{host_field, port_field, BackendConnector, LiveRunsConnector, MetadataConnector};
pub use error::BackendError;
pub use resolver::{plan, resolve, resolve_from, Construction};
pub use unlinked::{UnlinkedConnector, UnlinkedInspector};
