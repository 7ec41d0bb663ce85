//! Core types for the crumpit manager API.
//!
//! Defines the payload model returned by the backend stores, the JSON
//! serializer for backend-native values, the `{status, data}` response
//! envelope, and the configuration document.

#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod id;
pub mod serialize;
pub mod value;

pub use config::{
    BackendConfig, BackendKind, ClusterConfig, Config, ConfigHandle, ListenerConfig,
    DEFAULT_LISTEN_PORT,
};
pub use envelope::{build_envelope, Envelope, Outcome, OutcomeCode};
pub use error::CoreError;
pub use id::ObjectId;
pub use serialize::{Encoders, Serializer};
pub use value::{Document, NativeScalar, StoreValue};
