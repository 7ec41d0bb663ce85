//! Error types for the gateway crate.
//!
//! Each variant knows the envelope it becomes. The client sees a fixed
//! message; the full error chain only goes to the log.

use axum::response::{IntoResponse, Response};
use crumpit_backends::BackendError;
use crumpit_core::{CoreError, OutcomeCode};

use crate::response::text_envelope;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The run-creation body was not sent as JSON.
    #[error("unsupported media type: {content_type:?}")]
    UnsupportedMediaType { content_type: Option<String> },

    /// The run-creation body is not a JSON object.
    #[error("invalid run parameters: {0}")]
    InvalidParameter(String),

    /// The document store could not be reached or queried.
    #[error("document store request failed: {0}")]
    LiveRunsUnavailable(#[source] BackendError),

    /// Live statistics could not be gathered.
    #[error("live stats request failed: {0}")]
    LiveStats(#[source] BackendError),

    /// The relational store could not be reached or queried.
    #[error("relational store request failed: {0}")]
    MetadataUnavailable(#[source] BackendError),

    /// The requested sequencing kit is not in the schema's `sequenceKits` table.
    #[error("sequencing kit not found: {0}")]
    UnknownSequencingKit(String),

    /// The runs graph image could not be produced or read.
    #[error("runs graph unavailable: {reason}")]
    GraphUnavailable { reason: String },

    /// The cluster inspector failed.
    #[error("cluster inspection failed: {0}")]
    Inspection(#[source] BackendError),

    /// A required configuration section is missing.
    #[error(transparent)]
    Config(#[from] CoreError),

    /// The response payload could not be serialized.
    #[error("response serialization failed: {0}")]
    Serialization(#[source] CoreError),
}

impl GatewayError {
    /// Envelope code reported for this error.
    #[must_use]
    pub fn code(&self) -> OutcomeCode {
        match self {
            Self::UnsupportedMediaType { .. }
            | Self::InvalidParameter(_)
            | Self::GraphUnavailable { .. } => OutcomeCode::CLIENT_ERROR,
            _ => OutcomeCode::BACKEND_UNAVAILABLE,
        }
    }

    /// Explicit HTTP status, or `None` to let the envelope rule decide.
    #[must_use]
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::UnsupportedMediaType { .. } | Self::InvalidParameter(_) => None,
            Self::LiveRunsUnavailable(_)
            | Self::LiveStats(_)
            | Self::MetadataUnavailable(_)
            | Self::UnknownSequencingKit(_) => Some(200),
            Self::GraphUnavailable { .. }
            | Self::Inspection(_)
            | Self::Config(_)
            | Self::Serialization(_) => Some(500),
        }
    }

    /// Text placed in the envelope's `data` field.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::UnsupportedMediaType { .. } => "Unsupported Media Type".to_owned(),
            Self::InvalidParameter(_) => "Invalid parameter".to_owned(),
            Self::LiveRunsUnavailable(_) => "could not connect to mongo db".to_owned(),
            Self::LiveStats(_) => "Error Getting liveStats".to_owned(),
            Self::MetadataUnavailable(_) => "could not connect to SQL db".to_owned(),
            Self::UnknownSequencingKit(_) => "Sequencing Kit not valid".to_owned(),
            Self::GraphUnavailable { .. } => "Could not create Image".to_owned(),
            Self::Inspection(e) => e.to_string(),
            Self::Config(e) | Self::Serialization(e) => e.to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::debug!(error = %self, "request failed");
        text_envelope(self.code(), &self.client_message(), self.http_status())
    }
}
