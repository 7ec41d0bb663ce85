use std::path::PathBuf;

/// Errors produced by the `crumpit-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A named configuration section is not present in the config document.
    #[error("configuration section '{section}' is absent")]
    ConfigAbsent { section: &'static str },

    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration document is not valid YAML or has the wrong shape.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// A value reached the serializer with no registered or generic representation.
    #[error("value of type `{type_name}` is not JSON serializable")]
    Serialization { type_name: &'static str },

    /// A document identifier string was not 24 hexadecimal characters.
    #[error("invalid object id '{input}': expected 24 hex characters")]
    InvalidObjectId { input: String },
}
