//! Configuration document and the process-wide snapshot handle.
//!
//! The document is YAML. Every top-level section is optional: handlers and
//! the backend resolver decide what an absent section means.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Port the HTTP listener binds when the config does not name one.
pub const DEFAULT_LISTEN_PORT: u16 = 5607;

/// The two kinds of backend store the API talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Document store holding live sequencing-run state.
    DocumentStore,
    /// Relational store holding run metadata.
    RelationalStore,
}

impl BackendKind {
    /// Name of the configuration section describing this backend.
    #[must_use]
    pub const fn section(self) -> &'static str {
        match self {
            Self::DocumentStore => "mongoDB",
            Self::RelationalStore => "sqlDB",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DocumentStore => f.write_str("document store"),
            Self::RelationalStore => f.write_str("relational store"),
        }
    }
}

/// Address of one backend store.
///
/// Both fields are kept exactly as written in the file. Their type and value
/// are only checked by the connector when it builds a client, so a bad port
/// in one section leaves every other section usable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub ip: serde_json::Value,
    #[serde(default)]
    pub port: Option<serde_json::Value>,
}

/// The `clusterInfo` section, handed to the cluster inspector as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    #[serde(rename = "remoteStorage", default, skip_serializing_if = "Option::is_none")]
    pub remote_storage: Option<serde_json::Value>,

    /// Every other key of the section, in document order.
    #[serde(flatten)]
    pub local: serde_json::Map<String, serde_json::Value>,
}

impl ClusterConfig {
    /// The `remoteStorage` subtree.
    ///
    /// # Errors
    /// Returns [`CoreError::ConfigAbsent`] if the key is missing.
    pub fn remote_storage(&self) -> Result<&serde_json::Value, CoreError> {
        self.remote_storage
            .as_ref()
            .ok_or(CoreError::ConfigAbsent { section: "clusterInfo.remoteStorage" })
    }
}

/// The `flask` section; only the port is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerConfig {
    #[serde(default)]
    pub port: Option<serde_json::Value>,
}

/// The whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "mongoDB")]
    pub mongo_db: Option<BackendConfig>,
    #[serde(rename = "sqlDB")]
    pub sql_db: Option<BackendConfig>,
    #[serde(rename = "logDir")]
    pub log_dir: Option<PathBuf>,
    #[serde(rename = "clusterInfo")]
    pub cluster_info: Option<ClusterConfig>,
    #[serde(rename = "flask")]
    pub listener: Option<ListenerConfig>,
}

impl Config {
    /// Parse a YAML document. An empty document yields the default config.
    ///
    /// # Errors
    /// Returns [`CoreError::ConfigParse`] if the text is not a valid config document.
    pub fn from_yaml_str(text: &str) -> Result<Self, CoreError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read and parse the YAML file at `path`.
    ///
    /// # Errors
    /// Returns [`CoreError::ConfigRead`] if the file cannot be read, or
    /// [`CoreError::ConfigParse`] if it is malformed.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| CoreError::ConfigRead { path: path.to_owned(), source })?;
        Self::from_yaml_str(&text)
    }

    /// The section describing `kind`, if present.
    #[must_use]
    pub fn backend(&self, kind: BackendKind) -> Option<&BackendConfig> {
        match kind {
            BackendKind::DocumentStore => self.mongo_db.as_ref(),
            BackendKind::RelationalStore => self.sql_db.as_ref(),
        }
    }

    /// The `logDir` value.
    ///
    /// # Errors
    /// Returns [`CoreError::ConfigAbsent`] if the section is missing.
    pub fn log_dir(&self) -> Result<&Path, CoreError> {
        self.log_dir.as_deref().ok_or(CoreError::ConfigAbsent { section: "logDir" })
    }

    /// The `clusterInfo` section.
    ///
    /// # Errors
    /// Returns [`CoreError::ConfigAbsent`] if the section is missing.
    pub fn cluster_info(&self) -> Result<&ClusterConfig, CoreError> {
        self.cluster_info.as_ref().ok_or(CoreError::ConfigAbsent { section: "clusterInfo" })
    }

    /// Port for the HTTP listener: `flask.port`, else [`DEFAULT_LISTEN_PORT`].
    ///
    /// A `flask.port` that is not an integer in `0..=65535` is logged and
    /// replaced by the default.
    #[must_use]
    pub fn listen_port(&self) -> u16 {
        let Some(raw) = self.listener.as_ref().and_then(|l| l.port.as_ref()) else {
            return DEFAULT_LISTEN_PORT;
        };
        match raw.as_u64().and_then(|p| u16::try_from(p).ok()) {
            Some(port) => port,
            None => {
                tracing::warn!(port = %raw, default = DEFAULT_LISTEN_PORT, "invalid flask.port; using default");
                DEFAULT_LISTEN_PORT
            }
        }
    }
}

/// Process-wide configuration, shared read-only between requests.
///
/// Each request takes a [`snapshot`](Self::snapshot) and keeps using it even if
/// a [`reload`](Self::reload) swaps in a newer document meanwhile.
#[derive(Debug)]
pub struct ConfigHandle {
    path: Option<PathBuf>,
    current: RwLock<Arc<Config>>,
}

impl ConfigHandle {
    /// A handle over a fixed document with no backing file.
    #[must_use]
    pub fn fixed(config: Config) -> Self {
        Self { path: None, current: RwLock::new(Arc::new(config)) }
    }

    /// Load `path` and keep it as the reload source.
    ///
    /// # Errors
    /// Propagates errors from [`Config::load`].
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let config = Config::load(&path)?;
        Ok(Self { path: Some(path), current: RwLock::new(Arc::new(config)) })
    }

    /// The file this handle reloads from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The current configuration document.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Config> {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let current = self.current.read().expect("config read lock poisoned");
        Arc::clone(&current)
    }

    /// Swap in a new document.
    ///
    /// # Panics
    /// Panics if the internal `RwLock` is poisoned.
    pub fn replace(&self, config: Config) {
        #[expect(clippy::expect_used, reason = "lock poisoning is unrecoverable")]
        let mut current = self.current.write().expect("config write lock poisoned");
        *current = Arc::new(config);
    }

    /// Re-read the backing file and swap it in. On error the previous
    /// document stays in place. A fixed handle has nothing to reload.
    ///
    /// # Errors
    /// Propagates errors from [`Config::load`].
    pub fn reload(&self) -> Result<(), CoreError> {
        let Some(path) = &self.path else {
            tracing::debug!("config handle has no backing file; reload skipped");
            return Ok(());
        };
        let config = Config::load(path)?;
        self.replace(config);
        tracing::info!(path = %path.display(), "configuration reloaded");
        Ok(())
    }
}
