//! Error types for module resolution and loading.

use std::path::PathBuf;

/// Errors produced while resolving, loading, or registering a module.
///
/// None of these are retriable: the causes (missing files, genuine version
/// incompatibility, corrupt artifacts) do not change between two attempts
/// with identical inputs.
#[derive(Debug, thiserror::Error)]
pub enum RequireError {
    #[error("Conflict between requested {module} version {requested} and already loaded version {loaded}")]
    Conflict {
        module: String,
        requested: String,
        loaded: String,
    },

    #[error("Library {file} not found in search path {search_path}")]
    NotFound { file: String, search_path: String },

    #[error("Loading {} library failed: {reason}", path.display())]
    LoadFailed { path: PathBuf, reason: String },

    #[error("Requested {module} version {requested} not available, found only {found}")]
    VersionMismatch {
        module: String,
        requested: String,
        found: String,
    },

    #[error("Can't load database {}: {reason}", path.display())]
    DbLoadFailed { path: PathBuf, reason: String },

    #[error("Missing module name")]
    MissingModuleName,

    #[error("Circular dependency: {}", chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("Registration via {symbol} failed: {reason}")]
    Registration { symbol: String, reason: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RequireError {
    /// Whether repeating the same request could succeed. Always `false`.
    pub fn is_retriable(&self) -> bool {
        false
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RequireError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type used throughout the crate.
pub type Result<T, E = RequireError> = std::result::Result<T, E>;
