//! Core error types for tenk-core.
//!
//! Every failure in the core is local and recoverable. Malformed session or
//! milestone records are not errors at all: they are dropped at the boundary
//! and only logged. A projection over zero days or zero hours is represented
//! as `None`, not as an error.

use std::path::PathBuf;
use thiserror::Error;

use crate::scheduler::SelectionMode;

/// Core error type for tenk-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Session import failures (network, auth, missing calendar)
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// Scheduler had nothing eligible to pick
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dotted key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home / data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Failures of the external session import.
///
/// A failed import never touches the previously imported sessions.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Transport failure talking to the calendar service
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The calendar service answered with an error payload
    #[error("Calendar API error: {0}")]
    Api(String),

    /// No calendar matched the configured name
    #[error("Calendar '{name}' not found. Found: {found}")]
    CalendarNotFound { name: String, found: String },

    /// No access credential is available
    #[error("Not authenticated with {service}")]
    NotAuthenticated { service: String },

    /// A newer import started after this one; its results were discarded
    #[error("Import attempt {attempt} superseded by attempt {latest}")]
    Stale { attempt: u64, latest: u64 },

    /// Invalid endpoint URL
    #[error("Invalid calendar endpoint: {0}")]
    Url(#[from] url::ParseError),

    /// OS keyring failure while reading or writing the access token
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// A local export file could not be read
    #[error("Failed to read sessions file: {0}")]
    Io(#[from] std::io::Error),

    /// Response or export file did not have the expected shape
    #[error("Malformed session data: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Scheduler failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// No repertoire item is eligible in the requested mode
    #[error("Nothing to practice: no eligible pieces for {mode}")]
    EmptyPool { mode: SelectionMode },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Referenced id does not exist
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    /// A required field was left empty
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    /// Legacy milestones are read-only facts
    #[error("Legacy milestone '{0}' cannot be deleted")]
    LegacyReadOnly(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
