use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the roster, the rating store and the session.
///
/// Every variant is recoverable: the CLI maps them to an exit code and the
/// TUI shows them in the status bar.
#[derive(Debug, Error)]
pub enum RaterError {
    /// Roster or store document is missing, unreadable or corrupt.
    #[error("{what} unavailable: {reason}")]
    DataUnavailable { what: String, reason: String },

    /// Input rejected before anything was persisted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store could not be written; nothing was persisted.
    #[error("failed to persist ratings to {}: {reason}", path.display())]
    Persistence { path: PathBuf, reason: String },
}

impl RaterError {
    pub fn data_unavailable(what: impl Into<String>, reason: impl ToString) -> Self {
        Self::DataUnavailable {
            what: what.into(),
            reason: reason.to_string(),
        }
    }

    pub fn persistence(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Persistence {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be an integer between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: u8,
        max: u8,
    },

    #[error("{field} must be a whole number, got '{input}'")]
    NotAnInteger { field: &'static str, input: String },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} must not contain '_' (got '{value}')")]
    ReservedSeparator { field: &'static str, value: String },

    #[error("unknown label '{0}'")]
    UnknownLabel(String),

    #[error("unknown site '{0}'")]
    UnknownSite(String),

    #[error("'{technician}' is not on the roster for site {site}")]
    UnknownTechnician { site: String, technician: String },
}

pub type Result<T, E = RaterError> = std::result::Result<T, E>;
