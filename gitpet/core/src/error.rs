//! Error Types
//!
//! A single error enum covers every failure the core can report. The first
//! group (store and pet lookups) are user mistakes that end the current
//! invocation; the rest are environmental failures.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, PetError>;

/// Errors produced by the pet core
#[derive(Debug, Error)]
pub enum PetError {
    /// The pet store has not been initialized for this repository
    #[error("No pet store at {}. Adopt a pet first.", root.display())]
    StoreMissing {
        /// Expected store root
        root: PathBuf,
    },

    /// Adopting into a repository that already has a store
    #[error(
        "A pet store already exists at {}. Release the current pets before adopting again.",
        root.display()
    )]
    StoreAlreadyExists {
        /// Existing store root
        root: PathBuf,
    },

    /// The named pet has no record in the store
    #[error("No pet named '{name}' lives here")]
    PetNotFound {
        /// Requested pet name
        name: String,
    },

    /// Pet name cannot be used as a record key
    #[error("Invalid pet name '{name}': {reason}")]
    InvalidPetName {
        /// Rejected name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Filesystem failure
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path involved in the failed operation
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A pet record could not be encoded or decoded
    #[error("Corrupted pet record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The record was written by a newer gitpet
    #[error("Pet record version {found} is newer than supported version {supported}")]
    UnsupportedRecordVersion {
        /// Version found on disk
        found: u32,
        /// Highest version this build understands
        supported: u32,
    },

    /// No preset with this name exists
    #[error("Unknown personality '{0}'")]
    PresetNotFound(String),

    /// A preset file exists but is not valid TOML
    #[error("Invalid personality file {}: {source}", path.display())]
    PresetParse {
        /// Preset file path
        path: PathBuf,
        /// Parse error
        source: toml::de::Error,
    },

    /// Version-control failure (log scan or auto-commit)
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PetError {
    /// Build an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is caused by user input rather than the environment
    #[must_use]
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::StoreMissing { .. }
                | Self::StoreAlreadyExists { .. }
                | Self::PetNotFound { .. }
                | Self::InvalidPetName { .. }
                | Self::PresetNotFound(_)
        )
    }
}
