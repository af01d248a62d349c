//! Error types for the materialization engine

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a scaffolding phase.
///
/// Declining an overwrite is not an error (see [`crate::pipeline::Outcome::Aborted`]),
/// and neither is an unmapped placeholder token, which is reported as a warning.
/// Install failures are values of [`crate::runtime::InstallResult`].
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// Unexpected I/O failure while probing, clearing, reading or writing
    #[error("Failed to {action} {}: {source}", path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A dependency version lookup failed; no partial dependency map is produced
    #[error("Failed to resolve the latest version of '{package}': {reason}")]
    Resolution { package: String, reason: String },

    /// The template could not be loaded or its descriptor is invalid
    #[error("Template error: {0}")]
    Template(String),

    /// The install tool exists but could not be started
    #[error("Failed to start '{tool}': {source}")]
    Spawn {
        tool: String,
        #[source]
        source: io::Error,
    },

    /// The overwrite confirmation could not be obtained
    #[error("Prompt failed: {0}")]
    Prompt(#[source] io::Error),

    /// No project name was given and the destination has no usable basename
    #[error("Cannot derive a project name from {}", .0.display())]
    InvalidName(PathBuf),
}

impl ScaffoldError {
    pub(crate) fn fs(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Filesystem {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn resolution(package: &str, reason: impl ToString) -> Self {
        Self::Resolution {
            package: package.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = ScaffoldError> = std::result::Result<T, E>;
