//! Top-level error types for pipeline runs.
//!
//! Errors at this level abort the run. Failures scoped to a single package
//! format or build target are reported through the progress sink instead
//! and never surface here; see [`crate::package::error`] for those.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a pipeline run
#[derive(Error, Debug)]
pub enum Error {
    /// Manifest loading or validation errors
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// The Go toolchain could not be found on the search path
    #[error("can't build without go installed")]
    ToolchainMissing,

    /// Packaging was requested on a host that cannot produce Linux packages
    #[error("packages can only be created on a linux system, not {os}")]
    UnsupportedHost {
        /// Operating system of the current host
        os: &'static str,
    },

    /// A top-level output directory could not be created
    #[error("creating output directory {path}: {error}")]
    OutputDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying filesystem error
        error: std::io::Error,
    },

    /// A package manifest file could not be written
    ///
    /// Manifest files record what the user asked for. Failing to write
    /// one means the package would not match the configuration, so the
    /// whole run stops instead of skipping the format.
    #[error("{0}")]
    Manifest(crate::package::error::Error),

    /// IO errors outside any package format
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
