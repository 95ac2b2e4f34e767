//! Error types for package production.
//!
//! Errors here are scoped: the pipeline reports them for the format or
//! target that failed and moves on to the next one. The single exception
//! is [`Error::Manifest`], which escalates and aborts the whole run,
//! since a package built from a partially written manifest would not
//! match the configuration.

use std::{fmt::Display, io, path::PathBuf};

use thiserror::Error as ThisError;

use crate::process::ToolError;

/// Errors raised while producing a package
#[derive(Debug, ThisError)]
#[non_exhaustive]
pub enum Error {
    /// A wrapped error with a message in front, see [`Context`]
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// An IO error tagged with the operation and the path it hit
    #[error("{context} {path}: {error}")]
    Fs {
        /// Operation being performed, e.g. "copying binary"
        context: &'static str,
        /// Path the operation touched
        path: PathBuf,
        /// The underlying IO error
        error: io::Error,
    },

    /// A package manifest file could not be written
    ///
    /// Covers control files, spec files, PKGBUILDs and desktop entries.
    /// Never contained; see [`Error::is_manifest_failure`].
    #[error("writing {kind} {path}: {error}")]
    Manifest {
        /// Kind of manifest, e.g. "control file"
        kind: &'static str,
        /// Path that was being written
        path: PathBuf,
        /// The underlying IO error
        error: io::Error,
    },

    /// An IO error without further context
    #[error("{0}")]
    Io(#[from] io::Error),

    /// External tool resolution or execution error
    #[error("{0}")]
    Tool(#[from] ToolError),

    /// A plain message, usually built through [`bail!`](crate::bail)
    #[error("{0}")]
    Generic(String),
}

impl Error {
    /// Whether this error, or any error it wraps, is a manifest write failure
    ///
    /// Manifest write failures abort the run instead of being contained
    /// to their format.
    pub fn is_manifest_failure(&self) -> bool {
        match self {
            Error::Manifest { .. } => true,
            Error::Context(_, inner) => inner.is_manifest_failure(),
            _ => false,
        }
    }
}

/// Result alias defaulting to the package [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Puts a message in front of an error, keeping the original around
/// as the source.
pub trait Context<T> {
    /// Wrap the error with a fixed message
    fn context<M: Display>(self, message: M) -> Result<T>;

    /// Wrap the error with a message that is only built on failure
    fn with_context<M, F>(self, message: F) -> Result<T>
    where
        M: Display,
        F: FnOnce() -> M;
}

impl<T> Context<T> for Result<T> {
    fn context<M: Display>(self, message: M) -> Result<T> {
        self.map_err(|source| Error::Context(message.to_string(), Box::new(source)))
    }

    fn with_context<M, F>(self, message: F) -> Result<T>
    where
        M: Display,
        F: FnOnce() -> M,
    {
        self.map_err(|source| Error::Context(message().to_string(), Box::new(source)))
    }
}

impl<T> Context<T> for std::result::Result<T, ToolError> {
    fn context<M: Display>(self, message: M) -> Result<T> {
        self.map_err(|source| Error::Context(message.to_string(), Box::new(source.into())))
    }

    fn with_context<M, F>(self, message: F) -> Result<T>
    where
        M: Display,
        F: FnOnce() -> M,
    {
        self.map_err(|source| Error::Context(message().to_string(), Box::new(source.into())))
    }
}

/// Turns raw IO errors into [`Error::Fs`] without losing the path.
pub trait ErrorExt<T> {
    /// Tag the error with what was being done and where
    ///
    /// `doing` should be a present-tense verb phrase, e.g.
    /// "reading file" or "creating directory".
    fn fs_context(self, doing: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for io::Result<T> {
    fn fs_context(self, doing: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs { context: doing, path: path.into(), error })
    }
}

/// Returns early with an [`Error::Generic`] built from the arguments.
#[macro_export]
macro_rules! bail {
    ($text:literal $(,)?) => {
        return Err($crate::package::error::Error::Generic($text.into()))
    };
    ($fmt:expr, $($args:tt)*) => {
        return Err($crate::package::error::Error::Generic(format!($fmt, $($args)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_failures_are_found_through_context() {
        let inner = Error::Manifest {
            kind: "control file",
            path: PathBuf::from("/tmp/control"),
            error: io::Error::other("disk full"),
        };
        let wrapped = Result::<()>::Err(inner)
            .context("packaging for amd64")
            .unwrap_err();

        assert!(wrapped.is_manifest_failure());
        assert!(
            !Error::Generic("anything else".into()).is_manifest_failure()
        );
    }

    #[test]
    fn fs_errors_carry_the_path() {
        let err: Error = std::fs::read("/definitely/not/here")
            .map(|_| ())
            .fs_context("reading file", "/definitely/not/here")
            .unwrap_err();
        assert!(err.to_string().starts_with("reading file /definitely/not/here"));
    }
}
