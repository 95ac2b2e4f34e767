#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

//! Cross-compilation and packaging pipeline for Go applications.
//!
//! The crate builds a project for every platform pair declared in its
//! manifest, then wraps the Linux binaries into the package formats the
//! manifest enables. Supported formats are Debian packages, RPM packages,
//! Arch packages and AppImages.
//!
//! The pipeline runs one [`Action`]: cleaning the output tree, building
//! binaries, or packaging. Each action implies the ones before it, so
//! [`Action::Package`] cleans, builds and packages in order.
//!
//! Progress is reported through the [`progress::ProgressSink`] trait. The
//! bundled CLI renders events to the terminal; library consumers can plug
//! in their own sink.

pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod package;
pub mod pipeline;
pub mod process;
pub mod progress;

pub use config::Manifest;
pub use error::{Error, Result};
pub use layout::Layout;
pub use pipeline::{Action, Pipeline, RunReport};
pub use process::ToolRunner;
