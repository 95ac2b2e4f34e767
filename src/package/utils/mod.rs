//! Shared helpers for the package formats.

pub mod fs;
