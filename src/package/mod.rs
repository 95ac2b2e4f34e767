//! Package production for the supported formats.
//!
//! Each format module implements one procedure that turns built binaries
//! (or the compressed source snapshot) into distributable artifacts in
//! the package output directory. Procedures share a [`PackageContext`]
//! and report their position through it.
//!
//! Failures inside a format are scoped: [`run_format`] reports them and
//! returns `Ok` so the pipeline can try the next format. Only manifest
//! write failures escalate, since those would produce packages that do
//! not match the configuration.

pub mod appimage;
pub mod arch;
pub mod deb;
pub mod error;
pub mod pkg;
pub mod rpm;
pub mod source;
pub mod utils;

use std::fmt;
use std::path::Path;

use crate::config::Manifest;
use crate::layout::Layout;
use crate::process::ToolRunner;
use crate::progress::Progress;

/// Package formats in production order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageFormat {
    /// Debian package built with dpkg-deb
    Deb,
    /// RPM package built with rpmbuild
    Rpm,
    /// Arch package built with makepkg
    Pkg,
    /// AppImage built with appimagetool
    AppImage,
}

impl PackageFormat {
    /// All formats, in the order they are produced
    pub const ALL: [PackageFormat; 4] = [
        PackageFormat::Deb,
        PackageFormat::Rpm,
        PackageFormat::Pkg,
        PackageFormat::AppImage,
    ];

    /// Short name used in progress labels and logs
    pub fn short_name(self) -> &'static str {
        match self {
            PackageFormat::Deb => "deb",
            PackageFormat::Rpm => "rpm",
            PackageFormat::Pkg => "pkg",
            PackageFormat::AppImage => "appimage",
        }
    }

    /// Whether the manifest enables this format
    pub fn enabled(self, manifest: &Manifest) -> bool {
        match self {
            PackageFormat::Deb => manifest.deb.enabled,
            PackageFormat::Rpm => manifest.rpm.enabled,
            PackageFormat::Pkg => manifest.pkg.enabled,
            PackageFormat::AppImage => manifest.appimage.enabled,
        }
    }

    /// Whether this format packages the compressed source snapshot
    pub fn consumes_source(self) -> bool {
        matches!(self, PackageFormat::Rpm | PackageFormat::Pkg)
    }
}

impl fmt::Display for PackageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Everything a format procedure needs to run
pub struct PackageContext<'a> {
    /// The loaded project manifest
    pub manifest: &'a Manifest,
    /// Filesystem layout of the run
    pub layout: &'a Layout,
    /// Resolver for external tools
    pub runner: &'a ToolRunner,
    /// Progress context with the run's fixed totals
    pub progress: &'a Progress,
    /// Position of this format among the enabled formats, one-based
    pub step: usize,
    /// The compressed source archive, when one was produced
    pub source_archive: Option<&'a Path>,
}

impl PackageContext<'_> {
    /// Reports a per-target failure and carries on, unless it must escalate
    ///
    /// Target failures (one architecture out of several) are reported at
    /// depth two and swallowed so sibling targets still run. Manifest
    /// write failures pass through untouched.
    pub(crate) fn contain_target(
        &self,
        result: error::Result<()>,
        step: usize,
        total: usize,
    ) -> error::Result<()> {
        match result {
            Err(err) if !err.is_manifest_failure() => {
                self.progress.failure(err.to_string(), step, total, 2);
                Ok(())
            }
            other => other,
        }
    }
}

/// Runs one format procedure, containing its failures
///
/// Scoped failures are reported against the format's step and turn into
/// `Ok` so the caller proceeds to the next format. A manifest write
/// failure aborts the run.
pub async fn run_format(
    format: PackageFormat,
    ctx: &PackageContext<'_>,
) -> crate::Result<()> {
    let result = match format {
        PackageFormat::Deb => deb::package(ctx).await,
        PackageFormat::Rpm => rpm::package(ctx).await,
        PackageFormat::Pkg => pkg::package(ctx).await,
        PackageFormat::AppImage => appimage::package(ctx).await,
    };
    match result {
        Ok(()) => Ok(()),
        Err(err) if err.is_manifest_failure() => Err(crate::Error::Manifest(err)),
        Err(err) => {
            ctx.progress.format_failure(err.to_string(), ctx.step);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Template;

    #[test]
    fn formats_keep_their_production_order() {
        let names: Vec<&str> = PackageFormat::ALL
            .iter()
            .map(|f| f.short_name())
            .collect();
        assert_eq!(names, ["deb", "rpm", "pkg", "appimage"]);
    }

    #[test]
    fn only_source_formats_consume_the_snapshot() {
        assert!(!PackageFormat::Deb.consumes_source());
        assert!(PackageFormat::Rpm.consumes_source());
        assert!(PackageFormat::Pkg.consumes_source());
        assert!(!PackageFormat::AppImage.consumes_source());
    }

    #[test]
    fn enablement_follows_the_manifest_sections() {
        let mut manifest: Manifest =
            toml::from_str(Template::Empty.contents()).unwrap();
        manifest.deb.enabled = true;
        manifest.appimage.enabled = true;

        let enabled: Vec<PackageFormat> = PackageFormat::ALL
            .iter()
            .copied()
            .filter(|f| f.enabled(&manifest))
            .collect();
        assert_eq!(enabled, [PackageFormat::Deb, PackageFormat::AppImage]);
    }
}
