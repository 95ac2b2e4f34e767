//! Filesystem layout of a pipeline run.
//!
//! Everything the pipeline produces lives under `build/` in the project
//! root. Binaries land in `build/bin`, finished packages in `build/pkg`,
//! and each format stages its intermediate files in a dot-prefixed
//! directory under `build/pkg` that is never part of the deliverables.
//!
//! Downloaded helper tools are cached outside the build tree so that
//! cleaning does not force a re-download.

use std::path::{Path, PathBuf};

const BUILD_DIR: &str = "build";
const BIN_DIR: &str = "bin";
const PKG_DIR: &str = "pkg";
const SRC_STAGING: &str = ".src";
const DEB_STAGING: &str = ".deb";
const RPM_STAGING: &str = ".rpm";
const ARCH_STAGING: &str = ".arch";
const APPIMAGE_STAGING: &str = ".appimage";
const CACHE_DIR: &str = "crosspack";

/// Directory layout rooted at a project directory
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
    cache: PathBuf,
}

impl Layout {
    /// Creates the layout for a project root
    ///
    /// The tool cache goes to the per-user cache directory when one
    /// exists, otherwise to a hidden directory under the project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let cache = dirs::cache_dir()
            .map(|dir| dir.join(CACHE_DIR))
            .unwrap_or_else(|| root.join(".crosspack"));
        Self { root, cache }
    }

    /// Creates the layout with an explicit tool cache directory
    pub fn with_cache_dir(root: impl Into<PathBuf>, cache: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: cache.into(),
        }
    }

    /// Project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Root of the generated output tree
    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR)
    }

    /// Directory for compiled binaries
    pub fn bin_dir(&self) -> PathBuf {
        self.build_dir().join(BIN_DIR)
    }

    /// Directory for finished packages
    pub fn pkg_dir(&self) -> PathBuf {
        self.build_dir().join(PKG_DIR)
    }

    /// Staging directory for the source snapshot and its archive
    pub fn src_staging(&self) -> PathBuf {
        self.pkg_dir().join(SRC_STAGING)
    }

    /// Staging directory for Debian packaging
    pub fn deb_staging(&self) -> PathBuf {
        self.pkg_dir().join(DEB_STAGING)
    }

    /// Staging directory for RPM packaging
    pub fn rpm_staging(&self) -> PathBuf {
        self.pkg_dir().join(RPM_STAGING)
    }

    /// Staging directory for Arch packaging
    pub fn arch_staging(&self) -> PathBuf {
        self.pkg_dir().join(ARCH_STAGING)
    }

    /// Staging directory for AppImage packaging
    pub fn appimage_staging(&self) -> PathBuf {
        self.pkg_dir().join(APPIMAGE_STAGING)
    }

    /// Cache directory for downloaded helper tools
    ///
    /// Lives outside the build tree and survives cleaning.
    pub fn cache_dir(&self) -> &Path {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_directories_nest_under_the_package_directory() {
        let layout = Layout::new("/project");
        assert_eq!(layout.bin_dir(), Path::new("/project/build/bin"));
        assert_eq!(layout.src_staging(), Path::new("/project/build/pkg/.src"));
        assert_eq!(layout.deb_staging(), Path::new("/project/build/pkg/.deb"));
        assert_eq!(
            layout.appimage_staging(),
            Path::new("/project/build/pkg/.appimage")
        );
    }

    #[test]
    fn cache_directory_is_outside_the_build_tree() {
        let layout = Layout::new("/project");
        assert!(!layout.cache_dir().starts_with(layout.build_dir()));
    }

    #[test]
    fn explicit_cache_directory_is_kept() {
        let layout = Layout::with_cache_dir("/project", "/tmp/tools");
        assert_eq!(layout.cache_dir(), Path::new("/tmp/tools"));
    }
}
