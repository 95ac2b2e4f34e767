//! Project manifest loading and validation.
//!
//! The manifest is a TOML file, `make.toml` by default, describing the
//! application, the platforms to build for and the package formats to
//! produce. Every key is required; unknown keys are rejected so typos
//! surface as errors instead of silently disabling a format.

mod template;

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub use template::Template;

/// Errors from loading or generating a manifest
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The manifest file could not be read
    #[error("reading {path}: {source}")]
    Read {
        /// Path that was read
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// The manifest file is not valid TOML or misses required keys
    #[error("parsing {path}: {source}")]
    Parse {
        /// Path that was parsed
        path: PathBuf,
        /// Underlying parse error
        source: Box<toml::de::Error>,
    },

    /// The manifest parsed but its contents are unusable
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// The configured icon file does not exist
    #[error("icon {0} does not exist")]
    MissingIcon(PathBuf),

    /// A template would overwrite an existing file
    #[error("{0} already exists, refusing to overwrite it")]
    AlreadyExists(PathBuf),

    /// A template file could not be written
    #[error("writing {path}: {source}")]
    Write {
        /// Path that was written
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Application identity and description
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Application {
    /// Binary and package name
    pub name: String,
    /// Version string used in artifact names
    pub version: String,
    /// Project homepage
    pub url: String,
    /// License identifier
    pub license: String,
    /// One-line description
    pub description: String,
    /// Longer description for package manifests
    pub long_description: String,
    /// Whether the application opens its own windows
    pub gui: bool,
}

/// Desktop integration fields used by the AppImage format
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesktopEntry {
    /// Display name shown by desktop environments
    pub name: String,
    /// Path to the icon file, relative to the manifest
    pub icon: String,
    /// Desktop entry categories
    pub categories: Vec<String>,
}

/// Compilation settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSettings {
    /// Build target passed to the compiler, usually `.`
    pub target: String,
    /// Extra compiler flags, split on whitespace
    pub flags: String,
    /// Platform pairs to build, each `os/arch`
    pub platforms: Vec<String>,
}

/// Package maintainer contact
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Maintainer {
    /// Maintainer name
    pub name: String,
    /// Maintainer email address
    pub email: String,
}

/// Debian package settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DebSettings {
    /// Whether to produce Debian packages
    #[serde(rename = "package")]
    pub enabled: bool,
    /// Architectures to package
    pub architectures: Vec<String>,
}

/// RPM package settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpmSettings {
    /// Whether to produce RPM packages
    #[serde(rename = "package")]
    pub enabled: bool,
    /// Whether to also produce a source RPM
    pub build_src: bool,
    /// Architectures to package
    pub architectures: Vec<String>,
}

/// Arch package settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PkgSettings {
    /// Whether to produce Arch packages
    #[serde(rename = "package")]
    pub enabled: bool,
    /// Architectures to package
    pub architectures: Vec<String>,
}

/// AppImage settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppImageSettings {
    /// Whether to produce AppImages
    #[serde(rename = "package")]
    pub enabled: bool,
    /// Architectures to package
    pub architectures: Vec<String>,
    /// Path to an AppRun replacing the downloaded default, or empty
    pub custom_apprun: String,
}

/// The parsed project manifest
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Application identity
    pub application: Application,
    /// Desktop integration fields
    pub desktop_entry: DesktopEntry,
    /// Compilation settings
    pub build: BuildSettings,
    /// Maintainer contact
    pub maintainer: Maintainer,
    /// Debian package settings
    pub deb: DebSettings,
    /// RPM package settings
    pub rpm: RpmSettings,
    /// Arch package settings
    pub pkg: PkgSettings,
    /// AppImage settings
    pub appimage: AppImageSettings,
}

impl Manifest {
    /// Loads and validates the manifest at `path`
    ///
    /// Relative paths inside the manifest, the icon in particular, are
    /// resolved against the manifest's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest: Manifest =
            toml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;
        let base = path.parent().unwrap_or(Path::new("."));
        manifest.validate(base)?;
        Ok(manifest)
    }

    /// Validates manifest contents against the directory it lives in
    pub fn validate(&self, base: &Path) -> Result<(), ConfigError> {
        if self.application.name.is_empty() {
            return Err(ConfigError::Invalid(
                "application name must not be empty".into(),
            ));
        }
        if self.application.version.is_empty() {
            return Err(ConfigError::Invalid(
                "application version must not be empty".into(),
            ));
        }
        for platform in &self.build.platforms {
            match platform.split_once('/') {
                Some((os, arch)) if !os.is_empty() && !arch.is_empty() => {}
                _ => {
                    return Err(ConfigError::Invalid(format!(
                        "platform {platform:?} is not of the form os/arch"
                    )));
                }
            }
        }
        if !self.desktop_entry.icon.is_empty() {
            let icon = base.join(&self.desktop_entry.icon);
            if !icon.is_file() {
                return Err(ConfigError::MissingIcon(icon));
            }
        }
        Ok(())
    }

    /// Name of the compiled binary for a platform pair
    ///
    /// Windows binaries get an `.exe` suffix.
    pub fn binary_name(&self, platform: &str, arch: &str) -> String {
        let mut name = format!(
            "{}_{}_{}_{}",
            self.application.name, self.application.version, platform, arch
        );
        if platform == "windows" {
            name.push_str(".exe");
        }
        name
    }

    /// `name-version`, the stem shared by source snapshots and packages
    pub fn slug(&self) -> String {
        format!("{}-{}", self.application.name, self.application.version)
    }

    /// File name of the compressed source archive
    pub fn source_archive_name(&self) -> String {
        format!("{}.tar.gz", self.slug())
    }

    /// Platform pairs from the build settings, split into `(os, arch)`
    pub fn platforms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.build
            .platforms
            .iter()
            .filter_map(|pair| pair.split_once('/'))
    }

    /// Whether a Linux binary for `arch` is among the build platforms
    pub fn has_linux_build(&self, arch: &str) -> bool {
        self.platforms()
            .any(|(os, a)| os == "linux" && a == arch)
    }

    /// Compiler flags split on whitespace
    pub fn build_flags(&self) -> impl Iterator<Item = &str> {
        self.build.flags.split_whitespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        toml::from_str(Template::All.contents()).unwrap()
    }

    #[test]
    fn every_template_parses() {
        for template in [Template::Default, Template::All, Template::Empty] {
            let parsed: Result<Manifest, _> = toml::from_str(template.contents());
            assert!(parsed.is_ok(), "{template:?} did not parse: {parsed:?}");
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let mut text = Template::All.contents().to_string();
        text.push_str("\n[application.extra]\nkey = 1\n");
        assert!(toml::from_str::<Manifest>(&text).is_err());

        let text = Template::All.contents().replace("gui = ", "gui2 = ");
        assert!(toml::from_str::<Manifest>(&text).is_err());
    }

    #[test]
    fn missing_keys_are_rejected() {
        let text = Template::All.contents().replace("version = \"1.0.0\"\n", "");
        assert!(toml::from_str::<Manifest>(&text).is_err());
    }

    #[test]
    fn binary_names_follow_the_platform_pair() {
        let manifest = sample();
        assert_eq!(
            manifest.binary_name("linux", "amd64"),
            "app_1.0.0_linux_amd64"
        );
        assert_eq!(
            manifest.binary_name("windows", "amd64"),
            "app_1.0.0_windows_amd64.exe"
        );
    }

    #[test]
    fn slug_and_archive_name_share_the_stem() {
        let manifest = sample();
        assert_eq!(manifest.slug(), "app-1.0.0");
        assert_eq!(manifest.source_archive_name(), "app-1.0.0.tar.gz");
    }

    #[test]
    fn linux_builds_are_found_by_architecture() {
        let manifest = sample();
        assert!(manifest.has_linux_build("amd64"));
        assert!(!manifest.has_linux_build("mips"));
    }

    #[test]
    fn build_flags_split_on_whitespace() {
        let mut manifest = sample();
        manifest.build.flags = "-trimpath  -v".into();
        let flags: Vec<&str> = manifest.build_flags().collect();
        assert_eq!(flags, ["-trimpath", "-v"]);
    }

    #[test]
    fn empty_name_fails_validation() {
        let mut manifest = sample();
        manifest.application.name.clear();
        manifest.desktop_entry.icon.clear();
        assert!(matches!(
            manifest.validate(Path::new(".")),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn malformed_platform_fails_validation() {
        let mut manifest = sample();
        manifest.desktop_entry.icon.clear();
        manifest.build.platforms.push("linux-amd64".into());
        assert!(matches!(
            manifest.validate(Path::new(".")),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn icon_must_exist_when_configured() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = sample();
        assert!(matches!(
            manifest.validate(dir.path()),
            Err(ConfigError::MissingIcon(_))
        ));

        std::fs::write(dir.path().join("icon.png"), b"png").unwrap();
        assert!(manifest.validate(dir.path()).is_ok());
    }
}
