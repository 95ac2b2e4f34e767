//! Pipeline orchestration.
//!
//! A run executes up to three stages in fixed order: clean, build,
//! package. The requested [`Action`] decides how far the run goes and
//! every earlier stage always runs first, so `Package` implies a clean
//! and a full build.
//!
//! Stage, format and target failures are contained and reported through
//! the progress sink; the run carries on with the next unit of work.
//! Only the errors in [`crate::Error`] abort a run.

use std::sync::Arc;

use crate::config::Manifest;
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::package::{self, PackageContext, PackageFormat};
use crate::process::{ToolError, ToolRunner};
use crate::progress::{Progress, ProgressSink};

/// How far a pipeline run goes
///
/// Actions are totally ordered; a later action runs every stage of the
/// earlier ones first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Action {
    /// Remove the output tree
    Clean,
    /// Clean, then cross-compile every configured platform pair
    Binary,
    /// Clean, build, then produce every enabled package format
    #[default]
    Package,
}

impl Action {
    /// Number of stages this action runs
    pub fn stages(self) -> usize {
        match self {
            Action::Clean => 1,
            Action::Binary => 2,
            Action::Package => 3,
        }
    }
}

/// Outcome of a finished pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Number of contained failures reported during the run
    pub failures: usize,
}

/// Orchestrates the clean, build and package stages
pub struct Pipeline {
    manifest: Manifest,
    layout: Layout,
    runner: ToolRunner,
    sink: Arc<dyn ProgressSink>,
}

impl Pipeline {
    /// Creates a pipeline for one project
    pub fn new(
        manifest: Manifest,
        layout: Layout,
        runner: ToolRunner,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            manifest,
            layout,
            runner,
            sink,
        }
    }

    /// Runs the pipeline up to the requested action
    ///
    /// Returns how many contained failures were reported. Fatal
    /// conditions return an error instead.
    pub async fn run(&self, action: Action) -> Result<RunReport> {
        let go = self.runner.tool("go").map_err(|_| Error::ToolchainMissing)?;
        if go.arg("version").run().await.is_err() {
            return Err(Error::ToolchainMissing);
        }

        let enabled: Vec<PackageFormat> = PackageFormat::ALL
            .iter()
            .copied()
            .filter(|format| format.enabled(&self.manifest))
            .collect();
        let progress = Progress::new(self.sink.clone(), action.stages(), enabled.len());

        self.clean(&progress).await;
        if action >= Action::Binary {
            self.build(&progress).await?;
        }
        if action >= Action::Package {
            self.package(&progress, &enabled).await?;
        }

        Ok(RunReport {
            failures: progress.failures(),
        })
    }

    /// Removes everything a previous run produced
    async fn clean(&self, progress: &Progress) {
        progress.stage("Cleaning", 1);
        for dir in [
            self.layout.pkg_dir(),
            self.layout.bin_dir(),
            self.layout.build_dir(),
        ] {
            if let Err(err) = package::utils::fs::remove_dir_all(&dir).await {
                progress.stage_failure(err.to_string(), 1);
            }
        }
    }

    /// Cross-compiles every configured platform pair
    async fn build(&self, progress: &Progress) -> Result<()> {
        progress.stage("Building binaries", 2);

        let bin_dir = self.layout.bin_dir();
        tokio::fs::create_dir_all(&bin_dir)
            .await
            .map_err(|error| Error::OutputDir {
                path: bin_dir,
                error,
            })?;

        if let Err(err) = self.fetch_dependencies().await {
            progress.stage_failure(format!("Fetching dependencies failed: {err}"), 2);
        }

        let pairs: Vec<(&str, &str)> = self.manifest.platforms().collect();
        let total = pairs.len();
        for (i, (platform, target)) in pairs.iter().copied().enumerate() {
            progress.step(format!("Building {platform}/{target}"), i + 1, total, 1);
            if let Err(err) = self.build_pair(platform, target).await {
                progress.failure(
                    format!("Can't build for {platform}/{target}: {err}"),
                    i + 1,
                    total,
                    1,
                );
            }
        }
        Ok(())
    }

    /// Runs `go get` once before the build loop
    async fn fetch_dependencies(&self) -> std::result::Result<(), ToolError> {
        self.runner
            .tool("go")?
            .arg("get")
            .current_dir(self.layout.root())
            .run()
            .await?;
        Ok(())
    }

    /// Compiles one platform pair into the binary directory
    async fn build_pair(
        &self,
        platform: &str,
        target: &str,
    ) -> std::result::Result<(), ToolError> {
        let output = self
            .layout
            .bin_dir()
            .join(self.manifest.binary_name(platform, target));
        let mut build = self
            .runner
            .tool("go")?
            .arg("build")
            .arg("-o")
            .arg(&output);
        for flag in self.manifest.build_flags() {
            build = build.arg(flag);
        }
        build
            .arg(&self.manifest.build.target)
            .env("GOOS", platform)
            .env("GOARCH", target)
            .current_dir(self.layout.root())
            .run()
            .await?;
        Ok(())
    }

    /// Produces every enabled package format
    async fn package(&self, progress: &Progress, enabled: &[PackageFormat]) -> Result<()> {
        progress.stage("Packaging", 3);

        if std::env::consts::OS != "linux" {
            return Err(Error::UnsupportedHost {
                os: std::env::consts::OS,
            });
        }

        let pkg_dir = self.layout.pkg_dir();
        tokio::fs::create_dir_all(&pkg_dir)
            .await
            .map_err(|error| Error::OutputDir {
                path: pkg_dir,
                error,
            })?;

        let mut source_archive = None;
        if enabled.iter().any(|format| format.consumes_source()) {
            match package::source::compress(&self.manifest, &self.layout, &self.runner).await
            {
                Ok(archive) => source_archive = Some(archive),
                Err(err) => {
                    progress.stage_failure(format!("Compressing source failed: {err}"), 3);
                }
            }
        }

        for (i, format) in enabled.iter().enumerate() {
            progress.format(format!("Packaging {format}"), i + 1);
            let ctx = PackageContext {
                manifest: &self.manifest,
                layout: &self.layout,
                runner: &self.runner,
                progress,
                step: i + 1,
                source_archive: source_archive.as_deref(),
            };
            package::run_format(*format, &ctx).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_are_totally_ordered() {
        assert!(Action::Clean < Action::Binary);
        assert!(Action::Binary < Action::Package);
    }

    #[test]
    fn unspecified_action_packages() {
        assert_eq!(Action::default(), Action::Package);
    }

    #[test]
    fn stage_counts_follow_the_action() {
        assert_eq!(Action::Clean.stages(), 1);
        assert_eq!(Action::Binary.stages(), 2);
        assert_eq!(Action::Package.stages(), 3);
    }
}
