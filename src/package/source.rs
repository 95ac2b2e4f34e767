//! Source tree snapshot and compression.
//!
//! Source-consuming formats (RPM, Arch) package a tarball of the project
//! rather than the built binaries. The snapshot is taken once per run;
//! every consumer reuses the same archive.

use std::path::PathBuf;

use crate::bail;
use crate::config::Manifest;
use crate::layout::Layout;
use crate::package::error::{Context, Result};
use crate::package::utils::fs;
use crate::process::ToolRunner;

/// Directories never included in the snapshot
const EXCLUDES: [&str; 4] = ["build", ".git", ".vscode", ".crosspack"];

/// Copies the source tree into staging and compresses it
///
/// Returns the path of the archive, `build/pkg/.src/<name>-<version>.tar.gz`.
pub async fn compress(
    manifest: &Manifest,
    layout: &Layout,
    runner: &ToolRunner,
) -> Result<PathBuf> {
    for tool in ["rsync", "tar"] {
        if !runner.is_installed(tool).await {
            bail!("{} is not installed. Can't compress the source tree.", tool);
        }
    }

    let staging = layout.src_staging();
    let snapshot = staging.join(manifest.slug());
    fs::create_dir_all(&snapshot, true).await?;

    let mut rsync = runner.tool("rsync")?.arg("-a").arg(".").arg(&snapshot);
    for exclude in EXCLUDES {
        rsync = rsync.arg("--exclude").arg(exclude);
    }
    rsync
        .current_dir(layout.root())
        .run()
        .await
        .context("copying the source tree")?;

    runner
        .tool("tar")?
        .arg("-czf")
        .arg(manifest.source_archive_name())
        .arg(manifest.slug())
        .current_dir(&staging)
        .run()
        .await
        .context("compressing the source tree")?;

    Ok(staging.join(manifest.source_archive_name()))
}
