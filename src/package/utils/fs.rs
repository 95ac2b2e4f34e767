//! Filesystem helpers for package staging.

use std::io::{self, BufWriter, Write};
use std::path::Path;

use tokio::fs;

use crate::package::error::{Error, ErrorExt, Result};

/// Creates a directory path, erasing it first if specified
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes a directory and its contents if it exists
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .await
            .fs_context("removing directory", path)
    } else {
        Ok(())
    }
}

/// Copies a regular file, creating parent directories of the destination
///
/// Fails if the source path is a directory or doesn't exist.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        return Err(Error::Generic(format!("{from:?} does not exist")));
    }
    if !from.is_file() {
        return Err(Error::Generic(format!("{from:?} is not a file")));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file to", to)?;
    Ok(())
}

/// Renames a file, replacing any existing destination
pub async fn rename(from: &Path, to: &Path) -> Result<()> {
    fs::rename(from, to)
        .await
        .fs_context("moving file to", to)
}

/// Writes a package manifest file through a buffered writer
///
/// Any failure maps to [`Error::Manifest`], which the pipeline treats
/// as fatal rather than scoped to the current format.
pub fn write_manifest<F>(kind: &'static str, path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    std::fs::File::create(path)
        .and_then(|file| {
            let mut writer = BufWriter::new(file);
            write(&mut writer)?;
            writer.flush()
        })
        .map_err(|error| Error::Manifest {
            kind,
            path: path.to_path_buf(),
            error,
        })
}

/// Adds execute permission to a file
#[cfg(unix)]
pub async fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path)
        .await
        .fs_context("reading permissions of", path)?;
    let mut permissions = metadata.permissions();
    permissions.set_mode(permissions.mode() | 0o755);
    fs::set_permissions(path, permissions)
        .await
        .fs_context("setting permissions of", path)
}

/// Adds execute permission to a file
#[cfg(not(unix))]
pub async fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn remove_dir_all_tolerates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never-created");
        assert!(remove_dir_all(&missing).await.is_ok());
    }

    #[tokio::test]
    async fn create_dir_all_erases_previous_contents_on_request() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("staging");
        fs::create_dir_all(&target).await.unwrap();
        fs::write(target.join("stale"), b"old").await.unwrap();

        create_dir_all(&target, false).await.unwrap();
        assert!(target.join("stale").exists());

        create_dir_all(&target, true).await.unwrap();
        assert!(target.exists());
        assert!(!target.join("stale").exists());
    }

    #[tokio::test]
    async fn copy_file_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out");
        assert!(copy_file(dir.path(), &dest).await.is_err());
    }

    #[test]
    fn manifest_write_failures_use_the_manifest_variant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("control");
        let err = write_manifest("control file", &path, |w| writeln!(w, "Package: app"))
            .unwrap_err();
        assert!(err.is_manifest_failure());
    }

    #[test]
    fn manifests_are_written_line_by_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control");
        write_manifest("control file", &path, |w| {
            writeln!(w, "Package: app")?;
            writeln!(w, "Version: 1.0.0")
        })
        .unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Package: app\nVersion: 1.0.0\n"
        );
    }
}
