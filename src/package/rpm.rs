//! RPM package production.
//!
//! Drives `rpmbuild` against a private topdir under `build/pkg/.rpm`.
//! The shared source archive is staged into `SOURCES` once; each
//! architecture gets its own generated spec file and a `-bb` build, and
//! an optional `-bs` run produces a source RPM.

use std::path::{Path, PathBuf};

use crate::bail;
use crate::config::Manifest;
use crate::package::PackageContext;
use crate::package::arch;
use crate::package::error::{Context, Result};
use crate::package::utils::fs;

/// Packages every configured RPM architecture, plus the source RPM
pub async fn package(ctx: &PackageContext<'_>) -> Result<()> {
    if !ctx.runner.is_installed("rpmbuild").await {
        bail!("rpmbuild is not installed. Can't package for RHEL based systems.");
    }
    let Some(archive) = ctx.source_archive else {
        bail!("the source archive is missing. Can't package for RHEL based systems.");
    };

    let topdir = ctx.layout.rpm_staging().join("rpmbuild");
    for sub in ["BUILD", "RPMS", "SOURCES", "SPECS", "SRPMS"] {
        fs::create_dir_all(&topdir.join(sub), true).await?;
    }
    fs::copy_file(
        archive,
        &topdir.join("SOURCES").join(ctx.manifest.source_archive_name()),
    )
    .await
    .context("staging the source archive")?;

    let architectures = &ctx.manifest.rpm.architectures;
    let total = architectures.len() + usize::from(ctx.manifest.rpm.build_src);
    for (i, target) in architectures.iter().enumerate() {
        ctx.progress
            .step(format!("Packaging for {target}"), i + 1, total, 2);
        let result = package_arch(ctx, &topdir, target).await;
        ctx.contain_target(result, i + 1, total)?;
    }

    if ctx.manifest.rpm.build_src {
        ctx.progress
            .step("Packaging the source rpm", total, total, 2);
        let result = package_source(ctx, &topdir).await;
        ctx.contain_target(result, total, total)?;
    }
    Ok(())
}

/// Builds the binary RPM for one architecture
async fn package_arch(ctx: &PackageContext<'_>, topdir: &Path, target: &str) -> Result<()> {
    let spec = write_spec(ctx.manifest, topdir, target)?;
    let rpm_arch = arch::rpm_arch(target);

    ctx.runner
        .tool("rpmbuild")?
        .arg("--without")
        .arg("debuginfo")
        .arg("--define")
        .arg(format!("_topdir {}", topdir.display()))
        .arg("--target")
        .arg(rpm_arch)
        .arg("-bb")
        .arg(&spec)
        .run()
        .await?;

    let file = format!("{}-1.{}.rpm", ctx.manifest.slug(), rpm_arch);
    let built = topdir.join("RPMS").join(rpm_arch).join(&file);
    fs::rename(&built, &ctx.layout.pkg_dir().join(&file)).await
}

/// Builds the source RPM
async fn package_source(ctx: &PackageContext<'_>, topdir: &Path) -> Result<()> {
    let spec = write_spec(ctx.manifest, topdir, arch::host_arch())?;

    ctx.runner
        .tool("rpmbuild")?
        .arg("--without")
        .arg("debuginfo")
        .arg("--define")
        .arg(format!("_topdir {}", topdir.display()))
        .arg("-bs")
        .arg(&spec)
        .run()
        .await?;

    let file = format!("{}-1.src.rpm", ctx.manifest.slug());
    let built = topdir.join("SRPMS").join(&file);
    fs::rename(&built, &ctx.layout.pkg_dir().join(&file)).await
}

/// Writes `SPECS/<name>.spec` for one target architecture
fn write_spec(manifest: &Manifest, topdir: &Path, target: &str) -> Result<PathBuf> {
    let app = &manifest.application;
    let slug = manifest.slug();
    let path = topdir
        .join("SPECS")
        .join(format!("{}.spec", app.name));
    fs::write_manifest("spec file", &path, |w| {
        writeln!(w, "%global _find_debuginfo_opts %{{nil}}")?;
        writeln!(w, "%define debug_package %{{nil}}")?;
        writeln!(w)?;
        writeln!(w, "Name: {}", app.name)?;
        writeln!(w, "Version: {}", app.version)?;
        writeln!(w, "Release: 1")?;
        writeln!(w, "Summary: {}", app.description)?;
        writeln!(w)?;
        writeln!(w, "License: {}", app.license)?;
        writeln!(w, "URL: {}", app.url)?;
        writeln!(w, "Source0: {}", manifest.source_archive_name())?;
        writeln!(w)?;
        writeln!(w, "BuildRequires: golang")?;
        writeln!(w, "Requires: libc6")?;
        writeln!(w)?;
        writeln!(w, "%description")?;
        writeln!(w, "{}", app.long_description)?;
        writeln!(w)?;
        writeln!(w, "%prep")?;
        writeln!(w, "%setup")?;
        writeln!(w)?;
        writeln!(w, "%build")?;
        writeln!(w, "go get")?;
        writeln!(
            w,
            "GOOS=linux GOARCH={} go build -o {} {}",
            target, slug, manifest.build.target
        )?;
        writeln!(w)?;
        writeln!(w, "%install")?;
        writeln!(w, "mkdir -p %{{buildroot}}/usr/bin/")?;
        writeln!(w, "install -m 755 {} %{{buildroot}}/usr/bin/{}", slug, app.name)?;
        writeln!(w)?;
        writeln!(w, "%files")?;
        writeln!(w, "/usr/bin/{}", app.name)
    })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Template;

    #[test]
    fn spec_file_targets_the_requested_architecture() {
        let mut manifest: Manifest =
            toml::from_str(Template::All.contents()).unwrap();
        manifest.application.description = "An example".into();
        manifest.application.long_description = "A longer example.".into();
        manifest.application.license = "MIT".into();
        manifest.application.url = "https://example.com".into();

        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("SPECS")).unwrap();
        let path = write_spec(&manifest, dir.path(), "arm64").unwrap();

        let spec = std::fs::read_to_string(path).unwrap();
        assert!(spec.starts_with(
            "%global _find_debuginfo_opts %{nil}\n%define debug_package %{nil}\n"
        ));
        assert!(spec.contains("Name: app\n"));
        assert!(spec.contains("Version: 1.0.0\n"));
        assert!(spec.contains("Release: 1\n"));
        assert!(spec.contains("Source0: app-1.0.0.tar.gz\n"));
        assert!(spec.contains("GOOS=linux GOARCH=arm64 go build -o app-1.0.0 .\n"));
        assert!(spec.contains("install -m 755 app-1.0.0 %{buildroot}/usr/bin/app\n"));
        assert!(spec.ends_with("%files\n/usr/bin/app\n"));
    }
}
