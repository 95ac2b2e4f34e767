//! Arch package production.
//!
//! Writes a PKGBUILD next to the source archive under `build/pkg/.arch`
//! and lets `makepkg` compile and assemble the package. makepkg builds
//! for the machine it runs on, so any architecture other than the host's
//! is rejected per target.

use std::path::Path;

use crate::bail;
use crate::config::Manifest;
use crate::package::PackageContext;
use crate::package::arch;
use crate::package::error::{Context, Result};
use crate::package::utils::fs;

/// Packages every configured Arch architecture
pub async fn package(ctx: &PackageContext<'_>) -> Result<()> {
    if !ctx.runner.is_installed("makepkg").await {
        bail!("makepkg is not installed. Can't package for arch based systems.");
    }
    let Some(archive) = ctx.source_archive else {
        bail!("the source archive is missing. Can't package for arch based systems.");
    };

    let staging = ctx.layout.arch_staging();
    fs::create_dir_all(&staging, true).await?;

    let architectures = &ctx.manifest.pkg.architectures;
    let total = architectures.len();
    for (i, target) in architectures.iter().enumerate() {
        ctx.progress
            .step(format!("Packaging for {target}"), i + 1, total, 2);
        let result = package_arch(ctx, archive, &staging, target).await;
        ctx.contain_target(result, i + 1, total)?;
    }
    Ok(())
}

/// Stages and builds the package for one architecture
async fn package_arch(
    ctx: &PackageContext<'_>,
    archive: &Path,
    staging: &Path,
    target: &str,
) -> Result<()> {
    let host = arch::host_arch();
    if target != host {
        bail!("Can't package for architecture {} on a {} system.", target, host);
    }

    fs::copy_file(archive, &staging.join(ctx.manifest.source_archive_name()))
        .await
        .context("staging the source archive")?;
    write_pkgbuild(ctx.manifest, &staging.join("PKGBUILD"), target)?;

    // PKGEXT pins the artifact name; makepkg defaults vary by system
    ctx.runner
        .tool("makepkg")?
        .env("PKGEXT", ".pkg.tar.gz")
        .current_dir(staging)
        .run()
        .await?;

    let file = format!(
        "{}-1-{}.pkg.tar.gz",
        ctx.manifest.slug(),
        arch::pacman_arch(target)
    );
    fs::rename(&staging.join(&file), &ctx.layout.pkg_dir().join(&file)).await
}

/// Writes the PKGBUILD for one target architecture
fn write_pkgbuild(manifest: &Manifest, path: &Path, target: &str) -> Result<()> {
    let app = &manifest.application;
    fs::write_manifest("PKGBUILD", path, |w| {
        writeln!(
            w,
            "# Maintainer: {} <{}>",
            manifest.maintainer.name, manifest.maintainer.email
        )?;
        writeln!(w, "pkgname={}", app.name)?;
        writeln!(w, "pkgver={}", app.version)?;
        writeln!(w, "pkgrel=1")?;
        writeln!(w, "pkgdesc=\"{}\"", app.description)?;
        writeln!(w, "arch=('{}')", arch::pacman_arch(target))?;
        writeln!(w, "url=\"{}\"", app.url)?;
        writeln!(w, "license=('{}')", app.license)?;
        writeln!(w, "source=(\"{}\")", manifest.source_archive_name())?;
        writeln!(w, "sha256sums=('SKIP')")?;
        writeln!(w)?;
        writeln!(w, "build() {{")?;
        writeln!(w, "    cd \"$srcdir/$pkgname-$pkgver\"")?;
        writeln!(
            w,
            "    GOOS=linux GOARCH={} go build -o \"$pkgname\" {}",
            target, manifest.build.target
        )?;
        writeln!(w, "}}")?;
        writeln!(w)?;
        writeln!(w, "package() {{")?;
        writeln!(w, "    cd \"$srcdir/$pkgname-$pkgver\"")?;
        writeln!(
            w,
            "    install -Dm755 \"$pkgname\" \"$pkgdir/usr/bin/$pkgname\""
        )?;
        writeln!(w, "}}")
    })
}
