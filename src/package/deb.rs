//! Debian package production.
//!
//! Builds one `.deb` per configured architecture with `dpkg-deb`. The
//! staging tree under `build/pkg/.deb` holds the control file and the
//! binary laid out as it will be installed; the finished package is
//! renamed into the package output directory.

use std::path::Path;

use crate::bail;
use crate::config::Manifest;
use crate::package::PackageContext;
use crate::package::arch::deb_arch;
use crate::package::error::{Context, Result};
use crate::package::utils::fs;

/// Packages every configured Debian architecture
pub async fn package(ctx: &PackageContext<'_>) -> Result<()> {
    if !ctx.runner.is_installed("dpkg-deb").await {
        bail!("dpkg-deb is not installed. Can't package for debian based systems.");
    }

    let staging = ctx.layout.deb_staging().join(ctx.manifest.slug());
    fs::create_dir_all(&staging, true).await?;

    let architectures = &ctx.manifest.deb.architectures;
    let total = architectures.len();
    for (i, arch) in architectures.iter().enumerate() {
        ctx.progress
            .step(format!("Packaging for {arch}"), i + 1, total, 2);
        let result = package_arch(ctx, &staging, arch).await;
        ctx.contain_target(result, i + 1, total)?;
    }
    Ok(())
}

/// Stages and builds the package for one architecture
async fn package_arch(ctx: &PackageContext<'_>, staging: &Path, arch: &str) -> Result<()> {
    if !ctx.manifest.has_linux_build(arch) {
        bail!(
            "Can't package arch {}: binary wasn't built. Add linux/{} to [build]-platforms.",
            arch,
            arch
        );
    }

    fs::create_dir_all(&staging.join("DEBIAN"), false).await?;
    // the binary of the previous architecture must not leak into this one
    fs::create_dir_all(&staging.join("usr/bin"), true).await?;

    write_control(ctx.manifest, &staging.join("DEBIAN/control"), arch)?;

    let binary = ctx
        .layout
        .bin_dir()
        .join(ctx.manifest.binary_name("linux", arch));
    fs::copy_file(
        &binary,
        &staging.join("usr/bin").join(&ctx.manifest.application.name),
    )
    .await
    .with_context(|| format!("installing the {arch} binary"))?;

    ctx.runner
        .tool("dpkg-deb")?
        .arg("--build")
        .arg(staging)
        .run()
        .await?;

    let built = ctx
        .layout
        .deb_staging()
        .join(format!("{}.deb", ctx.manifest.slug()));
    let artifact = ctx
        .layout
        .pkg_dir()
        .join(format!("{}-{}.deb", ctx.manifest.slug(), deb_arch(arch)));
    fs::rename(&built, &artifact).await
}

/// Writes the `DEBIAN/control` manifest for one architecture
fn write_control(manifest: &Manifest, path: &Path, arch: &str) -> Result<()> {
    let app = &manifest.application;
    fs::write_manifest("control file", path, |w| {
        writeln!(w, "Package: {}", app.name)?;
        writeln!(w, "Version: {}", app.version)?;
        writeln!(w, "Architecture: {}", deb_arch(arch))?;
        writeln!(
            w,
            "Maintainer: {} <{}>",
            manifest.maintainer.name, manifest.maintainer.email
        )?;
        writeln!(w, "Description: {}", app.description)?;
        writeln!(w, "Section: custom")?;
        writeln!(w, "Priority: optional")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Template;

    #[test]
    fn control_file_translates_the_architecture() {
        let mut manifest: Manifest =
            toml::from_str(Template::All.contents()).unwrap();
        manifest.application.description = "An example".into();
        manifest.maintainer.name = "Jane Doe".into();
        manifest.maintainer.email = "jane@example.com".into();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("control");
        write_control(&manifest, &path, "386").unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Package: app\n\
             Version: 1.0.0\n\
             Architecture: i386\n\
             Maintainer: Jane Doe <jane@example.com>\n\
             Description: An example\n\
             Section: custom\n\
             Priority: optional\n"
        );
    }
}
