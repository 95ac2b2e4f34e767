//! AppImage production.
//!
//! Assembles an AppDir under `build/pkg/.appimage` with the desktop
//! entry, icon, AppRun stub and the built binary, then hands it to
//! appimagetool. Both appimagetool and the per-architecture AppRun stubs
//! come from the AppImageKit continuous release and are cached in the
//! utility cache, so repeated runs do not download them again.

use std::path::{Path, PathBuf};

use crate::bail;
use crate::config::Manifest;
use crate::package::PackageContext;
use crate::package::arch;
use crate::package::error::{Context, Result};
use crate::package::utils::fs;

const DOWNLOAD_BASE: &str =
    "https://github.com/AppImage/AppImageKit/releases/download/continuous";

/// Packages every configured AppImage architecture
pub async fn package(ctx: &PackageContext<'_>) -> Result<()> {
    let host = arch::host_arch();
    if !arch::is_standard_arch(host) {
        bail!(
            "Can't package an AppImage on a non-standard architecture ({}).",
            host
        );
    }
    if !ctx.runner.is_installed("wget").await {
        bail!("wget is not installed. Can't package an AppImage.");
    }

    let tool = ensure_appimagetool(ctx, host).await?;

    let app = &ctx.manifest.application;
    let appdir = ctx
        .layout
        .appimage_staging()
        .join(format!("{}.AppDir", app.name));
    fs::create_dir_all(&appdir, true).await?;
    fs::create_dir_all(&appdir.join("usr/bin"), false).await?;
    write_desktop_entry(
        ctx.manifest,
        &appdir.join(format!("{}.desktop", app.name)),
    )?;
    stage_icon(ctx, &appdir).await?;

    let architectures = &ctx.manifest.appimage.architectures;
    let total = architectures.len();
    for (i, target) in architectures.iter().enumerate() {
        ctx.progress
            .step(format!("Packaging for {target}"), i + 1, total, 2);
        let result = package_arch(ctx, &tool, &appdir, target).await;
        ctx.contain_target(result, i + 1, total)?;
    }
    Ok(())
}

/// Builds the AppImage for one architecture
async fn package_arch(
    ctx: &PackageContext<'_>,
    tool: &Path,
    appdir: &Path,
    target: &str,
) -> Result<()> {
    if !arch::is_standard_arch(target) {
        bail!(
            "Can't package an AppImage for a non-standard architecture ({}).",
            target
        );
    }

    let apprun = if ctx.manifest.appimage.custom_apprun.is_empty() {
        ensure_apprun(ctx, target).await?
    } else {
        ctx.layout.root().join(&ctx.manifest.appimage.custom_apprun)
    };
    fs::copy_file(&apprun, &appdir.join("AppRun"))
        .await
        .context("staging AppRun")?;
    fs::make_executable(&appdir.join("AppRun")).await?;

    let binary = ctx
        .layout
        .bin_dir()
        .join(ctx.manifest.binary_name("linux", target));
    fs::copy_file(
        &binary,
        &appdir.join("usr/bin").join(&ctx.manifest.application.name),
    )
    .await
    .with_context(|| format!("installing the {target} binary"))?;

    let artifact = ctx.layout.pkg_dir().join(format!(
        "{}-{}.AppImage",
        ctx.manifest.desktop_entry.name,
        arch::appimage_arch(target)
    ));
    ctx.runner
        .tool_at(tool)
        .arg(appdir)
        .arg(&artifact)
        .run()
        .await?;
    Ok(())
}

/// Returns the cached appimagetool, downloading it on first use
async fn ensure_appimagetool(ctx: &PackageContext<'_>, host: &str) -> Result<PathBuf> {
    let file = format!("appimagetool-{}.AppImage", arch::appimage_arch(host));
    let cached = ctx.layout.cache_dir().join(&file);
    if !cached.exists() {
        download(ctx, &file).await.context("downloading appimagetool")?;
        fs::make_executable(&cached).await?;
    }
    Ok(cached)
}

/// Returns the cached AppRun stub for a target, downloading it on first use
async fn ensure_apprun(ctx: &PackageContext<'_>, target: &str) -> Result<PathBuf> {
    let file = format!("AppRun-{}", arch::appimage_arch(target));
    let cached = ctx.layout.cache_dir().join(&file);
    if !cached.exists() {
        download(ctx, &file).await.context("downloading AppRun")?;
    }
    Ok(cached)
}

/// Fetches one AppImageKit release file into the utility cache
async fn download(ctx: &PackageContext<'_>, file: &str) -> Result<()> {
    fs::create_dir_all(ctx.layout.cache_dir(), false).await?;
    ctx.runner
        .tool("wget")?
        .arg(format!("{DOWNLOAD_BASE}/{file}"))
        .current_dir(ctx.layout.cache_dir())
        .run()
        .await?;
    Ok(())
}

/// Writes the desktop entry the AppImage is built around
fn write_desktop_entry(manifest: &Manifest, path: &Path) -> Result<()> {
    let app = &manifest.application;
    let entry = &manifest.desktop_entry;
    fs::write_manifest("desktop entry", path, |w| {
        writeln!(w, "[Desktop Entry]")?;
        writeln!(w, "Name={}", entry.name)?;
        writeln!(w, "Exec={}", app.name)?;
        writeln!(w, "Icon={}", app.name)?;
        writeln!(w, "Type=Application")?;
        let mut categories = String::new();
        for category in &entry.categories {
            categories.push_str(category);
            categories.push(';');
        }
        writeln!(w, "Categories={categories}")?;
        if !app.gui {
            writeln!(w, "Terminal=true")?;
        }
        Ok(())
    })
}

/// Copies the configured icon into the AppDir root, keeping its extension
async fn stage_icon(ctx: &PackageContext<'_>, appdir: &Path) -> Result<()> {
    let icon = &ctx.manifest.desktop_entry.icon;
    if icon.is_empty() {
        return Ok(());
    }
    let source = ctx.layout.root().join(icon);
    let mut name = ctx.manifest.application.name.clone();
    if let Some(ext) = source.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    fs::copy_file(&source, &appdir.join(name))
        .await
        .context("staging the icon")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Template;

    #[test]
    fn desktop_entry_marks_console_applications() {
        let mut manifest: Manifest =
            toml::from_str(Template::All.contents()).unwrap();
        manifest.desktop_entry.name = "Example App".into();
        manifest.desktop_entry.categories =
            vec!["Utility".into(), "Development".into()];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.desktop");
        write_desktop_entry(&manifest, &path).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "[Desktop Entry]\n\
             Name=Example App\n\
             Exec=app\n\
             Icon=app\n\
             Type=Application\n\
             Categories=Utility;Development;\n\
             Terminal=true\n"
        );
    }

    #[test]
    fn gui_applications_omit_the_terminal_key() {
        let mut manifest: Manifest =
            toml::from_str(Template::All.contents()).unwrap();
        manifest.application.gui = true;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.desktop");
        write_desktop_entry(&manifest, &path).unwrap();

        let entry = std::fs::read_to_string(&path).unwrap();
        assert!(!entry.contains("Terminal"));
        assert!(entry.ends_with("Categories=Utility;\n"));
    }
}
