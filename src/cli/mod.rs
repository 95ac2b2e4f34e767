//! Command line interface.
//!
//! Parses arguments, loads the manifest, runs the pipeline and turns
//! the run's outcome into an exit code. Contained failures leave the
//! exit code at zero unless `--strict` was given.

mod args;
mod output;

pub use args::{Args, Command};
pub use output::ConsoleReporter;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;

use crate::config::{ConfigError, Manifest};
use crate::error::Result;
use crate::layout::Layout;
use crate::pipeline::Pipeline;
use crate::process::ToolRunner;

/// Main CLI entry point, returns the process exit code
pub async fn run() -> Result<i32> {
    let args = Args::parse();
    execute(args).await
}

/// Executes parsed arguments
pub async fn execute(args: Args) -> Result<i32> {
    let reporter = ConsoleReporter::new(args.timestamps);

    if let Some(Command::New { template }) = &args.command {
        template.write(&args.config)?;
        reporter.success(&format!("Wrote {}", args.config.display()));
        return Ok(0);
    }

    let action = args
        .command
        .as_ref()
        .and_then(Command::action)
        .unwrap_or_default();

    let started = Instant::now();
    let manifest_path =
        tokio::fs::canonicalize(&args.config)
            .await
            .map_err(|source| ConfigError::Read {
                path: args.config.clone(),
                source,
            })?;
    let manifest = Manifest::load(&manifest_path)?;
    let root = manifest_path.parent().unwrap_or(Path::new("/"));

    reporter.info(&format!(
        "Building {} {}",
        manifest.application.name, manifest.application.version
    ));

    let pipeline = Pipeline::new(
        manifest,
        Layout::new(root),
        ToolRunner::new(),
        Arc::new(reporter.clone()),
    );
    let report = pipeline.run(action).await?;

    if report.failures == 0 {
        reporter.success(&format!("Build complete in {:.2?}", started.elapsed()));
        Ok(0)
    } else {
        let noun = if report.failures == 1 {
            "failure"
        } else {
            "failures"
        };
        reporter.warn(&format!(
            "Build finished with {} {} in {:.2?}",
            report.failures,
            noun,
            started.elapsed()
        ));
        if args.strict { Ok(1) } else { Ok(0) }
    }
}
