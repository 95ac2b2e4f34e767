//! External tool resolution and execution.
//!
//! Every external program the pipeline touches (go, dpkg-deb, rpmbuild,
//! makepkg, rsync, tar, wget, appimagetool) goes through [`ToolRunner`].
//! Resolution is separated from execution so availability can be probed
//! up front and so tests can point the runner at a directory of stub
//! scripts without touching the environment of spawned processes.

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use thiserror::Error;
use tokio::process::Command;

/// Errors from resolving or running an external tool
#[derive(Error, Debug)]
pub enum ToolError {
    /// The tool is not present on the search path
    #[error("{tool}: command not found")]
    NotFound {
        /// Name of the missing tool
        tool: String,
    },

    /// The tool was found but could not be spawned
    #[error("failed to run {tool}: {source}")]
    Spawn {
        /// Name of the tool
        tool: String,
        /// Underlying spawn error
        source: std::io::Error,
    },

    /// The tool ran and exited unsuccessfully
    #[error("{tool} failed ({status}): {output}")]
    Failed {
        /// Name of the tool
        tool: String,
        /// Exit status of the process
        status: ExitStatus,
        /// Combined stdout and stderr of the process
        output: String,
    },
}

/// Resolves tool names to executables
///
/// An explicit search path overrides where names are looked up; it does
/// not change the environment of the processes that get spawned.
#[derive(Debug, Clone, Default)]
pub struct ToolRunner {
    search_path: Option<OsString>,
}

impl ToolRunner {
    /// Creates a runner that resolves tools on the process search path
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a runner that resolves tools on the given search path only
    pub fn with_search_path(path: impl Into<OsString>) -> Self {
        Self {
            search_path: Some(path.into()),
        }
    }

    /// Resolves a tool by name
    pub fn tool(&self, name: &str) -> Result<Tool, ToolError> {
        let paths = self
            .search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"));
        let program =
            which::which_in(name, paths, Path::new(".")).map_err(|_| ToolError::NotFound {
                tool: name.to_string(),
            })?;
        Ok(Tool::new(name, program))
    }

    /// Wraps an executable at a known path, bypassing resolution
    pub fn tool_at(&self, program: impl Into<PathBuf>) -> Tool {
        let program = program.into();
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Tool::new(name, program)
    }

    /// Checks that a tool resolves and answers `--version` successfully
    pub async fn is_installed(&self, name: &str) -> bool {
        match self.tool(name) {
            Ok(tool) => tool.arg("--version").run().await.is_ok(),
            Err(_) => false,
        }
    }
}

/// A resolved tool invocation under construction
#[derive(Debug, Clone)]
pub struct Tool {
    name: String,
    program: PathBuf,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(OsString, OsString)>,
}

impl Tool {
    fn new(name: impl Into<String>, program: PathBuf) -> Self {
        Self {
            name: name.into(),
            program,
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
        }
    }

    /// Appends one argument
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    /// Appends several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_os_string());
        }
        self
    }

    /// Sets an environment variable for the spawned process
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Sets the working directory for the spawned process
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Runs the tool to completion and returns its combined output
    ///
    /// A non-zero exit status is an error carrying the full output, so
    /// callers can surface what the tool printed.
    pub async fn run(self) -> Result<String, ToolError> {
        log::debug!("running {} {:?}", self.program.display(), self.args);

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.cwd {
            command.current_dir(dir);
        }
        for (key, value) in &self.envs {
            command.env(key, value);
        }

        let output = command.output().await.map_err(|source| ToolError::Spawn {
            tool: self.name.clone(),
            source,
        })?;

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        if output.status.success() {
            Ok(text)
        } else {
            Err(ToolError::Failed {
                tool: self.name,
                status: output.status,
                output: text.trim().to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tool_does_not_resolve() {
        let runner = ToolRunner::new();
        assert!(matches!(
            runner.tool("definitely-not-a-real-tool-name"),
            Err(ToolError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn empty_search_path_hides_every_tool() {
        let runner = ToolRunner::with_search_path("");
        assert!(!runner.is_installed("tar").await);
    }
}
