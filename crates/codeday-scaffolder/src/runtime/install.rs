//! Package-manager install step

use crate::error::{Result, ScaffoldError};
use crate::product::ProductConfig;
use crate::report::{Level, Reporter};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command as TokioCommand;

/// Terminal outcome of the install process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallResult {
    Success,
    /// The tool ran and exited non-zero (-1 when killed by a signal)
    NonZeroExit(i32),
    /// The tool is not present in the environment
    ToolMissing,
}

/// Runs the install tool once in a generated project
#[derive(Debug, Clone)]
pub struct InstallOrchestrator {
    tool: String,
    args: Vec<String>,
}

impl InstallOrchestrator {
    /// Orchestrator running `<tool> install`
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            args: vec!["install".to_string()],
        }
    }

    pub fn from_config<C: ProductConfig>(config: &C) -> Self {
        Self::new(config.install_tool()).with_args(config.install_args())
    }

    /// Replace the arguments passed to the tool
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.args = args.into_iter().map(|a| a.to_string()).collect();
        self
    }

    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// Command line as shown to users
    pub fn command_line(&self) -> String {
        std::iter::once(self.tool.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the tool in `dir` with inherited stdio and wait for its exit.
    ///
    /// No retries; the exit status is observed exactly once.
    pub async fn install(&self, dir: &Path, reporter: &dyn Reporter) -> Result<InstallResult> {
        reporter.info(
            "install",
            &format!("{} (in {})", self.command_line(), dir.display()),
        );

        // A missing working directory also surfaces as NotFound from spawn
        tokio::fs::metadata(dir)
            .await
            .map_err(|e| ScaffoldError::fs("inspect", dir, e))?;

        let status = TokioCommand::new(&self.tool)
            .args(&self.args)
            .current_dir(dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await;

        let result = match status {
            Ok(status) if status.success() => InstallResult::Success,
            Ok(status) => InstallResult::NonZeroExit(status.code().unwrap_or(-1)),
            Err(e) if e.kind() == ErrorKind::NotFound => InstallResult::ToolMissing,
            Err(e) => {
                return Err(ScaffoldError::Spawn {
                    tool: self.tool.clone(),
                    source: e,
                })
            }
        };

        match result {
            InstallResult::Success => reporter.info("install", "dependencies installed"),
            InstallResult::NonZeroExit(code) => reporter.notify(
                Level::Error,
                "install",
                &format!("{} exited with code {code}", self.tool),
            ),
            InstallResult::ToolMissing => reporter.notify(
                Level::Error,
                "install",
                &format!("'{}' was not found in PATH", self.tool),
            ),
        }

        Ok(result)
    }
}
