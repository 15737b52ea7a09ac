//! Running external programs.
//!
//! Every analysis stage reduces to "run this program with these arguments and
//! fail if it exits non-zero". [`Invocation`] describes one such call and
//! [`ToolRunner`] executes it; stages only see the trait so tests can swap in
//! a runner that records calls instead of spawning processes.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;
use tracing::debug;

pub mod requirements;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("failed to start {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{tool} exited with {}{}", .code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")), stderr_tail(.stderr))]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("cannot redirect {tool} output to {path}: {source}")]
    Redirect {
        tool: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn stderr_tail(stderr: &str) -> String {
    let tail: Vec<&str> = stderr.trim().lines().rev().take(5).collect();
    if tail.is_empty() {
        String::new()
    } else {
        let lines: Vec<&str> = tail.into_iter().rev().collect();
        format!(": {}", lines.join(" | "))
    }
}

/// One external program call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub tool: String,
    pub args: Vec<OsString>,
    /// Write the program's standard output to this file instead of discarding it
    pub stdout: Option<PathBuf>,
    /// Working directory for programs that drop files next to where they run
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            args: Vec::new(),
            stdout: None,
            current_dir: None,
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Append `<flag><path>` as a single argument, e.g. `--output=<path>`
    #[must_use]
    pub fn joined(mut self, flag: &str, path: &Path) -> Self {
        let mut arg = OsString::from(flag);
        arg.push(path.as_os_str());
        self.args.push(arg);
        self
    }

    #[must_use]
    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Shell-like rendering for logs
    #[must_use]
    pub fn command_line(&self) -> String {
        let mut line = self.tool.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        if let Some(path) = &self.stdout {
            line.push_str(&format!(" > {}", path.display()));
        }
        line
    }
}

/// What a successful run leaves behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: Option<PathBuf>,
    pub stderr: String,
}

/// Capability to run an external program to completion
pub trait ToolRunner {
    /// Run the invocation and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns `ToolError::Spawn` if the program cannot be started,
    /// `ToolError::Redirect` if the stdout file cannot be created, or
    /// `ToolError::Failed` if it exits unsuccessfully.
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;
}

/// Runs invocations as child processes, one at a time
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Show a spinner on stderr while a program runs
    pub progress: bool,
}

impl ProcessRunner {
    #[must_use]
    pub fn new(progress: bool) -> Self {
        Self { progress }
    }

    fn spinner(&self, tool: &str) -> ProgressBar {
        if !self.progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} Running {msg} [{elapsed}]") {
            bar.set_style(style);
        }
        bar.set_message(tool.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        let tool = invocation.tool.clone();
        debug!("$ {}", invocation.command_line());

        let mut command = Command::new(&invocation.tool);
        command.args(&invocation.args).stdin(Stdio::null());
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }
        match &invocation.stdout {
            Some(path) => {
                let file = File::create(path).map_err(|source| ToolError::Redirect {
                    tool: tool.clone(),
                    path: path.clone(),
                    source,
                })?;
                command.stdout(file);
            }
            None => {
                command.stdout(Stdio::null());
            }
        }

        let bar = self.spinner(&tool);
        let result = command.stderr(Stdio::piped()).output();
        bar.finish_and_clear();

        let output = result.map_err(|source| ToolError::Spawn {
            tool: tool.clone(),
            source,
        })?;
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool,
                code: output.status.code(),
                stderr,
            });
        }

        debug!("{} finished", tool);
        Ok(ToolOutput {
            stdout: invocation.stdout.clone(),
            stderr,
        })
    }
}
