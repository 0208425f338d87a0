//! External command execution against the workspace.
//!
//! Every delegated tool (lint fixer, formatter, package manager, type
//! checker, config generator, git) is reached through [`CommandRunner`].
//! Failures are converted to [`ExecutionOutcome`] values here and never
//! propagate past this boundary as errors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

/// A command to execute. No shell is involved: `program` is spawned directly
/// with `args`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Executable name or path.
    pub program: String,

    /// Arguments passed verbatim.
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Build a command from a program and its arguments.
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether any argument equals `arg`.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(char::is_whitespace) {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Result of one command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExecutionOutcome {
    /// Exit status 0. `output` is stdout followed by stderr, possibly empty.
    Succeeded { output: String },

    /// Non-zero exit or an execution error after the program was found.
    Failed { output: String, message: String },

    /// Wall-clock timeout exceeded; the child was killed.
    TimedOut { after_ms: u64 },

    /// The program is not installed or not on `PATH`.
    Unavailable { program: String },
}

impl ExecutionOutcome {
    /// Output of a successful run; `None` is the "no output" sentinel for
    /// every failure class.
    pub fn output(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Succeeded { output } => Some(output),
            _ => None,
        }
    }

    /// Whatever text was captured, regardless of exit status.
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            ExecutionOutcome::Succeeded { output } | ExecutionOutcome::Failed { output, .. } => {
                Some(output)
            }
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionOutcome::Succeeded { .. })
    }

    /// Human-readable failure message, `None` on success.
    pub fn failure_message(&self) -> Option<String> {
        match self {
            ExecutionOutcome::Succeeded { .. } => None,
            ExecutionOutcome::Failed { message, .. } => Some(message.clone()),
            ExecutionOutcome::TimedOut { after_ms } => {
                Some(format!("Command timed out after {}ms", after_ms))
            }
            ExecutionOutcome::Unavailable { program } => {
                Some(format!("{} is not installed or not in PATH", program))
            }
        }
    }
}

/// Whether a program can be launched in the current environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolAvailability {
    Available,
    Unavailable,
}

/// Executes external commands against a workspace.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Execute a command to completion. Never fails: every failure class is
    /// reported through the returned outcome.
    async fn execute(&self, command: &CommandSpec) -> ExecutionOutcome;

    /// Check whether `program` can be launched without running it.
    async fn probe(&self, program: &str) -> ToolAvailability;
}

/// [`CommandRunner`] backed by real subprocesses.
#[derive(Debug)]
pub struct ProcessRunner {
    workspace: PathBuf,
    timeout: Option<Duration>,
    failures: Mutex<Vec<String>>,
}

impl ProcessRunner {
    /// Create a runner that executes commands inside `workspace` with no
    /// timeout.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            timeout: None,
            failures: Mutex::new(Vec::new()),
        }
    }

    /// Bound each command's wall-clock time. A zero duration disables the
    /// bound.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Failure messages seen so far. Diagnostic only; the session is the
    /// record of what gets reported.
    pub fn failures(&self) -> Vec<String> {
        self.failures
            .lock()
            .map(|f| f.clone())
            .unwrap_or_default()
    }

    fn note(&self, outcome: &ExecutionOutcome) {
        if let Some(message) = outcome.failure_message() {
            if let Ok(mut failures) = self.failures.lock() {
                failures.push(message);
            }
        }
    }

    async fn spawn_and_wait(&self, command: &CommandSpec) -> ExecutionOutcome {
        let start = Instant::now();

        let child = Command::new(&command.program)
            .args(&command.args)
            .current_dir(&self.workspace)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return ExecutionOutcome::Unavailable {
                    program: command.program.clone(),
                };
            }
            Err(e) => {
                return ExecutionOutcome::Failed {
                    output: String::new(),
                    message: format!("Command failed to start: {}: {}", command, e),
                };
            }
        };

        let waited = match self.timeout {
            Some(timeout) => {
                match tokio::time::timeout(timeout, child.wait_with_output()).await {
                    Ok(waited) => waited,
                    // Dropping the future drops the child, which kills it.
                    Err(_) => {
                        return ExecutionOutcome::TimedOut {
                            after_ms: millis(timeout),
                        };
                    }
                }
            }
            None => child.wait_with_output().await,
        };

        let output = match waited {
            Ok(output) => output,
            Err(e) => {
                return ExecutionOutcome::Failed {
                    output: String::new(),
                    message: format!("Command failed: {}: {}", command, e),
                };
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let combined = format!("{}{}", stdout, stderr);

        debug!(
            command = %command,
            exit_code = output.status.code().unwrap_or(-1),
            duration_ms = millis(start.elapsed()),
            "command finished"
        );

        if output.status.success() {
            ExecutionOutcome::Succeeded { output: combined }
        } else {
            let exit = output
                .status
                .code()
                .map(|c| format!("exit code {}", c))
                .unwrap_or_else(|| "terminated by signal".to_string());
            let detail = if stderr.trim().is_empty() {
                stdout.trim()
            } else {
                stderr.trim()
            };
            let message = if detail.is_empty() {
                format!("Command failed: {} ({})", command, exit)
            } else {
                format!("Command failed: {} ({})\n{}", command, exit, detail)
            };
            ExecutionOutcome::Failed {
                output: combined,
                message,
            }
        }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(&self, command: &CommandSpec) -> ExecutionOutcome {
        let outcome = if command.program.is_empty() {
            ExecutionOutcome::Failed {
                output: String::new(),
                message: crate::error::AutofixError::EmptyCommand.to_string(),
            }
        } else {
            self.spawn_and_wait(command).await
        };
        self.note(&outcome);
        outcome
    }

    async fn probe(&self, program: &str) -> ToolAvailability {
        resolve_program(program, std::env::var_os("PATH"), &self.workspace)
    }
}

/// Whether `program` resolves to an executable file on `search_path`, or
/// relative to `cwd` when it contains a path separator.
fn resolve_program(
    program: &str,
    search_path: Option<std::ffi::OsString>,
    cwd: &Path,
) -> ToolAvailability {
    if program.is_empty() {
        return ToolAvailability::Unavailable;
    }
    match which::which_in(program, search_path, cwd) {
        Ok(_) => ToolAvailability::Available,
        Err(e) => {
            debug!(program = program, error = %e, "program not resolvable");
            ToolAvailability::Unavailable
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
