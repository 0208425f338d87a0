//! Orchestration of the fix action set.
//!
//! [`AutoFixer`] moves through Idle → Running → Concluded exactly once:
//! every action runs unconditionally in [`FixAction::ORDER`], the session is
//! reported, the committer runs when the run is under CI and something was
//! fixed, and the exit status is derived from the error sequence.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn, Instrument};

use crate::action::{ActionContext, FixAction};
use crate::commit::{CommitDecision, CommitOutcome, Committer};
use crate::config::AutofixConfig;
use crate::error::{AutofixError, Result};
use crate::obs;
use crate::reporter::{Console, ExitStatus, LogKind, Reporter};
use crate::runner::{CommandRunner, ToolAvailability};
use crate::session::FixSession;

/// Lifecycle state of an [`AutoFixer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixerState {
    Idle,
    Running,
    Concluded,
}

impl fmt::Display for FixerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FixerState::Idle => "idle",
            FixerState::Running => "running",
            FixerState::Concluded => "concluded",
        };
        f.write_str(s)
    }
}

/// Result of a complete run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Final session, including any commit failure.
    pub session: FixSession,

    /// Commit step result; `None` when the committer was not reached.
    pub commit: Option<CommitOutcome>,

    /// Process exit status.
    pub exit_status: ExitStatus,
}

/// Drives the fix actions and owns the session for one run.
pub struct AutoFixer {
    runner: Arc<dyn CommandRunner>,
    config: AutofixConfig,
    console: Console,
    state: FixerState,
}

impl AutoFixer {
    /// Orchestrator printing operator lines to stdout.
    pub fn new(runner: Arc<dyn CommandRunner>, config: AutofixConfig) -> Self {
        Self {
            runner,
            config,
            console: Console::stdout(),
            state: FixerState::Idle,
        }
    }

    /// Replace the operator console.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn state(&self) -> FixerState {
        self.state
    }

    pub fn console(&self) -> &Console {
        &self.console
    }

    pub fn config(&self) -> &AutofixConfig {
        &self.config
    }

    /// Execute the whole run. Only orchestration defects (invalid
    /// configuration, re-entry) return `Err`; command failures end up in
    /// the report.
    pub async fn run(&mut self) -> Result<RunReport> {
        if self.state != FixerState::Idle {
            return Err(AutofixError::AlreadyStarted {
                state: self.state.to_string(),
            });
        }
        self.config.validate()?;
        self.state = FixerState::Running;

        let session = FixSession::new();
        let span = obs::session_span(&session.session_id().to_string());

        let session = self.run_actions(session).instrument(span.clone()).await;
        self.state = FixerState::Concluded;

        let report = self.conclude(session.conclude()).instrument(span).await;
        Ok(report)
    }

    async fn run_actions(&self, session: FixSession) -> FixSession {
        obs::emit_session_started(
            &session.session_id().to_string(),
            &self.config.workspace.display().to_string(),
            self.config.ci,
        );
        self.console.log(LogKind::Info, "Starting auto-fix process...");
        self.preflight().await;

        let ctx = ActionContext {
            runner: self.runner.as_ref(),
            config: &self.config,
            console: &self.console,
        };

        let mut session = session;
        for action in FixAction::ORDER {
            self.console.log(LogKind::Fix, action.announcement());
            obs::emit_action_started(action);

            let start = Instant::now();
            let outcome = action.run(&ctx).await;
            obs::emit_action_finished(action, &outcome, start.elapsed().as_millis() as u64);

            session = session.record(action, outcome);
        }
        session
    }

    /// Log tools that are missing up front. Actions still run; a missing
    /// tool surfaces as an `Unavailable` outcome.
    async fn preflight(&self) {
        let mut programs: BTreeSet<&str> = FixAction::ORDER
            .iter()
            .flat_map(|a| a.programs().iter().copied())
            .collect();
        if self.config.ci {
            programs.insert("git");
        }

        for program in programs {
            if self.runner.probe(program).await == ToolAvailability::Unavailable {
                warn!(program = program, "tool not found on PATH");
            }
        }
    }

    async fn conclude(&self, session: FixSession) -> RunReport {
        let reporter = Reporter::new(&self.console);
        reporter.report_fixes(&session);

        let decision = CommitDecision::from_ci_flag(self.config.ci);
        let mut session = session;
        let mut commit = None;

        if !session.fixes().is_empty() && decision.should_commit() {
            self.console.log(LogKind::Info, "Committing fixes...");
            let outcome = Committer::new(self.runner.as_ref())
                .commit(session.fixes())
                .await;
            obs::emit_commit_finished(&outcome);
            if let CommitOutcome::Failed { message } = &outcome {
                session = session.with_error(message.clone());
            }
            commit = Some(outcome);
        } else if !decision.should_commit() {
            info!("not in CI; skipping commit");
        }

        let exit_status = reporter.report_errors(&session);
        obs::emit_session_concluded(
            &session.session_id().to_string(),
            session.fixes().len(),
            session.errors().len(),
            session.duration_ms().unwrap_or_default(),
        );

        RunReport {
            session,
            commit,
            exit_status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{failed, ScriptedRunner};

    fn fixer(dir: &tempfile::TempDir, runner: Arc<ScriptedRunner>, ci: bool) -> AutoFixer {
        let config = AutofixConfig {
            workspace: dir.path().to_path_buf(),
            ci,
            ..Default::default()
        };
        AutoFixer::new(runner, config).with_console(Console::buffered())
    }

    #[test]
    fn test_state_display() {
        assert_eq!(FixerState::Idle.to_string(), "idle");
        assert_eq!(FixerState::Concluded.to_string(), "concluded");
    }

    #[tokio::test]
    async fn test_run_transitions_to_concluded() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixer = fixer(&dir, Arc::new(ScriptedRunner::new()), false);
        assert_eq!(fixer.state(), FixerState::Idle);

        let report = fixer.run().await.expect("run failed");
        assert_eq!(fixer.state(), FixerState::Concluded);
        assert_eq!(report.session.attempted(), &FixAction::ORDER);
        assert!(report.session.concluded_at().is_some());
    }

    #[tokio::test]
    async fn test_run_cannot_be_reentered() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixer = fixer(&dir, Arc::new(ScriptedRunner::new()), false);
        fixer.run().await.expect("first run failed");

        let second = fixer.run().await;
        assert!(matches!(
            second,
            Err(AutofixError::AlreadyStarted { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_workspace_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new());
        let config = AutofixConfig {
            workspace: dir.path().join("missing"),
            ..Default::default()
        };
        let mut fixer = AutoFixer::new(runner.clone(), config).with_console(Console::buffered());

        assert!(matches!(
            fixer.run().await,
            Err(AutofixError::WorkspaceNotFound(_))
        ));
        assert!(runner.calls().is_empty());
        assert_eq!(fixer.state(), FixerState::Idle);
    }

    #[tokio::test]
    async fn test_failure_does_not_block_next_action() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(ScriptedRunner::new().on("eslint . --fix --ext", failed("lint down")));
        let mut fixer = fixer(&dir, runner.clone(), false);

        let report = fixer.run().await.expect("run failed");
        assert!(runner.was_called("prettier"));
        assert_eq!(report.session.fixes()[0], "Fixed formatting");
        assert_eq!(report.exit_status, ExitStatus::Success);
    }

    #[tokio::test]
    async fn test_operator_lines_frame_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut fixer = fixer(&dir, Arc::new(ScriptedRunner::new()), false);
        fixer.run().await.expect("run failed");

        let lines = fixer.console().lines();
        assert_eq!(lines[0], "ℹ️ Starting auto-fix process...");
        assert!(lines.contains(&"🔧 Fixing linting issues...".to_string()));
        assert!(lines.contains(&"=".repeat(50)));
    }
}
