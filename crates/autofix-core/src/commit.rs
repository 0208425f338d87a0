//! Conditional version-control commit of applied fixes.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::ReportingPolicy;
use crate::runner::{CommandRunner, CommandSpec, ToolAvailability};

/// Prefix of every commit message.
pub const COMMIT_PREFIX: &str = "🤖 Auto-fix: ";

const GIT: &str = "git";

/// Whether to commit, derived only from the CI flag at conclusion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDecision {
    commit: bool,
}

impl CommitDecision {
    pub fn from_ci_flag(ci: bool) -> Self {
        Self { commit: ci }
    }

    pub fn should_commit(&self) -> bool {
        self.commit
    }
}

/// Result of the commit step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommitOutcome {
    Committed { message: String },

    /// The working tree had no changes. Not a failure.
    NothingToCommit,

    /// `git commit` itself failed (hook rejection, missing identity, ...).
    /// Changes stay staged; the run's exit status is unaffected.
    Skipped { reason: String },

    /// Reported failure of staging. Escalates the exit status.
    Failed { message: String },
}

/// Commit message for the given fix descriptions.
pub fn commit_message(fixes: &[String]) -> String {
    format!("{}{}", COMMIT_PREFIX, fixes.join(", "))
}

/// Stages and commits all workspace changes through the command runner.
pub struct Committer<'a> {
    runner: &'a dyn CommandRunner,
}

impl<'a> Committer<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        Self { runner }
    }

    /// Stage everything and commit with a message built from `fixes`.
    pub async fn commit(&self, fixes: &[String]) -> CommitOutcome {
        let policy = ReportingPolicy::Reported;

        if self.runner.probe(GIT).await == ToolAvailability::Unavailable {
            return CommitOutcome::Failed {
                message: format!("{} is not installed or not in PATH", GIT),
            };
        }

        let add = self.runner.execute(&CommandSpec::new(GIT, ["add", "-A"])).await;
        if let Some(message) = policy.surface(&add) {
            return CommitOutcome::Failed { message };
        }

        let status = self
            .runner
            .execute(&CommandSpec::new(GIT, ["status", "--porcelain"]))
            .await;
        match status.output() {
            Some(out) if out.trim().is_empty() => {
                debug!("working tree clean after staging");
                return CommitOutcome::NothingToCommit;
            }
            Some(_) => {}
            None => debug!(outcome = ?status, "status check failed, attempting commit"),
        }

        let message = commit_message(fixes);
        let commit = self
            .runner
            .execute(&CommandSpec::new(GIT, ["commit", "-m", message.as_str()]))
            .await;
        if commit.is_success() {
            return CommitOutcome::Committed { message };
        }

        if commit
            .captured_output()
            .is_some_and(|out| out.contains("nothing to commit"))
        {
            return CommitOutcome::NothingToCommit;
        }

        let reason = commit
            .failure_message()
            .unwrap_or_else(|| "git commit failed".to_string());
        warn!(reason = %reason, "commit step failed; leaving changes staged");
        CommitOutcome::Skipped { reason }
    }
}
