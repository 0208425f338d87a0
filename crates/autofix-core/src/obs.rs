//! Structured observability hooks for the session lifecycle.
//!
//! This module provides:
//! - A session-scoped tracing span for instrumenting the run
//! - Emission functions for session start/conclusion, action start/finish, and commit
//!
//! Events are emitted at `info!` level; filter with `RUST_LOG`.

use tracing::info;

use crate::action::{ActionOutcome, FixAction};
use crate::commit::CommitOutcome;

/// Span tagging every event of one run with its session id.
///
/// ```ignore
/// use tracing::Instrument;
/// fixer_phase().instrument(session_span("6f1c...")).await;
/// // every event inside carries session_id = "6f1c..."
/// ```
pub fn session_span(session_id: &str) -> tracing::Span {
    tracing::info_span!("autofix.session", session_id = %session_id)
}

pub fn emit_session_started(session_id: &str, workspace: &str, ci: bool) {
    info!(event = "session.started", session_id = %session_id, workspace = %workspace, ci = ci);
}

pub fn emit_action_started(action: FixAction) {
    info!(event = "action.started", action = action.name());
}

pub fn emit_action_finished(action: FixAction, outcome: &ActionOutcome, duration_ms: u64) {
    let result = match outcome {
        ActionOutcome::Applied { .. } => "applied",
        ActionOutcome::Skipped => "skipped",
        ActionOutcome::Failed { .. } => "failed",
        ActionOutcome::AppliedWithError { .. } => "applied_with_error",
    };
    info!(
        event = "action.finished",
        action = action.name(),
        result = result,
        duration_ms = duration_ms,
    );
}

/// Emit event: session concluded with counts and duration.
pub fn emit_session_concluded(session_id: &str, fixes: usize, errors: usize, duration_ms: u64) {
    info!(
        event = "session.concluded",
        session_id = %session_id,
        fixes = fixes,
        errors = errors,
        duration_ms = duration_ms,
    );
}

pub fn emit_commit_finished(outcome: &CommitOutcome) {
    match outcome {
        CommitOutcome::Committed { .. } => info!(event = "commit.finished", result = "committed"),
        CommitOutcome::NothingToCommit => {
            info!(event = "commit.finished", result = "nothing_to_commit")
        }
        CommitOutcome::Skipped { reason } => {
            tracing::warn!(event = "commit.finished", result = "skipped", reason = %reason)
        }
        CommitOutcome::Failed { message } => {
            tracing::warn!(event = "commit.finished", result = "failed", error = %message)
        }
    }
}
