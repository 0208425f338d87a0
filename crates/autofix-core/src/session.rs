//! The accumulated record of one orchestration run.
//!
//! A [`FixSession`] is a value: each action outcome is folded in with
//! [`FixSession::record`], which consumes the session and returns the
//! extended one. Both sequences are append-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::action::{ActionOutcome, FixAction};

/// Successes and unresolved errors of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixSession {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    concluded_at: Option<DateTime<Utc>>,
    attempted: Vec<FixAction>,
    fixes: Vec<String>,
    errors: Vec<String>,
}

impl Default for FixSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FixSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            concluded_at: None,
            attempted: Vec::new(),
            fixes: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Fold one action's outcome into the session.
    pub fn record(mut self, action: FixAction, outcome: ActionOutcome) -> Self {
        self.attempted.push(action);
        match outcome {
            ActionOutcome::Applied { description } => self.fixes.push(description),
            ActionOutcome::Skipped => {}
            ActionOutcome::Failed { message } => self.errors.push(message),
            ActionOutcome::AppliedWithError {
                description,
                message,
            } => {
                self.fixes.push(description);
                self.errors.push(message);
            }
        }
        self
    }

    /// Append a reported failure raised outside the action set (commit step).
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }

    /// Stamp the conclusion time. Idempotent.
    pub fn conclude(mut self) -> Self {
        if self.concluded_at.is_none() {
            self.concluded_at = Some(Utc::now());
        }
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn concluded_at(&self) -> Option<DateTime<Utc>> {
        self.concluded_at
    }

    /// Actions attempted, in execution order.
    pub fn attempted(&self) -> &[FixAction] {
        &self.attempted
    }

    /// Descriptions of applied fixes, in execution order.
    pub fn fixes(&self) -> &[String] {
        &self.fixes
    }

    /// Unresolved error messages, verbatim.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// No unresolved errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Wall-clock duration, if concluded.
    pub fn duration_ms(&self) -> Option<u64> {
        self.concluded_at.map(|end| {
            end.signed_duration_since(self.started_at)
                .num_milliseconds()
                .max(0) as u64
        })
    }
}
