//! Operator-facing output and exit status.
//!
//! Operator lines are `<icon> <message>` on stdout. Structured logs go
//! through `tracing` and are configured separately.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::session::FixSession;

/// Error lines are cut to this many characters.
pub const MAX_ERROR_CHARS: usize = 100;

const RULE_WIDTH: usize = 50;

/// Kind of operator line; selects the icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Info,
    Success,
    Warning,
    Error,
    Fix,
}

impl LogKind {
    pub fn icon(&self) -> &'static str {
        match self {
            LogKind::Info => "ℹ️",
            LogKind::Success => "✅",
            LogKind::Warning => "⚠️",
            LogKind::Error => "❌",
            LogKind::Fix => "🔧",
        }
    }
}

/// Destination for operator lines: stdout, or an in-memory buffer.
#[derive(Debug, Default)]
pub struct Console {
    buffer: Option<Mutex<Vec<String>>>,
}

impl Console {
    /// Console that prints to stdout.
    pub fn stdout() -> Self {
        Self { buffer: None }
    }

    /// Console that keeps lines in memory (see [`Console::lines`]).
    pub fn buffered() -> Self {
        Self {
            buffer: Some(Mutex::new(Vec::new())),
        }
    }

    /// Emit an icon-prefixed line.
    pub fn log(&self, kind: LogKind, message: &str) {
        self.line(&format!("{} {}", kind.icon(), message));
    }

    /// Emit a raw line.
    pub fn line(&self, text: &str) {
        match &self.buffer {
            Some(buffer) => {
                if let Ok(mut lines) = buffer.lock() {
                    lines.push(text.to_string());
                }
            }
            None => println!("{}", text),
        }
    }

    /// Buffered lines; always empty for a stdout console.
    pub fn lines(&self) -> Vec<String> {
        self.buffer
            .as_ref()
            .and_then(|b| b.lock().ok().map(|lines| lines.clone()))
            .unwrap_or_default()
    }
}

/// Process exit status of a full run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    Success,
    Failure,
}

impl ExitStatus {
    /// `Success` iff the session's error sequence is empty.
    pub fn from_session(session: &FixSession) -> Self {
        if session.is_clean() {
            ExitStatus::Success
        } else {
            ExitStatus::Failure
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failure => 1,
        }
    }
}

/// Cut `message` to at most `max` characters.
pub fn truncate_message(message: &str, max: usize) -> String {
    message.chars().take(max).collect()
}

/// Renders the session to the operator.
pub struct Reporter<'a> {
    console: &'a Console,
}

impl<'a> Reporter<'a> {
    pub fn new(console: &'a Console) -> Self {
        Self { console }
    }

    /// Separator and the list of applied fixes.
    pub fn report_fixes(&self, session: &FixSession) {
        self.console.line("");
        self.console.line(&"=".repeat(RULE_WIDTH));

        let fixes = session.fixes();
        if fixes.is_empty() {
            self.console.log(LogKind::Success, "No issues found to fix!");
            return;
        }

        self.console
            .log(LogKind::Success, &format!("Fixed {} issues:", fixes.len()));
        for fix in fixes {
            self.console.line(&format!("  - {}", fix));
        }
    }

    /// Unresolved errors (truncated) and the resulting exit status.
    pub fn report_errors(&self, session: &FixSession) -> ExitStatus {
        let errors = session.errors();
        if !errors.is_empty() {
            self.console.log(
                LogKind::Error,
                &format!("{} errors could not be auto-fixed:", errors.len()),
            );
            for error in errors {
                self.console.line(&format!(
                    "  - {}",
                    truncate_message(error, MAX_ERROR_CHARS)
                ));
            }
        }
        ExitStatus::from_session(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{ActionOutcome, FixAction};

    fn session_with(fixes: &[&str], errors: &[&str]) -> FixSession {
        let mut session = FixSession::new();
        for fix in fixes {
            session = session.record(
                FixAction::LintFix,
                ActionOutcome::Applied {
                    description: fix.to_string(),
                },
            );
        }
        for error in errors {
            session = session.with_error(*error);
        }
        session
    }

    #[test]
    fn test_icons() {
        assert_eq!(LogKind::Success.icon(), "✅");
        assert_eq!(LogKind::Fix.icon(), "🔧");
    }

    #[test]
    fn test_console_buffers_prefixed_lines() {
        let console = Console::buffered();
        console.log(LogKind::Warning, "Missing amplify_outputs.json");
        assert_eq!(console.lines(), vec!["⚠️ Missing amplify_outputs.json"]);
    }

    #[test]
    fn test_truncate_message_is_char_safe() {
        let long = "é".repeat(150);
        let cut = truncate_message(&long, MAX_ERROR_CHARS);
        assert_eq!(cut.chars().count(), 100);
        assert_eq!(truncate_message("short", MAX_ERROR_CHARS), "short");
    }

    #[test]
    fn test_report_fixes_lists_descriptions() {
        let console = Console::buffered();
        let session = session_with(&["Fixed linting issues", "Fixed formatting"], &[]);
        Reporter::new(&console).report_fixes(&session);

        let lines = console.lines();
        assert!(lines.contains(&"✅ Fixed 2 issues:".to_string()));
        assert!(lines.contains(&"  - Fixed linting issues".to_string()));
        assert!(lines.contains(&"  - Fixed formatting".to_string()));
    }

    #[test]
    fn test_report_fixes_when_empty() {
        let console = Console::buffered();
        Reporter::new(&console).report_fixes(&FixSession::new());
        assert!(console
            .lines()
            .contains(&"✅ No issues found to fix!".to_string()));
    }

    #[test]
    fn test_report_errors_truncates_and_fails() {
        let console = Console::buffered();
        let long = "x".repeat(250);
        let session = session_with(&[], &[long.as_str()]);

        let status = Reporter::new(&console).report_errors(&session);
        assert_eq!(status, ExitStatus::Failure);
        assert_eq!(status.code(), 1);

        let lines = console.lines();
        assert_eq!(lines[0], "❌ 1 errors could not be auto-fixed:");
        assert_eq!(lines[1], format!("  - {}", "x".repeat(100)));
    }

    #[test]
    fn test_exit_status_zero_iff_no_errors() {
        assert_eq!(
            ExitStatus::from_session(&session_with(&["Fixed formatting"], &[])).code(),
            0
        );
        assert_eq!(
            ExitStatus::from_session(&session_with(&[], &["boom"])).code(),
            1
        );
    }
}
