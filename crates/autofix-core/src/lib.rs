//! Autofix Core - workspace remediation orchestration
//!
//! Provides an orchestrator that:
//! - Runs lint, format, vulnerability, type-error and deployment-config repairs in a fixed order
//! - Records applied fixes and unresolved errors in a session
//! - Reports the session and derives the process exit status
//! - Commits the changes when running under CI

pub mod action;
pub mod commit;
pub mod config;
pub mod error;
pub mod fakes;
pub mod obs;
pub mod orchestrator;
pub mod reporter;
pub mod runner;
pub mod session;
pub mod telemetry;
pub mod workflow;

// Re-export key types
pub use action::{ActionContext, ActionOutcome, FixAction, ReportingPolicy};
pub use commit::{commit_message, CommitDecision, CommitOutcome, Committer};
pub use config::AutofixConfig;
pub use error::{AutofixError, Result};
pub use orchestrator::{AutoFixer, FixerState, RunReport};
pub use reporter::{Console, ExitStatus, LogKind, Reporter};
pub use runner::{CommandRunner, CommandSpec, ExecutionOutcome, ProcessRunner, ToolAvailability};
pub use session::FixSession;
pub use telemetry::init_tracing;
pub use workflow::{extract_app_id, scan_workflows, WorkflowScan};
