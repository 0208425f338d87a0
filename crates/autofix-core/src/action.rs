//! Fix action definitions and procedures.
//!
//! Each action builds its command(s), runs them through the
//! [`CommandRunner`], and folds the result into a single [`ActionOutcome`].
//! Actions never see the session and never depend on each other's results.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AutofixConfig;
use crate::reporter::{Console, LogKind};
use crate::runner::{CommandRunner, CommandSpec, ExecutionOutcome};
use crate::workflow::{scan_workflows, WorkflowScan};

/// Type-checker message class that triggers the import-resolution pass.
pub const MISSING_SYMBOL_MARKER: &str = "Cannot find name";

/// Whether a failed command surfaces in the session's error sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReportingPolicy {
    /// Failure is discarded; the run proceeds as if nothing happened.
    Suppressed,

    /// Failure message is retained and escalates the exit status.
    Reported,
}

impl ReportingPolicy {
    /// Message to record for `outcome` under this policy, if any.
    pub fn surface(&self, outcome: &ExecutionOutcome) -> Option<String> {
        match self {
            ReportingPolicy::Suppressed => None,
            ReportingPolicy::Reported => outcome.failure_message(),
        }
    }
}

/// The fixed set of remediation actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FixAction {
    /// npx eslint . --fix --ext .js,.jsx,.ts,.tsx
    LintFix,

    /// npx prettier --write "**/*.{js,jsx,ts,tsx,css,md,json}" --ignore-path .gitignore
    FormatFix,

    /// npm audit fix
    VulnerabilityFix,

    /// npx tsc --noEmit --pretty false, then an import-resolution lint pass
    TypeErrorTriage,

    /// npx ampx generate outputs when the generated config is missing
    DeploymentConfigRepair,
}

impl FixAction {
    /// Execution order. Also the order of the session's success sequence.
    pub const ORDER: [FixAction; 5] = [
        FixAction::LintFix,
        FixAction::FormatFix,
        FixAction::VulnerabilityFix,
        FixAction::TypeErrorTriage,
        FixAction::DeploymentConfigRepair,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FixAction::LintFix => "lint_fix",
            FixAction::FormatFix => "format_fix",
            FixAction::VulnerabilityFix => "vulnerability_fix",
            FixAction::TypeErrorTriage => "type_error_triage",
            FixAction::DeploymentConfigRepair => "deployment_config_repair",
        }
    }

    /// Operator line printed when the action starts.
    pub fn announcement(&self) -> &'static str {
        match self {
            FixAction::LintFix => "Fixing linting issues...",
            FixAction::FormatFix => "Fixing formatting...",
            FixAction::VulnerabilityFix => "Fixing npm vulnerabilities...",
            FixAction::TypeErrorTriage => "Fixing TypeScript errors...",
            FixAction::DeploymentConfigRepair => "Checking Amplify configuration...",
        }
    }

    pub fn policy(&self) -> ReportingPolicy {
        match self {
            FixAction::DeploymentConfigRepair => ReportingPolicy::Reported,
            _ => ReportingPolicy::Suppressed,
        }
    }

    /// The action's primary command. The config generator is parameterized
    /// by the discovered identifier, see [`generate_config_command`].
    pub fn command(&self) -> Option<CommandSpec> {
        match self {
            FixAction::LintFix => Some(CommandSpec::new(
                "npx",
                ["eslint", ".", "--fix", "--ext", ".js,.jsx,.ts,.tsx"],
            )),
            FixAction::FormatFix => Some(CommandSpec::new(
                "npx",
                [
                    "prettier",
                    "--write",
                    "**/*.{js,jsx,ts,tsx,css,md,json}",
                    "--ignore-path",
                    ".gitignore",
                ],
            )),
            FixAction::VulnerabilityFix => Some(CommandSpec::new("npm", ["audit", "fix"])),
            FixAction::TypeErrorTriage => Some(CommandSpec::new(
                "npx",
                ["tsc", "--noEmit", "--pretty", "false"],
            )),
            FixAction::DeploymentConfigRepair => None,
        }
    }

    /// Programs this action may launch.
    pub fn programs(&self) -> &'static [&'static str] {
        match self {
            FixAction::VulnerabilityFix => &["npm"],
            _ => &["npx"],
        }
    }

    /// Run the action. Infallible: command failures become outcomes.
    pub async fn run(&self, ctx: &ActionContext<'_>) -> ActionOutcome {
        match self {
            FixAction::LintFix => {
                run_single(ctx, *self, "Fixed linting issues", "Linting issues fixed").await
            }
            FixAction::FormatFix => {
                run_single(ctx, *self, "Fixed formatting", "Formatting fixed").await
            }
            FixAction::VulnerabilityFix => {
                run_single(
                    ctx,
                    *self,
                    "Fixed npm vulnerabilities",
                    "Vulnerabilities fixed",
                )
                .await
            }
            FixAction::TypeErrorTriage => triage_type_errors(ctx).await,
            FixAction::DeploymentConfigRepair => repair_deployment_config(ctx).await,
        }
    }
}

/// Import-resolution lint pass used by type-error triage.
pub fn import_fix_command() -> CommandSpec {
    CommandSpec::new(
        "npx",
        ["eslint", ".", "--fix", "--rule", "import/no-unresolved: error"],
    )
}

/// Config generation for a deployment identifier and branch.
pub fn generate_config_command(app_id: &str, branch: &str) -> CommandSpec {
    CommandSpec::new(
        "npx",
        [
            "ampx", "generate", "outputs", "--app-id", app_id, "--branch", branch, "--format",
            "json",
        ],
    )
}

/// What one action contributes to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// A fix was applied; `description` joins the success sequence.
    Applied { description: String },

    /// Nothing to record: no-op, or a suppressed failure.
    Skipped,

    /// A reported failure; `message` joins the error sequence.
    Failed { message: String },

    /// The fix is recorded and its command's reported failure as well.
    AppliedWithError { description: String, message: String },
}

/// Collaborators an action may use.
pub struct ActionContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub config: &'a AutofixConfig,
    pub console: &'a Console,
}

async fn run_single(
    ctx: &ActionContext<'_>,
    action: FixAction,
    description: &str,
    success_line: &str,
) -> ActionOutcome {
    let Some(command) = action.command() else {
        return ActionOutcome::Skipped;
    };

    let outcome = ctx.runner.execute(&command).await;
    if outcome.output().is_some() {
        ctx.console.log(LogKind::Success, success_line);
        return ActionOutcome::Applied {
            description: description.to_string(),
        };
    }

    match action.policy().surface(&outcome) {
        Some(message) => ActionOutcome::Failed { message },
        None => {
            debug!(action = action.name(), outcome = ?outcome, "failure suppressed");
            ActionOutcome::Skipped
        }
    }
}

async fn triage_type_errors(ctx: &ActionContext<'_>) -> ActionOutcome {
    let action = FixAction::TypeErrorTriage;
    let Some(command) = action.command() else {
        return ActionOutcome::Skipped;
    };

    // Type checkers exit non-zero exactly when they report errors, so the
    // captured text is inspected regardless of exit status.
    let outcome = ctx.runner.execute(&command).await;
    let missing_symbols = outcome
        .captured_output()
        .is_some_and(|out| out.contains(MISSING_SYMBOL_MARKER));

    if !missing_symbols {
        return match action.policy().surface(&outcome) {
            Some(message) => ActionOutcome::Failed { message },
            None => ActionOutcome::Skipped,
        };
    }

    // Recorded regardless of the import pass's own result.
    let import_outcome = ctx.runner.execute(&import_fix_command()).await;
    debug!(
        action = action.name(),
        success = import_outcome.is_success(),
        "import-resolution pass finished"
    );

    ActionOutcome::Applied {
        description: "Added missing imports".to_string(),
    }
}

async fn repair_deployment_config(ctx: &ActionContext<'_>) -> ActionOutcome {
    let action = FixAction::DeploymentConfigRepair;
    let file = &ctx.config.generated_config_file;

    if ctx.config.generated_config_path().exists() {
        debug!(file = %file, "generated config present");
        return ActionOutcome::Skipped;
    }

    ctx.console.log(LogKind::Warning, &format!("Missing {}", file));

    let app_id = match scan_workflows(&ctx.config.workflows_path()) {
        WorkflowScan::Found { app_id, source } => {
            debug!(app_id = %app_id, source = %source.display(), "deployment identifier found");
            app_id
        }
        WorkflowScan::NotFound => {
            debug!("no deployment identifier in workflow files");
            return ActionOutcome::Skipped;
        }
        WorkflowScan::Unavailable { reason } => {
            debug!(reason = %reason, "workflow search unavailable");
            return ActionOutcome::Skipped;
        }
    };

    // The fix is recorded once an identifier is found, whatever the
    // generator returns.
    let command = generate_config_command(&app_id, &ctx.config.deploy_branch);
    let outcome = ctx.runner.execute(&command).await;
    let description = format!("Generated {}", file);

    match action.policy().surface(&outcome) {
        Some(message) => ActionOutcome::AppliedWithError {
            description,
            message,
        },
        None => ActionOutcome::Applied { description },
    }
}
