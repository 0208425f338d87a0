//! Autofix - workspace remediation orchestrator
//!
//! Runs the fix actions against a project workspace, reports what was fixed,
//! commits the changes when `CI` is set, and exits non-zero when an error
//! could not be auto-fixed.
//!
//! Invoked with no arguments it uses the current directory and defaults.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, Level};

use autofix_core::config::{ci_flag_from_env, AutofixConfig};
use autofix_core::{AutoFixer, ProcessRunner};

#[derive(Parser, Debug)]
#[command(name = "autofix")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Auto-fix common lint, format, dependency, type and deployment issues", long_about = None)]
struct Cli {
    /// Workspace root to repair
    #[arg(long, env = "AUTOFIX_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    /// Per-command timeout in seconds (0 disables the bound)
    #[arg(long, env = "AUTOFIX_TIMEOUT_SECS", default_value_t = 300)]
    timeout_secs: u64,

    /// Branch passed to the deployment config generator
    #[arg(long, env = "AUTOFIX_BRANCH", default_value = "main")]
    branch: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn to_config(&self) -> AutofixConfig {
        AutofixConfig {
            workspace: self.workspace.clone(),
            timeout_secs: self.timeout_secs,
            deploy_branch: self.branch.clone(),
            ci: ci_flag_from_env(),
            ..Default::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    autofix_core::init_tracing(cli.json, level);

    match run(&cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Auto-fix failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<ExitCode> {
    let config = cli.to_config();
    debug!(config = ?config, "resolved configuration");

    let runner = Arc::new(
        ProcessRunner::new(config.workspace.clone()).with_timeout(config.command_timeout()),
    );
    let mut fixer = AutoFixer::new(runner.clone(), config);

    let report = fixer
        .run()
        .await
        .context("auto-fix orchestration aborted")?;

    debug!(
        command_failures = runner.failures().len(),
        "runner diagnostics"
    );

    Ok(ExitCode::from(report.exit_status.code() as u8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_uses_defaults() {
        let cli = Cli::try_parse_from(["autofix"]).expect("parse");
        let config = cli.to_config();
        assert_eq!(config.workspace, PathBuf::from("."));
        assert_eq!(config.deploy_branch, "main");
        assert_eq!(config.generated_config_file, "amplify_outputs.json");
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "autofix",
            "--workspace",
            "/srv/app",
            "--timeout-secs",
            "0",
            "--branch",
            "release",
        ])
        .expect("parse");
        let config = cli.to_config();
        assert_eq!(config.workspace, PathBuf::from("/srv/app"));
        assert_eq!(config.timeout_secs, 0);
        assert_eq!(config.deploy_branch, "release");
    }

    // The only test in this binary that touches `CI`.
    #[test]
    fn test_ci_flag_read_from_environment() {
        let previous = std::env::var_os("CI");
        let cli = Cli::try_parse_from(["autofix"]).expect("parse");

        std::env::set_var("CI", "true");
        assert!(cli.to_config().ci);

        std::env::set_var("CI", "false");
        assert!(!cli.to_config().ci);

        std::env::remove_var("CI");
        assert!(!cli.to_config().ci);

        match previous {
            Some(value) => std::env::set_var("CI", value),
            None => std::env::remove_var("CI"),
        }
    }

    #[tokio::test]
    async fn test_missing_workspace_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let cli = Cli::try_parse_from(["autofix", "--workspace", missing.to_str().unwrap()])
            .expect("parse");

        let err = run(&cli).await.expect_err("should abort");
        assert!(format!("{:#}", err).contains("workspace not found"));
    }
}
