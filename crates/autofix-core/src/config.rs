//! Run configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AutofixError, Result};

/// Environment variable that marks a continuous-integration run.
pub const CI_ENV_VAR: &str = "CI";

/// Configuration for one orchestration run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutofixConfig {
    /// Workspace root every command runs in.
    pub workspace: PathBuf,

    /// Per-command wall-clock timeout in seconds (0 = unbounded).
    pub timeout_secs: u64,

    /// Generated deployment configuration file, relative to the workspace.
    pub generated_config_file: String,

    /// Directory holding CI workflow definitions, relative to the workspace.
    pub workflows_dir: PathBuf,

    /// Branch passed to the config generator.
    pub deploy_branch: String,

    /// Whether the run executes inside CI (gates the commit step).
    pub ci: bool,
}

impl Default for AutofixConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            timeout_secs: 300,
            generated_config_file: "amplify_outputs.json".to_string(),
            workflows_dir: PathBuf::from(".github/workflows"),
            deploy_branch: "main".to_string(),
            ci: false,
        }
    }
}

impl AutofixConfig {
    /// Default configuration rooted at `workspace`, with the CI flag read
    /// from the process environment.
    pub fn from_env(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
            ci: ci_flag_from_env(),
            ..Default::default()
        }
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn generated_config_path(&self) -> PathBuf {
        self.workspace.join(&self.generated_config_file)
    }

    pub fn workflows_path(&self) -> PathBuf {
        self.workspace.join(&self.workflows_dir)
    }

    /// Reject configurations the orchestrator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.workspace.is_dir() {
            return Err(AutofixError::WorkspaceNotFound(self.workspace.clone()));
        }
        if self.generated_config_file.trim().is_empty() {
            return Err(AutofixError::InvalidConfig(
                "generated config file name must not be empty".to_string(),
            ));
        }
        if Path::new(&self.generated_config_file).is_absolute() {
            return Err(AutofixError::InvalidConfig(format!(
                "generated config file must be relative to the workspace: {}",
                self.generated_config_file
            )));
        }
        if self.deploy_branch.trim().is_empty() {
            return Err(AutofixError::InvalidConfig(
                "deploy branch must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Read the CI flag from [`CI_ENV_VAR`].
pub fn ci_flag_from_env() -> bool {
    std::env::var(CI_ENV_VAR)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

/// Boolean-like environment value: set, non-empty, and not `false` or `0`.
pub fn is_truthy(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && !value.eq_ignore_ascii_case("false") && value != "0"
}
