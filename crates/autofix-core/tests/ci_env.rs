//! The `CI` environment variable drives the commit decision.
//!
//! Kept in its own test binary, and in a single test, because it mutates
//! process environment.

use std::sync::Arc;

use autofix_core::config::{ci_flag_from_env, CI_ENV_VAR};
use autofix_core::fakes::ScriptedRunner;
use autofix_core::{AutoFixer, AutofixConfig, CommitOutcome, Console};

async fn run_with_env_ci() -> Option<CommitOutcome> {
    let dir = tempfile::tempdir().unwrap();
    let runner = Arc::new(ScriptedRunner::new());
    let config = AutofixConfig {
        workspace: dir.path().to_path_buf(),
        ci: ci_flag_from_env(),
        ..Default::default()
    };
    let mut fixer = AutoFixer::new(runner, config).with_console(Console::buffered());
    fixer.run().await.expect("run failed").commit
}

/// Test: `CI` set, unset and falsy values map onto the commit decision
#[tokio::test]
async fn test_ci_env_var_controls_commit() {
    let previous = std::env::var_os(CI_ENV_VAR);

    std::env::remove_var(CI_ENV_VAR);
    assert!(!ci_flag_from_env());
    assert!(run_with_env_ci().await.is_none());

    std::env::set_var(CI_ENV_VAR, "false");
    assert!(!ci_flag_from_env());
    assert!(run_with_env_ci().await.is_none());

    std::env::set_var(CI_ENV_VAR, "0");
    assert!(!ci_flag_from_env());

    std::env::set_var(CI_ENV_VAR, "");
    assert!(!ci_flag_from_env());

    std::env::set_var(CI_ENV_VAR, "true");
    assert!(ci_flag_from_env());
    // The scripted git reports a clean tree after staging.
    assert_eq!(run_with_env_ci().await, Some(CommitOutcome::NothingToCommit));

    std::env::set_var(CI_ENV_VAR, "1");
    assert!(ci_flag_from_env());

    match previous {
        Some(value) => std::env::set_var(CI_ENV_VAR, value),
        None => std::env::remove_var(CI_ENV_VAR),
    }
}
