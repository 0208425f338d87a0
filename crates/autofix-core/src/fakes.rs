//! In-memory [`CommandRunner`] for tests.
//!
//! `ScriptedRunner` answers each command from a list of rules matched
//! against the command line, and records every invocation.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::runner::{CommandRunner, CommandSpec, ExecutionOutcome, ToolAvailability};

/// Successful outcome with `output`.
pub fn succeeded(output: &str) -> ExecutionOutcome {
    ExecutionOutcome::Succeeded {
        output: output.to_string(),
    }
}

/// Failed outcome with no captured output.
pub fn failed(message: &str) -> ExecutionOutcome {
    failed_with_output("", message)
}

/// Failed outcome that still captured some output.
pub fn failed_with_output(output: &str, message: &str) -> ExecutionOutcome {
    ExecutionOutcome::Failed {
        output: output.to_string(),
        message: message.to_string(),
    }
}

/// Scripted command runner. Unmatched commands get the default outcome
/// (an empty success unless overridden).
#[derive(Debug)]
pub struct ScriptedRunner {
    rules: Vec<(String, ExecutionOutcome)>,
    missing: HashSet<String>,
    default: ExecutionOutcome,
    calls: Mutex<Vec<CommandSpec>>,
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            missing: HashSet::new(),
            default: succeeded(""),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands whose rendered command line contains `pattern`.
    /// Earlier rules win.
    pub fn on(mut self, pattern: &str, outcome: ExecutionOutcome) -> Self {
        self.rules.push((pattern.to_string(), outcome));
        self
    }

    /// Outcome for commands no rule matches.
    pub fn with_default(mut self, outcome: ExecutionOutcome) -> Self {
        self.default = outcome;
        self
    }

    /// Treat `program` as not installed.
    pub fn without_program(mut self, program: &str) -> Self {
        self.missing.insert(program.to_string());
        self
    }

    /// Every command executed so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any executed command line contains `pattern`.
    pub fn was_called(&self, pattern: &str) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|c| c.to_string().contains(pattern))
    }

    /// Index of the first executed command containing `pattern`.
    pub fn position(&self, pattern: &str) -> Option<usize> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .position(|c| c.to_string().contains(pattern))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn execute(&self, command: &CommandSpec) -> ExecutionOutcome {
        self.calls.lock().unwrap().push(command.clone());

        if self.missing.contains(&command.program) {
            return ExecutionOutcome::Unavailable {
                program: command.program.clone(),
            };
        }

        let line = command.to_string();
        self.rules
            .iter()
            .find(|(pattern, _)| line.contains(pattern.as_str()))
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| self.default.clone())
    }

    async fn probe(&self, program: &str) -> ToolAvailability {
        if self.missing.contains(program) {
            ToolAvailability::Unavailable
        } else {
            ToolAvailability::Available
        }
    }
}
