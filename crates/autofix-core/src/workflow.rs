//! Deployment identifier extraction from CI workflow definitions.
//!
//! Best-effort heuristic: the first `app-id: <token>` found across the
//! workflow files (sorted by name) wins. The token shape is not validated.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Result of searching workflow files for a deployment identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowScan {
    /// Identifier found in `source`.
    Found { app_id: String, source: PathBuf },

    /// Workflow files were readable but none contained an identifier.
    NotFound,

    /// The workflow directory could not be read.
    Unavailable { reason: String },
}

impl WorkflowScan {
    pub fn app_id(&self) -> Option<&str> {
        match self {
            WorkflowScan::Found { app_id, .. } => Some(app_id),
            _ => None,
        }
    }
}

const APP_ID_PATTERN: &str = r"app-id[\s:]+([\w-]+)";

fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(pattern = pattern, error = %e, "identifier pattern failed to compile");
            None
        }
    }
}

fn app_id_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| compile_pattern(APP_ID_PATTERN)).as_ref()
}

/// Extract the first deployment identifier from workflow text.
pub fn extract_app_id(text: &str) -> Option<String> {
    app_id_pattern()?
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Search `*.yml` / `*.yaml` files directly under `workflows_dir`.
pub fn scan_workflows(workflows_dir: &Path) -> WorkflowScan {
    let entries = match std::fs::read_dir(workflows_dir) {
        Ok(entries) => entries,
        Err(e) => {
            return WorkflowScan::Unavailable {
                reason: format!("cannot read {}: {}", workflows_dir.display(), e),
            };
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_workflow_file(path))
        .collect();
    files.sort();

    for path in files {
        // Unreadable or non-UTF-8 files are skipped.
        let Ok(text) = std::fs::read_to_string(&path) else {
            debug!(path = %path.display(), "skipping unreadable workflow file");
            continue;
        };
        if let Some(app_id) = extract_app_id(&text) {
            return WorkflowScan::Found {
                app_id,
                source: path,
            };
        }
    }

    WorkflowScan::NotFound
}

fn is_workflow_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_pattern_compiles() {
        assert!(app_id_pattern().is_some());
        assert!(compile_pattern("app-id[").is_none());
    }

    #[test]
    fn test_extract_app_id_colon_form() {
        let text = "steps:\n  - uses: deploy\n    with:\n      app-id: abc123\n";
        assert_eq!(extract_app_id(text), Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_app_id_takes_first_match() {
        let text = "app-id: first-id\napp-id: second-id\n";
        assert_eq!(extract_app_id(text), Some("first-id".to_string()));
    }

    #[test]
    fn test_extract_app_id_absent() {
        assert_eq!(extract_app_id("name: build\non: push\n"), None);
    }

    #[test]
    fn test_scan_missing_dir_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let scan = scan_workflows(&dir.path().join(".github/workflows"));
        assert!(matches!(scan, WorkflowScan::Unavailable { .. }));
        assert!(scan.app_id().is_none());
    }

    #[test]
    fn test_scan_finds_identifier_in_sorted_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b-deploy.yml"), "app-id: from-b\n").unwrap();
        std::fs::write(dir.path().join("a-deploy.yaml"), "app-id: from-a\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "app-id: ignored\n").unwrap();

        let scan = scan_workflows(dir.path());
        assert_eq!(scan.app_id(), Some("from-a"));
    }

    #[test]
    fn test_scan_without_identifier() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ci.yml"), "name: ci\n").unwrap();
        assert_eq!(scan_workflows(dir.path()), WorkflowScan::NotFound);
    }
}
