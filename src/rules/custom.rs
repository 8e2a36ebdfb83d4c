// src/rules/custom.rs
//! User-defined custom rules.
//!
//! Each rule flags added lines matching its regex, constrained by optional
//! directory allow/deny lists. A rule whose regex fails to compile is skipped
//! with a warning; the rest of the batch proceeds.

use regex::Regex;
use tracing::warn;

use crate::paths;
use crate::types::{ChangeStatus, CustomRule, FileChange, Violation};

#[derive(Debug)]
pub(crate) struct CompiledCustomRule {
    name: String,
    matcher: Regex,
    allowed_in: Vec<String>,
    not_allowed_in: Vec<String>,
    severity: crate::types::Severity,
}

pub(crate) fn compile(rules: &[CustomRule]) -> Vec<CompiledCustomRule> {
    rules
        .iter()
        .filter_map(|rule| match Regex::new(&rule.pattern) {
            Ok(matcher) => Some(CompiledCustomRule {
                name: rule.name.clone(),
                matcher,
                allowed_in: rule.allowed_in.iter().map(|d| paths::normalize(d)).collect(),
                not_allowed_in: rule.not_allowed_in.iter().map(|d| paths::normalize(d)).collect(),
                severity: rule.severity,
            }),
            Err(err) => {
                warn!(rule = %rule.name, %err, "custom rule regex failed to compile; rule skipped");
                None
            }
        })
        .collect()
}

pub(crate) fn check(
    rules: &[CompiledCustomRule],
    changes: &[FileChange],
    violations: &mut Vec<Violation>,
) {
    for change in changes {
        if change.status == ChangeStatus::Deleted {
            continue;
        }
        let path = paths::normalize(&change.path);

        for rule in rules {
            for added in &change.added_lines {
                if !rule.matcher.is_match(&added.text) {
                    continue;
                }
                if !placement_forbidden(rule, &path) {
                    continue;
                }
                violations.push(Violation {
                    rule: format!("custom:{}", rule.name),
                    severity: rule.severity,
                    message: format!(
                        "Line matches rule '{}' in a disallowed location",
                        rule.name
                    ),
                    file: change.path.clone(),
                    line: Some(added.line),
                    suggestion: suggestion_for(rule),
                    decision: None,
                });
            }
        }
    }
}

/// A match violates the rule when the file sits inside a denied directory,
/// or outside every allowed directory when an allow-list is configured.
fn placement_forbidden(rule: &CompiledCustomRule, path: &str) -> bool {
    if rule.not_allowed_in.iter().any(|dir| paths::is_under(path, dir)) {
        return true;
    }
    !rule.allowed_in.is_empty() && !rule.allowed_in.iter().any(|dir| paths::is_under(path, dir))
}

fn suggestion_for(rule: &CompiledCustomRule) -> Option<String> {
    if rule.allowed_in.is_empty() {
        None
    } else {
        Some(format!("Only allowed under: {}", rule.allowed_in.join(", ")))
    }
}
