// src/rules/naming.rs
//! Naming-convention check.
//!
//! Constraints declaring an explicit casing style or a required suffix are
//! scoped to the directories of their decision's evidence and validated
//! against added/modified file base names. Conventions the parser does not
//! recognize never flag anything — this check fails open.

use std::sync::OnceLock;

use regex::Regex;

use crate::paths;
use crate::types::{ChangeStatus, Decision, FileChange, Severity, Violation};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Convention {
    Kebab,
    Camel,
    Pascal,
    Snake,
    Suffix(String),
}

impl Convention {
    fn label(&self) -> String {
        match self {
            Self::Kebab => "kebab-case".to_string(),
            Self::Camel => "camelCase".to_string(),
            Self::Pascal => "PascalCase".to_string(),
            Self::Snake => "snake_case".to_string(),
            Self::Suffix(suffix) => format!("a '{suffix}' suffix"),
        }
    }

    fn matches(&self, stem: &str) -> bool {
        match self {
            Self::Kebab => casing_regex(&KEBAB, r"^[a-z0-9]+(?:-[a-z0-9]+)*$").is_match(stem),
            Self::Snake => casing_regex(&SNAKE, r"^[a-z0-9]+(?:_[a-z0-9]+)*$").is_match(stem),
            Self::Camel => casing_regex(&CAMEL, r"^[a-z][a-zA-Z0-9]*$").is_match(stem),
            Self::Pascal => casing_regex(&PASCAL, r"^[A-Z][a-zA-Z0-9]*$").is_match(stem),
            Self::Suffix(suffix) => stem.ends_with(suffix.as_str()),
        }
    }
}

static KEBAB: OnceLock<Regex> = OnceLock::new();
static SNAKE: OnceLock<Regex> = OnceLock::new();
static CAMEL: OnceLock<Regex> = OnceLock::new();
static PASCAL: OnceLock<Regex> = OnceLock::new();

fn casing_regex(cell: &'static OnceLock<Regex>, pattern: &'static str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("casing pattern is hardcoded"))
}

#[derive(Debug)]
pub(crate) struct NamingRule {
    convention: Convention,
    /// Directories the rule applies to; empty scope applies everywhere.
    scope: Vec<String>,
    decision: String,
}

fn suffix_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?i)(?:suffix|end(?:s|ing)?\s+with)\s+['"]?([A-Za-z0-9_.-]+)"#)
            .expect("suffix pattern is hardcoded")
    })
}

pub(crate) fn compile(decisions: &[Decision]) -> Vec<NamingRule> {
    let mut rules = Vec::new();

    for decision in decisions {
        for constraint in &decision.constraints {
            let Some(convention) = parse_convention(constraint) else {
                continue;
            };
            rules.push(NamingRule {
                convention,
                scope: evidence_dirs(&decision.evidence),
                decision: decision.title.clone(),
            });
        }
    }

    rules
}

fn parse_convention(constraint: &str) -> Option<Convention> {
    let lower = constraint.to_ascii_lowercase();
    if lower.contains("kebab-case") || lower.contains("kebab case") {
        return Some(Convention::Kebab);
    }
    if lower.contains("snake_case") || lower.contains("snake case") {
        return Some(Convention::Snake);
    }
    if lower.contains("camelcase") || lower.contains("camel case") {
        return Some(Convention::Camel);
    }
    if lower.contains("pascalcase") || lower.contains("pascal case") {
        return Some(Convention::Pascal);
    }
    suffix_pattern()
        .captures(constraint)
        .map(|caps| Convention::Suffix(caps[1].to_string()))
}

fn evidence_dirs(evidence: &[String]) -> Vec<String> {
    let mut dirs: Vec<String> = Vec::new();
    for path in evidence {
        let dir = paths::dirname(&paths::normalize(path)).to_string();
        if !dir.is_empty() && !dirs.contains(&dir) {
            dirs.push(dir);
        }
    }
    dirs
}

pub(crate) fn check(rules: &[NamingRule], changes: &[FileChange], violations: &mut Vec<Violation>) {
    for change in changes {
        if !matches!(change.status, ChangeStatus::Added | ChangeStatus::Modified) {
            continue;
        }
        let path = paths::normalize(&change.path);
        let name = paths::basename(&path);
        let stem = name.split('.').next().unwrap_or(name);

        for rule in rules {
            let in_scope =
                rule.scope.is_empty() || rule.scope.iter().any(|dir| paths::is_under(&path, dir));
            if !in_scope || rule.convention.matches(stem) {
                continue;
            }
            violations.push(Violation {
                rule: "naming-convention".to_string(),
                severity: Severity::Warning,
                message: format!("'{name}' does not follow {}", rule.convention.label()),
                file: change.path.clone(),
                line: None,
                suggestion: Some(format!("Rename to match {}", rule.convention.label())),
                decision: Some(rule.decision.clone()),
            });
        }
    }
}
