// src/rules/placement.rs
//! File-placement check.
//!
//! "file pattern → expected directory" rules are derived from constraint
//! sentences, or inferred from a decision's own evidence locations when it
//! constrains the naming of a file type. Newly added files matching a rule's
//! pattern but landing outside every expected directory get a warning.

use std::sync::OnceLock;

use regex::Regex;

use crate::paths;
use crate::types::{ChangeStatus, Decision, FileChange, Severity, Violation};

#[derive(Debug)]
enum FilePattern {
    /// A glob like `*.test.ts`, compiled to an anchored regex.
    Glob { raw: String, matcher: Regex },
    /// A bare file-type token like `service`: matched by name containment.
    Token(String),
}

#[derive(Debug)]
pub(crate) struct PlacementRule {
    pattern: FilePattern,
    expected: Vec<String>,
    decision: String,
}

fn matching_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)files\s+matching\s+['"]?([^\s'"]+)['"]?\s+(?:should|must)\s+(?:be|live|go)\s+(?:in|under)\s+['"]?([^\s'".,;]+)"#,
        )
        .expect("placement matching pattern is hardcoded")
    })
}

fn keep_in_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"(?i)\b(?:place|put|keep)\s+([a-z][a-z0-9_-]*)\s+files?\s+in\s+['"]?([^\s'".,;]+)"#,
        )
        .expect("placement keep-in pattern is hardcoded")
    })
}

fn typed_naming_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b([a-z][a-z0-9_-]*)\s+files?\s+(?:should|must)\s+(?:be\s+named|use|follow)")
            .expect("typed naming pattern is hardcoded")
    })
}

pub(crate) fn compile(decisions: &[Decision]) -> Vec<PlacementRule> {
    let mut rules = Vec::new();

    for decision in decisions {
        for constraint in &decision.constraints {
            if let Some(caps) = matching_pattern().captures(constraint) {
                if let Some(matcher) = glob_to_regex(&caps[1]) {
                    rules.push(PlacementRule {
                        pattern: FilePattern::Glob { raw: caps[1].to_string(), matcher },
                        expected: vec![paths::normalize(&caps[2])],
                        decision: decision.title.clone(),
                    });
                }
                continue;
            }
            if let Some(caps) = keep_in_pattern().captures(constraint) {
                rules.push(PlacementRule {
                    pattern: FilePattern::Token(caps[1].to_ascii_lowercase()),
                    expected: vec![paths::normalize(&caps[2])],
                    decision: decision.title.clone(),
                });
                continue;
            }
            // A naming-style constraint on a file type pins that type to the
            // directories its decision's evidence lives in.
            if let Some(caps) = typed_naming_pattern().captures(constraint) {
                let expected = evidence_dirs(&decision.evidence);
                if !expected.is_empty() {
                    rules.push(PlacementRule {
                        pattern: FilePattern::Token(caps[1].to_ascii_lowercase()),
                        expected,
                        decision: decision.title.clone(),
                    });
                }
            }
        }
    }

    rules
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

/// Translates a filename glob into an anchored regex; only `*` is special.
fn glob_to_regex(glob: &str) -> Option<Regex> {
    let escaped: Vec<String> = glob.split('*').map(|part| regex::escape(part)).collect();
    Regex::new(&format!("^{}$", escaped.join(".*"))).ok()
}

pub(crate) fn check(
    rules: &[PlacementRule],
    changes: &[FileChange],
    violations: &mut Vec<Violation>,
) {
    for change in changes {
        if change.status != ChangeStatus::Added {
            continue;
        }
        let path = paths::normalize(&change.path);
        let name = paths::basename(&path);

        for rule in rules {
            if !matches_pattern(&rule.pattern, &path, name) {
                continue;
            }
            if rule.expected.iter().any(|dir| paths::is_under(&path, dir)) {
                continue;
            }
            violations.push(Violation {
                rule: "file-placement".to_string(),
                severity: Severity::Warning,
                message: format!(
                    "'{name}' matches {} but sits outside {}",
                    describe_pattern(&rule.pattern),
                    rule.expected.join(", ")
                ),
                file: change.path.clone(),
                line: None,
                suggestion: Some(format!("Move the file under '{}'", rule.expected[0])),
                decision: Some(rule.decision.clone()),
            });
        }
    }
}

fn matches_pattern(pattern: &FilePattern, path: &str, name: &str) -> bool {
    match pattern {
        FilePattern::Glob { raw, matcher } => {
            // Patterns with a separator match the whole path, bare ones the name.
            if raw.contains('/') {
                matcher.is_match(path)
            } else {
                matcher.is_match(name)
            }
        }
        FilePattern::Token(token) => name.to_ascii_lowercase().contains(token.as_str()),
    }
}

fn describe_pattern(pattern: &FilePattern) -> String {
    match pattern {
        FilePattern::Glob { raw, .. } => format!("pattern '{raw}'"),
        FilePattern::Token(token) => format!("'{token}' files"),
    }
}
