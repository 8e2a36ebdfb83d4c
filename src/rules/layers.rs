// src/rules/layers.rs
//! Import-direction check.
//!
//! Forbidden layer edges come from decision constraint sentences of the shape
//! "`<layer>` must not import `<layer>`". Absent any such sentence, a default
//! table applies, restricted to layer pairs whose conventional directory
//! names actually co-occur in the decisions' evidence — this keeps the
//! defaults quiet on codebases that don't follow layered naming.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use super::RuleReport;
use crate::paths;
use crate::types::{ChangeStatus, Decision, FileChange, Severity, Violation};

/// "`<from>` may not import `<to>`".
#[derive(Debug, Clone, Serialize)]
pub struct ForbiddenEdge {
    pub from: String,
    pub to: String,
    /// Title of the decision the edge was parsed from; `None` for defaults.
    pub decision: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct LayerRules {
    forbidden: Vec<ForbiddenEdge>,
    layer_names: Vec<String>,
}

impl LayerRules {
    pub(crate) fn forbidden(&self) -> &[ForbiddenEdge] {
        &self.forbidden
    }
}

/// Default forbidden edges between conventionally named layers.
const DEFAULT_FORBIDDEN: &[(&str, &str)] = &[
    ("domain", "infrastructure"),
    ("domain", "presentation"),
    ("domain", "application"),
    ("application", "infrastructure"),
    ("application", "presentation"),
    ("infrastructure", "presentation"),
];

fn constraint_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b([a-z][a-z0-9_-]*)\s+(?:layer\s+)?(?:must\s+not|should\s+not|cannot|may\s+not)\s+(?:import|depend\s+on|use)\s+(?:the\s+)?([a-z][a-z0-9_-]*)",
        )
        .expect("layer constraint pattern is hardcoded")
    })
}

pub(crate) fn compile(decisions: &[Decision]) -> LayerRules {
    let mut forbidden: Vec<ForbiddenEdge> = Vec::new();

    for decision in decisions {
        for constraint in &decision.constraints {
            for caps in constraint_pattern().captures_iter(constraint) {
                forbidden.push(ForbiddenEdge {
                    from: caps[1].to_ascii_lowercase(),
                    to: caps[2].to_ascii_lowercase(),
                    decision: Some(decision.title.clone()),
                });
            }
        }
    }

    if forbidden.is_empty() {
        forbidden = default_edges(decisions);
    }

    let mut layer_names: Vec<String> = Vec::new();
    for edge in &forbidden {
        for name in [&edge.from, &edge.to] {
            if !layer_names.contains(name) {
                layer_names.push(name.clone());
            }
        }
    }

    LayerRules { forbidden, layer_names }
}

/// Defaults apply only to layer pairs whose directory names both appear
/// somewhere in the decisions' evidence paths.
fn default_edges(decisions: &[Decision]) -> Vec<ForbiddenEdge> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    for decision in decisions {
        for evidence in &decision.evidence {
            for (from, to) in DEFAULT_FORBIDDEN {
                if paths::has_segment(evidence, from) {
                    seen.insert(from);
                }
                if paths::has_segment(evidence, to) {
                    seen.insert(to);
                }
            }
        }
    }

    DEFAULT_FORBIDDEN
        .iter()
        .filter(|(from, to)| seen.contains(from) && seen.contains(to))
        .map(|(from, to)| ForbiddenEdge {
            from: (*from).to_string(),
            to: (*to).to_string(),
            decision: None,
        })
        .collect()
}

pub(crate) fn check(rules: &LayerRules, changes: &[FileChange], report: &mut RuleReport) {
    if rules.forbidden.is_empty() {
        return;
    }

    for change in changes {
        if change.status == ChangeStatus::Deleted {
            continue;
        }
        let Some(source_layer) = layer_of(&change.path, &rules.layer_names) else {
            continue;
        };

        for added in &change.added_imports {
            let Some(specifier) = extract_specifier(&added.text) else {
                continue;
            };
            let target = specifier_target(&change.path, &specifier);
            let Some(target_layer) = layer_of(&target, &rules.layer_names) else {
                continue;
            };

            let Some(edge) = rules
                .forbidden
                .iter()
                .find(|e| e.from == source_layer && e.to == target_layer)
            else {
                continue;
            };

            report.violations.push(Violation {
                rule: "import-violation".to_string(),
                severity: Severity::Error,
                message: format!(
                    "'{source_layer}' layer must not import from '{target_layer}' layer"
                ),
                file: change.path.clone(),
                line: Some(added.line),
                suggestion: Some(format!(
                    "Invert the dependency: define an abstraction in '{source_layer}' and implement it in '{target_layer}'"
                )),
                decision: edge.decision.clone(),
            });
            report.layer_pairs.push((source_layer.clone(), target_layer.clone()));
        }
    }
}

/// Turns an import specifier into a path-shaped string for layer matching.
/// Slash relatives join against the source directory; Python dotted
/// relatives walk up one directory per extra dot; dotted absolutes map dots
/// to separators.
fn specifier_target(source: &str, specifier: &str) -> String {
    if let Some(rooted) = specifier.strip_prefix('/') {
        return paths::normalize(rooted);
    }
    if specifier.starts_with("./") || specifier.starts_with("../") {
        return paths::join(paths::dirname(source), specifier);
    }
    if specifier.starts_with('.') {
        let dots = specifier.chars().take_while(|c| *c == '.').count();
        let mut dir = paths::dirname(source).to_string();
        for _ in 1..dots {
            dir = paths::dirname(&dir).to_string();
        }
        return paths::join(&dir, &specifier[dots..].replace('.', "/"));
    }
    if specifier.contains('/') {
        paths::normalize(specifier)
    } else {
        paths::normalize(&specifier.replace('.', "/"))
    }
}

/// A file belongs to the first layer whose name appears as a path segment.
fn layer_of(path: &str, layer_names: &[String]) -> Option<String> {
    layer_names
        .iter()
        .find(|name| paths::has_segment(path, name))
        .cloned()
}

/// Pulls the module specifier out of an added import line. Handles quoted
/// ES/CommonJS/Go specifiers and bare Python `import`/`from` statements.
fn extract_specifier(line: &str) -> Option<String> {
    static QUOTED: OnceLock<Regex> = OnceLock::new();
    static PY_FROM: OnceLock<Regex> = OnceLock::new();
    static PY_IMPORT: OnceLock<Regex> = OnceLock::new();

    let quoted = QUOTED.get_or_init(|| {
        Regex::new(r#"(?:from|import|require\s*\()\s*['"]([^'"]+)['"]"#)
            .expect("quoted specifier pattern is hardcoded")
    });
    if let Some(caps) = quoted.captures(line) {
        return Some(caps[1].to_string());
    }

    let py_from = PY_FROM.get_or_init(|| {
        Regex::new(r"^\s*from\s+([\w.]+)\s+import\b").expect("python from pattern is hardcoded")
    });
    if let Some(caps) = py_from.captures(line) {
        return Some(caps[1].to_string());
    }

    let py_import = PY_IMPORT.get_or_init(|| {
        Regex::new(r"^\s*import\s+([\w.]+)").expect("python import pattern is hardcoded")
    });
    py_import.captures(line).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiffLine;

    fn decision(title: &str, constraints: &[&str], evidence: &[&str]) -> Decision {
        Decision {
            title: title.to_string(),
            confidence: 0.9,
            constraints: constraints.iter().map(|s| (*s).to_string()).collect(),
            evidence: evidence.iter().map(|s| (*s).to_string()).collect(),
            ..Decision::default()
        }
    }

    #[test]
    fn test_constraint_sentence_parsing() {
        let decisions = vec![decision(
            "Layered architecture",
            &["The domain layer must not import infrastructure"],
            &[],
        )];
        let rules = compile(&decisions);
        assert_eq!(rules.forbidden.len(), 1);
        assert_eq!(rules.forbidden[0].from, "domain");
        assert_eq!(rules.forbidden[0].to, "infrastructure");
        assert_eq!(rules.forbidden[0].decision.as_deref(), Some("Layered architecture"));
    }

    #[test]
    fn test_default_table_needs_evidence_cooccurrence() {
        // Only "domain" appears in evidence: defaults stay silent.
        let partial = vec![decision("d", &[], &["src/domain/order.ts"])];
        assert!(compile(&partial).forbidden.is_empty());

        // Both names present: the domain->infrastructure default activates.
        let both = vec![decision(
            "d",
            &[],
            &["src/domain/order.ts", "src/infrastructure/db.ts"],
        )];
        let rules = compile(&both);
        assert_eq!(rules.forbidden.len(), 1);
        assert!(rules.forbidden[0].decision.is_none());
    }

    #[test]
    fn test_import_violation_detected() {
        let decisions = vec![decision(
            "Layering",
            &["domain layer must not import infrastructure"],
            &[],
        )];
        let rules = compile(&decisions);

        let changes = vec![FileChange {
            path: "src/domain/bar.ts".to_string(),
            status: ChangeStatus::Modified,
            added_lines: Vec::new(),
            removed_lines: Vec::new(),
            added_imports: vec![DiffLine::new(4, "import Foo from '../infrastructure/foo'")],
        }];

        let mut report = RuleReport::default();
        check(&rules, &changes, &mut report);

        assert_eq!(report.violations.len(), 1);
        let violation = &report.violations[0];
        assert_eq!(violation.rule, "import-violation");
        assert_eq!(violation.severity, Severity::Error);
        assert_eq!(violation.line, Some(4));
        assert!(violation.message.contains("domain"));
        assert!(violation.message.contains("infrastructure"));
        assert_eq!(report.layer_pairs.len(), 1);
    }

    #[test]
    fn test_specifier_extraction() {
        let cases = [
            ("import Foo from '../infrastructure/foo'", "../infrastructure/foo"),
            ("const db = require(\"./infra/db\")", "./infra/db"),
            ("from app.infrastructure import db", "app.infrastructure"),
            ("import infrastructure.db", "infrastructure.db"),
        ];
        for (line, expected) in cases {
            assert_eq!(extract_specifier(line).as_deref(), Some(expected), "line: {line}");
        }
        assert_eq!(extract_specifier("let x = 1;"), None);
    }

    #[test]
    fn test_unrelated_layers_pass() {
        let decisions = vec![decision("L", &["domain must not import infrastructure"], &[])];
        let rules = compile(&decisions);
        let changes = vec![FileChange {
            path: "src/application/svc.ts".to_string(),
            status: ChangeStatus::Modified,
            added_lines: Vec::new(),
            removed_lines: Vec::new(),
            added_imports: vec![DiffLine::new(1, "import Foo from '../infrastructure/foo'")],
        }];
        let mut report = RuleReport::default();
        check(&rules, &changes, &mut report);
        assert!(report.violations.is_empty());
    }
}
