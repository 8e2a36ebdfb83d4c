// tests/unit_rules.rs
//! Rule-engine behavior at the facade level: compile once, check a change,
//! four independent checks concatenated without cross-suppression.

use archdrift::rules::CompiledRules;
use archdrift::types::{
    ChangeStatus, CustomRule, Decision, DiffLine, FileChange, Severity,
};

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
fn test_checks_concatenate_without_suppression() {
    let decisions = vec![
        decision("Layering", &["domain must not import infrastructure"], &[]),
        decision("Service placement", &["Keep service files in src/services"], &[]),
    ];
    let custom = vec![CustomRule {
        name: "no-console".to_string(),
        pattern: r"console\.log".to_string(),
        allowed_in: Vec::new(),
        not_allowed_in: vec!["src/domain".to_string()],
        severity: Severity::Warning,
    }];
    let rules = CompiledRules::compile(&decisions, &custom);

    // One new file trips all three checks at once.
    let changes = vec![FileChange {
        path: "src/domain/payment.service.ts".to_string(),
        status: ChangeStatus::Added,
        added_lines: vec![DiffLine::new(10, "console.log('debug');")],
        removed_lines: Vec::new(),
        added_imports: vec![DiffLine::new(2, "import { Db } from '../infrastructure/db'")],
    }];
    let report = rules.check(&changes);

    let rule_ids: Vec<&str> = report.violations.iter().map(|v| v.rule.as_str()).collect();
    assert!(rule_ids.contains(&"import-violation"));
    assert!(rule_ids.contains(&"file-placement"));
    assert!(rule_ids.contains(&"custom:no-console"));
    assert_eq!(report.violations.len(), 3);
    assert_eq!(report.layer_pairs, vec![("domain".to_string(), "infrastructure".to_string())]);
}

#[test]
fn test_spec_example_import_violation() {
    let decisions = vec![decision(
        "Layered architecture",
        &["domain layer must not import infrastructure"],
        &[],
    )];
    let rules = CompiledRules::compile(&decisions, &[]);

    let changes = vec![FileChange {
        path: "src/domain/bar.ts".to_string(),
        status: ChangeStatus::Modified,
        added_lines: Vec::new(),
        removed_lines: Vec::new(),
        added_imports: vec![DiffLine::new(1, "import Foo from '../infrastructure/foo'")],
    }];
    let report = rules.check(&changes);

    assert_eq!(report.violations.len(), 1);
    let violation = &report.violations[0];
    assert_eq!(violation.rule, "import-violation");
    assert_eq!(violation.severity, Severity::Error);
    assert_eq!(violation.decision.as_deref(), Some("Layered architecture"));
}

#[test]
fn test_clean_change_produces_nothing() {
    let decisions = vec![decision("Layering", &["domain must not import infrastructure"], &[])];
    let rules = CompiledRules::compile(&decisions, &[]);

    let changes = vec![FileChange {
        path: "src/domain/order.ts".to_string(),
        status: ChangeStatus::Modified,
        added_lines: vec![DiffLine::new(3, "export const x = 1;")],
        removed_lines: Vec::new(),
        added_imports: vec![DiffLine::new(1, "import { Money } from './money'")],
    }];
    let report = rules.check(&changes);
    assert!(report.violations.is_empty());
    assert!(report.layer_pairs.is_empty());
}

#[test]
fn test_forbidden_edges_exposed_for_reporting() {
    let decisions = vec![decision("Layering", &["domain must not import infrastructure"], &[])];
    let rules = CompiledRules::compile(&decisions, &[]);
    let edges = rules.forbidden_edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].from, "domain");
    assert_eq!(edges[0].to, "infrastructure");
}
