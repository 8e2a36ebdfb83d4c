// src/types.rs
//! Boundary types consumed and produced by the engine.
//!
//! Everything here is serde-round-trippable so the external persistence and
//! reporting layers can store or render it without adapters. The engine never
//! mutates an input value.

use serde::{Deserialize, Serialize};

/// One scanned source file, as delivered by the upstream scanner.
///
/// `path` is the unique key for the run. Type counts feed abstractness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub interfaces: u32,
    #[serde(default)]
    pub abstract_classes: u32,
    #[serde(default)]
    pub classes: u32,
    #[serde(default)]
    pub type_aliases: u32,
}

/// A documented architectural decision. `title` is the identity key used by
/// drift comparison; `constraints` are free-text sentences the rule engine
/// compiles into deterministic checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Decision {
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub evidence: Vec<String>,
}

/// Status of one file in a code-change diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Renamed,
}

/// One line of a diff hunk, with its line number in the new file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffLine {
    pub line: u32,
    pub text: String,
}

impl DiffLine {
    #[must_use]
    pub fn new(line: u32, text: impl Into<String>) -> Self {
        Self { line, text: text.into() }
    }
}

/// Per-file hunk context of a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileChange {
    pub path: String,
    pub status: ChangeStatus,
    #[serde(default)]
    pub added_lines: Vec<DiffLine>,
    #[serde(default)]
    pub removed_lines: Vec<DiffLine>,
    /// Added lines that are import statements, pre-filtered by the scanner.
    #[serde(default)]
    pub added_imports: Vec<DiffLine>,
}

/// A user-defined rule: flag added lines matching `pattern`, constrained by
/// optional directory allow/deny lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomRule {
    pub name: String,
    pub pattern: String,
    #[serde(default)]
    pub allowed_in: Vec<String>,
    #[serde(default)]
    pub not_allowed_in: Vec<String>,
    #[serde(default = "default_rule_severity")]
    pub severity: Severity,
}

fn default_rule_severity() -> Severity {
    Severity::Warning
}

/// Severity of a rule violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

/// Severity of a drift event. Weights feed the drift score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftSeverity {
    Low,
    Medium,
    High,
}

impl DriftSeverity {
    /// Score contribution of one event at this severity.
    #[must_use]
    pub fn weight(self) -> u32 {
        match self {
            Self::High => 15,
            Self::Medium => 8,
            Self::Low => 3,
        }
    }
}

/// One rule failure. Produced fresh per check, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Stable rule id, e.g. `import-violation`, `file-placement`.
    pub rule: String,
    pub severity: Severity,
    pub message: String,
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Title of the decision this rule was derived from, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
}
