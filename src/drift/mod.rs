// src/drift/mod.rs
//! Snapshot-based drift detection.
//!
//! Compares the current run's decisions and graph statistics against the last
//! persisted snapshot. Decision loss is deliberately the heaviest signal: a
//! documented choice disappearing from the record says more about drift than
//! any single metric moving.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::graph::GraphTotals;
use crate::types::{Decision, DriftSeverity};

/// Aggregate dependency statistics carried in a snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DependencyStats {
    pub module_count: usize,
    pub edge_count: usize,
    pub circular_count: usize,
    pub avg_coupling: f64,
    pub avg_instability: f64,
}

impl DependencyStats {
    #[must_use]
    pub fn from_totals(totals: &GraphTotals) -> Self {
        Self {
            module_count: totals.module_count,
            edge_count: totals.edge_count,
            circular_count: totals.circular_count,
            avg_coupling: totals.avg_coupling,
            avg_instability: totals.avg_instability,
        }
    }
}

/// Point-in-time baseline: created once per run, persisted externally,
/// never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub decisions: Vec<Decision>,
    pub drift_score: u32,
    pub stats: DependencyStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<String>,
    /// Unix seconds.
    pub timestamp: u64,
}

/// Category of one detected change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftEventKind {
    DecisionLost,
    DecisionEmerged,
    DecisionWeakened,
    NewCycles,
    CouplingIncrease,
    InstabilityIncrease,
    LayerViolations,
}

/// One detected change, tied to the snapshot comparison that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftEvent {
    pub kind: DriftEventKind,
    pub severity: DriftSeverity,
    pub description: String,
    /// Commit of the baseline snapshot this event was measured against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_commit: Option<String>,
}

/// Result of one drift comparison: the score, its events, and the new
/// snapshot for external persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub score: u32,
    pub events: Vec<DriftEvent>,
    pub snapshot: Snapshot,
}

/// Inputs to one drift comparison.
#[derive(Debug)]
pub struct DriftInput<'a> {
    pub decisions: &'a [Decision],
    pub totals: &'a GraphTotals,
    pub prior: Option<&'a Snapshot>,
    /// `(from layer, to layer)` per current-run import-direction violation.
    pub layer_violations: &'a [(String, String)],
    pub commit: Option<String>,
}

const WEAKENED_DROP: f64 = 0.15;
const WEAKENED_DROP_HIGH: f64 = 0.30;
const LOST_HIGH_CONFIDENCE: f64 = 0.7;
const METRIC_RISE: f64 = 0.10;
const METRIC_RISE_HIGH: f64 = 0.20;
const LOST_WEIGHT: f64 = 30.0;

/// Runs the comparison. No prior snapshot means a baseline run: score 0, no
/// events, current state returned as the new baseline.
#[must_use]
pub fn detect(input: &DriftInput) -> DriftReport {
    let Some(prior) = input.prior else {
        return DriftReport {
            score: 0,
            events: Vec::new(),
            snapshot: snapshot_of(input, 0),
        };
    };

    let mut events = Vec::new();
    let lost_count = compare_decisions(input.decisions, prior, &mut events);
    compare_stats(input.totals, prior, &mut events);
    summarize_layer_violations(input.layer_violations, prior, &mut events);

    let score = score_of(&events, lost_count, prior.decisions.len());
    DriftReport { score, events, snapshot: snapshot_of(input, score) }
}

fn snapshot_of(input: &DriftInput, drift_score: u32) -> Snapshot {
    Snapshot {
        decisions: input.decisions.to_vec(),
        drift_score,
        stats: DependencyStats::from_totals(input.totals),
        commit: input.commit.clone(),
        timestamp: unix_now(),
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Decisions are compared by title. Returns the lost-decision count.
fn compare_decisions(current: &[Decision], prior: &Snapshot, events: &mut Vec<DriftEvent>) -> usize {
    let mut lost = 0;

    for before in &prior.decisions {
        match current.iter().find(|d| d.title == before.title) {
            None => {
                lost += 1;
                let severity = if before.confidence > LOST_HIGH_CONFIDENCE {
                    DriftSeverity::High
                } else {
                    DriftSeverity::Medium
                };
                events.push(event(
                    DriftEventKind::DecisionLost,
                    severity,
                    format!("Decision '{}' is no longer documented", before.title),
                    prior,
                ));
            }
            Some(now) => {
                let drop = before.confidence - now.confidence;
                if drop > WEAKENED_DROP {
                    let severity = if drop > WEAKENED_DROP_HIGH {
                        DriftSeverity::High
                    } else {
                        DriftSeverity::Medium
                    };
                    events.push(event(
                        DriftEventKind::DecisionWeakened,
                        severity,
                        format!(
                            "Decision '{}' confidence fell from {:.2} to {:.2}",
                            before.title, before.confidence, now.confidence
                        ),
                        prior,
                    ));
                }
            }
        }
    }

    for now in current {
        if !prior.decisions.iter().any(|d| d.title == now.title) {
            events.push(event(
                DriftEventKind::DecisionEmerged,
                DriftSeverity::Low,
                format!("New decision '{}' documented", now.title),
                prior,
            ));
        }
    }

    lost
}

fn compare_stats(totals: &GraphTotals, prior: &Snapshot, events: &mut Vec<DriftEvent>) {
    if totals.circular_count > prior.stats.circular_count {
        let new_cycles = totals.circular_count - prior.stats.circular_count;
        let severity = if new_cycles > 2 { DriftSeverity::High } else { DriftSeverity::Medium };
        events.push(event(
            DriftEventKind::NewCycles,
            severity,
            format!("{new_cycles} new circular-dependency group(s) since baseline"),
            prior,
        ));
    }

    push_metric_rise(
        events,
        DriftEventKind::CouplingIncrease,
        "average coupling",
        prior.stats.avg_coupling,
        totals.avg_coupling,
        prior,
    );
    push_metric_rise(
        events,
        DriftEventKind::InstabilityIncrease,
        "average instability",
        prior.stats.avg_instability,
        totals.avg_instability,
        prior,
    );
}

fn push_metric_rise(
    events: &mut Vec<DriftEvent>,
    kind: DriftEventKind,
    label: &str,
    before: f64,
    now: f64,
    prior: &Snapshot,
) {
    let rise = now - before;
    if rise <= METRIC_RISE {
        return;
    }
    let severity = if rise > METRIC_RISE_HIGH { DriftSeverity::High } else { DriftSeverity::Medium };
    events.push(event(
        kind,
        severity,
        format!("{label} rose from {before:.3} to {now:.3}"),
        prior,
    ));
}

/// One aggregated event for however many layer violations the caller saw,
/// naming at most three distinct violating pairs.
fn summarize_layer_violations(
    violations: &[(String, String)],
    prior: &Snapshot,
    events: &mut Vec<DriftEvent>,
) {
    if violations.is_empty() {
        return;
    }

    let mut pairs: Vec<String> = Vec::new();
    for (from, to) in violations {
        let label = format!("{from}->{to}");
        if !pairs.contains(&label) {
            pairs.push(label);
        }
        if pairs.len() == 3 {
            break;
        }
    }

    let count = violations.len();
    let severity = if count > 5 {
        DriftSeverity::High
    } else if count > 2 {
        DriftSeverity::Medium
    } else {
        DriftSeverity::Low
    };
    events.push(event(
        DriftEventKind::LayerViolations,
        severity,
        format!("{count} layer violation(s) in this change: {}", pairs.join(", ")),
        prior,
    ));
}

fn event(
    kind: DriftEventKind,
    severity: DriftSeverity,
    description: String,
    prior: &Snapshot,
) -> DriftEvent {
    DriftEvent { kind, severity, description, baseline_commit: prior.commit.clone() }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn score_of(events: &[DriftEvent], lost_count: usize, prior_count: usize) -> u32 {
    let weighted: u32 = events.iter().map(|e| e.severity.weight()).sum();
    let loss_ratio = if prior_count == 0 {
        0.0
    } else {
        lost_count as f64 / prior_count as f64
    };
    let score = f64::from(weighted) + loss_ratio * LOST_WEIGHT;
    score.min(100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decision(title: &str, confidence: f64) -> Decision {
        Decision { title: title.to_string(), confidence, ..Decision::default() }
    }

    fn totals() -> GraphTotals {
        GraphTotals {
            module_count: 10,
            edge_count: 12,
            circular_count: 0,
            avg_coupling: 0.2,
            avg_instability: 0.4,
            avg_abstractness: 0.1,
            avg_distance: 0.5,
        }
    }

    fn prior_snapshot(decisions: Vec<Decision>) -> Snapshot {
        Snapshot {
            decisions,
            drift_score: 0,
            stats: DependencyStats {
                module_count: 10,
                edge_count: 12,
                circular_count: 0,
                avg_coupling: 0.2,
                avg_instability: 0.4,
            },
            commit: Some("abc123".to_string()),
            timestamp: 1_700_000_000,
        }
    }

    #[test]
    fn test_baseline_run() {
        let totals = totals();
        let decisions = vec![decision("Use layered architecture", 0.9)];
        let report = detect(&DriftInput {
            decisions: &decisions,
            totals: &totals,
            prior: None,
            layer_violations: &[],
            commit: Some("abc123".to_string()),
        });

        assert_eq!(report.score, 0);
        assert!(report.events.is_empty());
        assert_eq!(report.snapshot.stats.module_count, 10);
        assert_eq!(report.snapshot.stats.edge_count, 12);
        assert_eq!(report.snapshot.decisions.len(), 1);
    }

    #[test]
    fn test_weakened_decision_medium() {
        let totals = totals();
        let prior = prior_snapshot(vec![decision("X", 0.9)]);
        let current = vec![decision("X", 0.7)];
        let report = detect(&DriftInput {
            decisions: &current,
            totals: &totals,
            prior: Some(&prior),
            layer_violations: &[],
            commit: None,
        });

        assert_eq!(report.events.len(), 1);
        let ev = &report.events[0];
        assert_eq!(ev.kind, DriftEventKind::DecisionWeakened);
        assert_eq!(ev.severity, DriftSeverity::Medium);
        assert_eq!(ev.baseline_commit.as_deref(), Some("abc123"));
        assert_eq!(report.score, 8);
    }

    #[test]
    fn test_lost_decision_severity_by_confidence() {
        let totals = totals();
        let prior = prior_snapshot(vec![decision("high", 0.9), decision("low", 0.5)]);
        let report = detect(&DriftInput {
            decisions: &[],
            totals: &totals,
            prior: Some(&prior),
            layer_violations: &[],
            commit: None,
        });

        assert_eq!(report.events.len(), 2);
        assert!(report
            .events
            .iter()
            .any(|e| e.kind == DriftEventKind::DecisionLost && e.severity == DriftSeverity::High));
        assert!(report
            .events
            .iter()
            .any(|e| e.kind == DriftEventKind::DecisionLost && e.severity == DriftSeverity::Medium));
        // 15 + 8 + (2/2)*30 = 53
        assert_eq!(report.score, 53);
    }

    #[test]
    fn test_emerged_decision_low() {
        let totals = totals();
        let prior = prior_snapshot(vec![]);
        let current = vec![decision("new idea", 0.6)];
        let report = detect(&DriftInput {
            decisions: &current,
            totals: &totals,
            prior: Some(&prior),
            layer_violations: &[],
            commit: None,
        });

        assert_eq!(report.events.len(), 1);
        assert_eq!(report.events[0].kind, DriftEventKind::DecisionEmerged);
        assert_eq!(report.events[0].severity, DriftSeverity::Low);
        assert_eq!(report.score, 3);
    }

    #[test]
    fn test_new_cycles_and_metric_rises() {
        let mut current = totals();
        current.circular_count = 3;
        current.avg_coupling = 0.45; // +0.25 => high
        current.avg_instability = 0.55; // +0.15 => medium
        let prior = prior_snapshot(vec![]);
        let report = detect(&DriftInput {
            decisions: &[],
            totals: &current,
            prior: Some(&prior),
            layer_violations: &[],
            commit: None,
        });

        let kinds: Vec<DriftEventKind> = report.events.iter().map(|e| e.kind).collect();
        assert!(kinds.contains(&DriftEventKind::NewCycles));
        assert!(kinds.contains(&DriftEventKind::CouplingIncrease));
        assert!(kinds.contains(&DriftEventKind::InstabilityIncrease));

        let cycles = report
            .events
            .iter()
            .find(|e| e.kind == DriftEventKind::NewCycles)
            .unwrap();
        assert_eq!(cycles.severity, DriftSeverity::High); // 3 new groups
        let coupling = report
            .events
            .iter()
            .find(|e| e.kind == DriftEventKind::CouplingIncrease)
            .unwrap();
        assert_eq!(coupling.severity, DriftSeverity::High);
    }

    #[test]
    fn test_layer_violation_aggregation() {
        let totals = totals();
        let prior = prior_snapshot(vec![]);
        let pairs: Vec<(String, String)> = (0..6)
            .map(|i| (format!("l{}", i % 4), "infrastructure".to_string()))
            .collect();
        let report = detect(&DriftInput {
            decisions: &[],
            totals: &totals,
            prior: Some(&prior),
            layer_violations: &pairs,
            commit: None,
        });

        let layer_events: Vec<&DriftEvent> = report
            .events
            .iter()
            .filter(|e| e.kind == DriftEventKind::LayerViolations)
            .collect();
        assert_eq!(layer_events.len(), 1, "exactly one aggregated event");
        assert_eq!(layer_events[0].severity, DriftSeverity::High); // 6 > 5
        // At most three pairs named.
        assert_eq!(layer_events[0].description.matches("->").count(), 3);
    }

    #[test]
    fn test_score_capped_at_100() {
        let totals = totals();
        let prior = prior_snapshot((0..20).map(|i| decision(&format!("d{i}"), 0.9)).collect());
        let report = detect(&DriftInput {
            decisions: &[],
            totals: &totals,
            prior: Some(&prior),
            layer_violations: &[],
            commit: None,
        });
        assert_eq!(report.score, 100);
    }
}
