// src/rules/mod.rs
//! Deterministic architectural-rule engine.
//!
//! Documented decision constraints and user-defined custom rules are compiled
//! once per run into a structured rule set; checking a code change is then a
//! pure pass over the diff. Four independent checks run and their violations
//! are concatenated — no check suppresses another.

mod custom;
mod layers;
mod naming;
mod placement;

use crate::types::{CustomRule, Decision, FileChange, Violation};

pub use self::layers::ForbiddenEdge;

/// Outcome of checking one code change.
#[derive(Debug, Default)]
pub struct RuleReport {
    pub violations: Vec<Violation>,
    /// One `(from layer, to layer)` entry per import-direction violation,
    /// consumed by the drift detector's aggregated layer event.
    pub layer_pairs: Vec<(String, String)>,
}

/// The compiled rule set for one analysis run.
#[derive(Debug)]
pub struct CompiledRules {
    layers: layers::LayerRules,
    placement: Vec<placement::PlacementRule>,
    naming: Vec<naming::NamingRule>,
    custom: Vec<custom::CompiledCustomRule>,
}

impl CompiledRules {
    /// Parses decision constraints and user rules into checkable form.
    /// Constraint sentences that match no inference pattern are ignored;
    /// a custom rule whose regex fails to compile is skipped alone.
    #[must_use]
    pub fn compile(decisions: &[Decision], custom_rules: &[CustomRule]) -> Self {
        Self {
            layers: layers::compile(decisions),
            placement: placement::compile(decisions),
            naming: naming::compile(decisions),
            custom: custom::compile(custom_rules),
        }
    }

    /// Runs all four checks against a code change.
    #[must_use]
    pub fn check(&self, changes: &[FileChange]) -> RuleReport {
        let mut report = RuleReport::default();
        layers::check(&self.layers, changes, &mut report);
        placement::check(&self.placement, changes, &mut report.violations);
        naming::check(&self.naming, changes, &mut report.violations);
        custom::check(&self.custom, changes, &mut report.violations);
        report
    }

    /// Sentence-derived or defaulted forbidden layer edges, for reporting.
    #[must_use]
    pub fn forbidden_edges(&self) -> &[ForbiddenEdge] {
        self.layers.forbidden()
    }
}
