// src/lib.rs
//! Deterministic architecture analysis engine.
//!
//! Consumes per-file import/type records, documented architectural decisions,
//! and a code-change diff; produces a dependency graph with coupling metrics
//! and cycles, a rule-violation list, and a drift report against a prior
//! snapshot. No generative model, no network, no mutation of inputs.

pub mod drift;
pub mod error;
pub mod graph;
pub mod paths;
pub mod rules;
pub mod types;
