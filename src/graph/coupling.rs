// src/graph/coupling.rs
//! Coupling, abstractness, and main-sequence distance per module.

use serde::{Deserialize, Serialize};

use super::GraphNode;
use crate::types::FileRecord;

/// Per-module coupling health numbers. Ratios are rounded to 3 decimals for
/// stable comparison and display.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouplingMetrics {
    /// Afferent coupling: modules importing this one.
    pub afferent: u32,
    /// Efferent coupling: modules this one imports.
    pub efferent: u32,
    /// I = Ce / (Ca + Ce); 0 when the module is isolated.
    pub instability: f64,
    /// A = abstract types / all declared types; 0 when nothing is declared.
    pub abstractness: f64,
    /// D = |A + I - 1|.
    pub distance: f64,
    /// Legacy normalized score min(1, (Ca+Ce)/modules), kept for
    /// backward-compatible reporting and prior snapshots.
    pub normalized: f64,
}

/// Declared-type counts carried from a [`FileRecord`] into the graph.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TypeCounts {
    pub interfaces: u32,
    pub abstract_classes: u32,
    pub classes: u32,
    pub type_aliases: u32,
}

impl TypeCounts {
    #[must_use]
    pub fn from_record(record: &FileRecord) -> Self {
        Self {
            interfaces: record.interfaces,
            abstract_classes: record.abstract_classes,
            classes: record.classes,
            type_aliases: record.type_aliases,
        }
    }

    fn abstractness(self) -> f64 {
        let abstract_types = self.interfaces + self.abstract_classes;
        let total = abstract_types + self.classes + self.type_aliases;
        if total == 0 {
            return 0.0;
        }
        f64::from(abstract_types) / f64::from(total)
    }
}

/// Computes metrics for every node, aligned with node order.
#[must_use]
pub fn compute(nodes: &[GraphNode], counts: &[TypeCounts]) -> Vec<CouplingMetrics> {
    let module_count = nodes.len();
    nodes
        .iter()
        .zip(counts)
        .map(|(node, types)| compute_one(node, *types, module_count))
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn compute_one(node: &GraphNode, types: TypeCounts, module_count: usize) -> CouplingMetrics {
    let afferent = node.imported_by.len() as u32;
    let efferent = node.imports.len() as u32;

    let total = afferent + efferent;
    let instability = if total == 0 {
        0.0
    } else {
        f64::from(efferent) / f64::from(total)
    };
    let abstractness = types.abstractness();
    let distance = (abstractness + instability - 1.0).abs();

    let normalized = if module_count == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let ratio = f64::from(total) / module_count as f64;
        ratio.min(1.0)
    };

    CouplingMetrics {
        afferent,
        efferent,
        instability: round3(instability),
        abstractness: round3(abstractness),
        distance: round3(distance),
        normalized: round3(normalized),
    }
}

/// Round to 3 decimals.
#[must_use]
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &str, imports: &[&str], imported_by: &[&str]) -> GraphNode {
        GraphNode {
            path: path.to_string(),
            imports: imports.iter().map(|s| (*s).to_string()).collect(),
            imported_by: imported_by.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn test_isolated_node_is_maximally_distant() {
        let nodes = vec![node("lone.ts", &[], &[])];
        let metrics = compute(&nodes, &[TypeCounts::default()]);

        assert_eq!(metrics[0].instability, 0.0);
        assert_eq!(metrics[0].abstractness, 0.0);
        assert_eq!(metrics[0].distance, 1.0);
        assert_eq!(metrics[0].normalized, 0.0);
    }

    #[test]
    fn test_instability_ratio() {
        let nodes = vec![
            node("hub.ts", &["a.ts"], &["b.ts", "c.ts", "d.ts"]),
            node("leaf.ts", &["hub.ts", "a.ts"], &[]),
        ];
        let counts = vec![TypeCounts::default(); 2];
        let metrics = compute(&nodes, &counts);

        assert_eq!(metrics[0].afferent, 3);
        assert_eq!(metrics[0].efferent, 1);
        assert_eq!(metrics[0].instability, 0.25);
        assert_eq!(metrics[1].instability, 1.0);
    }

    #[test]
    fn test_abstractness_and_rounding() {
        let counts = TypeCounts { interfaces: 1, abstract_classes: 0, classes: 2, type_aliases: 0 };
        let nodes = vec![node("a.ts", &["b.ts"], &[])];
        let metrics = compute(&nodes, &[counts]);

        assert_eq!(metrics[0].abstractness, 0.333);
        // A=1/3, I=1 => D=|1/3 + 1 - 1| = 1/3
        assert_eq!(metrics[0].distance, 0.333);
    }

    #[test]
    fn test_normalized_capped_at_one() {
        let nodes = vec![node("a.ts", &["b.ts", "c.ts"], &["d.ts"])];
        let metrics = compute(&nodes, &[TypeCounts::default()]);
        assert_eq!(metrics[0].normalized, 1.0);
    }
}
