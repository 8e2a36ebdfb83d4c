// src/graph/mod.rs
//! Dependency graph assembly.
//!
//! One build is a complete, self-contained unit of work: node per file,
//! resolver per import, then cycles and metrics over the finished adjacency.
//! Given identical file records and config, two builds produce identical
//! node sets and identical edge ordering — first-seen order everywhere,
//! no sort-dependent dedup.

pub mod coupling;
pub mod cycles;
pub mod project_config;
pub mod resolver;

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{EngineError, Result};
use crate::paths;
use crate::types::FileRecord;

use self::coupling::{CouplingMetrics, TypeCounts};
use self::cycles::CircularDependency;
use self::project_config::{AliasConfig, GoModule, WorkspacePackages};
use self::resolver::{KnownFiles, ResolverContext};

/// A file inside the graph: ordered import targets and importers.
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub path: String,
    pub imports: Vec<String>,
    pub imported_by: Vec<String>,
}

/// Classification of a resolved import by target suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Style,
    Data,
    Module,
}

impl EdgeKind {
    fn classify(target: &str) -> Self {
        match paths::extension(target).as_str() {
            "css" | "scss" | "sass" | "less" => Self::Style,
            "json" | "yaml" | "yml" | "toml" | "xml" | "csv" => Self::Data,
            _ => Self::Module,
        }
    }
}

/// One resolved import.
#[derive(Debug, Clone, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

/// Aggregate averages across all nodes; 0 for an empty graph.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphTotals {
    pub module_count: usize,
    pub edge_count: usize,
    pub circular_count: usize,
    pub avg_coupling: f64,
    pub avg_instability: f64,
    pub avg_abstractness: f64,
    pub avg_distance: f64,
}

/// The whole-run result. Immutable once built.
#[derive(Debug, Serialize)]
pub struct DependencyGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<Edge>,
    pub cycles: Vec<CircularDependency>,
    /// Aligned with `nodes`.
    pub metrics: Vec<CouplingMetrics>,
    pub totals: GraphTotals,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl DependencyGraph {
    #[must_use]
    pub fn node(&self, path: &str) -> Option<&GraphNode> {
        self.index.get(path).map(|&i| &self.nodes[i])
    }

    #[must_use]
    pub fn metrics_for(&self, path: &str) -> Option<&CouplingMetrics> {
        self.index.get(path).map(|&i| &self.metrics[i])
    }

    /// Nodes with fan-in at or above `min_fan_in`, highest first.
    /// Downstream reporting uses this to surface hub modules.
    #[must_use]
    pub fn hub_candidates(&self, min_fan_in: usize) -> Vec<(&str, usize)> {
        let mut hubs: Vec<(&str, usize)> = self
            .nodes
            .iter()
            .filter(|n| n.imported_by.len() >= min_fan_in)
            .map(|n| (n.path.as_str(), n.imported_by.len()))
            .collect();
        hubs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        hubs
    }

    /// Up to `limit` nodes with the highest instability, ties by path.
    #[must_use]
    pub fn most_unstable(&self, limit: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .nodes
            .iter()
            .zip(&self.metrics)
            .map(|(n, m)| (n.path.as_str(), m.instability))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        ranked.truncate(limit);
        ranked
    }
}

/// Optional project configuration feeding the resolver. Each piece is
/// independently optional; absence disables one strategy.
#[derive(Debug, Default)]
pub struct BuildConfig {
    pub aliases: Option<AliasConfig>,
    pub workspace: Option<WorkspacePackages>,
    pub go_module: Option<GoModule>,
}

impl BuildConfig {
    /// Reads the three optional config files under `root`. This is the only
    /// filesystem access in the engine, performed once per build.
    #[must_use]
    pub fn load(root: &Path) -> Self {
        Self {
            aliases: AliasConfig::load(root),
            workspace: WorkspacePackages::load(root),
            go_module: GoModule::load(root),
        }
    }
}

/// Builds the dependency graph for one analysis run.
///
/// # Errors
/// Returns [`EngineError::EmptyPath`] when a file record has an empty path —
/// the one required-input shape the engine checks. Everything optional
/// degrades silently.
pub fn build(files: &[FileRecord], config: &BuildConfig) -> Result<DependencyGraph> {
    for (index, record) in files.iter().enumerate() {
        if record.path.trim().is_empty() {
            return Err(EngineError::EmptyPath { index });
        }
    }
    debug!(files = files.len(), "building dependency graph");

    let mut nodes: Vec<GraphNode> = Vec::new();
    let mut counts: Vec<TypeCounts> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    // Maps each input record to its node; duplicates keep the first record.
    let mut record_nodes: Vec<Option<usize>> = Vec::with_capacity(files.len());

    for record in files {
        let path = paths::normalize(&record.path);
        if index.contains_key(&path) {
            debug!(%path, "duplicate file record skipped");
            record_nodes.push(None);
            continue;
        }
        index.insert(path.clone(), nodes.len());
        record_nodes.push(Some(nodes.len()));
        counts.push(TypeCounts::from_record(record));
        nodes.push(GraphNode { path, imports: Vec::new(), imported_by: Vec::new() });
    }

    let known = KnownFiles::new(nodes.iter().map(|n| n.path.clone()));
    let packages = config
        .workspace
        .as_ref()
        .map(|ws| ws.expand(known.as_slice()))
        .unwrap_or_default();
    let ctx = ResolverContext {
        known: &known,
        aliases: config.aliases.as_ref(),
        packages: &packages,
        go_prefix: config.go_module.as_ref().map(|m| m.prefix.as_str()),
    };

    let mut edges: Vec<Edge> = Vec::new();
    for (record, node_idx) in files.iter().zip(&record_nodes) {
        let Some(source_idx) = *node_idx else { continue };
        let source = nodes[source_idx].path.clone();
        let language = record.language.as_deref();

        for import in &record.imports {
            let Some(target) = resolver::resolve(&ctx, &source, language, import) else {
                continue;
            };
            if target == source {
                continue;
            }
            let Some(&target_idx) = index.get(&target) else {
                continue;
            };
            if nodes[source_idx].imports.contains(&target) {
                continue;
            }
            nodes[source_idx].imports.push(target.clone());
            nodes[target_idx].imported_by.push(source.clone());
            edges.push(Edge {
                from: source.clone(),
                kind: EdgeKind::classify(&target),
                to: target,
            });
        }
    }

    let cycles = cycles::detect(&nodes, &index);
    let metrics = coupling::compute(&nodes, &counts);
    let totals = aggregate(&nodes, &edges, &cycles, &metrics);
    debug!(
        modules = totals.module_count,
        edges = totals.edge_count,
        cycles = totals.circular_count,
        "dependency graph complete"
    );

    Ok(DependencyGraph { nodes, edges, cycles, metrics, totals, index })
}

fn aggregate(
    nodes: &[GraphNode],
    edges: &[Edge],
    cycles: &[CircularDependency],
    metrics: &[CouplingMetrics],
) -> GraphTotals {
    let mut totals = GraphTotals {
        module_count: nodes.len(),
        edge_count: edges.len(),
        circular_count: cycles.len(),
        ..GraphTotals::default()
    };
    if metrics.is_empty() {
        return totals;
    }

    #[allow(clippy::cast_precision_loss)]
    let n = metrics.len() as f64;
    totals.avg_coupling = coupling::round3(metrics.iter().map(|m| m.normalized).sum::<f64>() / n);
    totals.avg_instability =
        coupling::round3(metrics.iter().map(|m| m.instability).sum::<f64>() / n);
    totals.avg_abstractness =
        coupling::round3(metrics.iter().map(|m| m.abstractness).sum::<f64>() / n);
    totals.avg_distance = coupling::round3(metrics.iter().map(|m| m.distance).sum::<f64>() / n);
    totals
}
