// tests/unit_graph_build.rs
//! Graph-builder invariants: node/edge completeness, determinism, dedup.

use archdrift::graph::{self, BuildConfig, EdgeKind};
use archdrift::types::FileRecord;

fn record(path: &str, imports: &[&str]) -> FileRecord {
    FileRecord {
        path: path.to_string(),
        imports: imports.iter().map(|s| (*s).to_string()).collect(),
        ..FileRecord::default()
    }
}

#[test]
fn test_one_node_per_file_and_edge_endpoints() {
    let files = vec![
        record("src/a.ts", &["./b", "./missing", "react"]),
        record("src/b.ts", &[]),
        record("src/c.ts", &["./a"]),
    ];
    let graph = graph::build(&files, &BuildConfig::default()).unwrap();

    assert_eq!(graph.nodes.len(), files.len());
    for file in &files {
        assert!(graph.node(&file.path).is_some(), "missing node for {}", file.path);
    }
    for edge in &graph.edges {
        assert!(graph.node(&edge.from).is_some());
        assert!(graph.node(&edge.to).is_some());
    }
    // Unresolvable imports are external: no edge, no error.
    assert_eq!(graph.edges.len(), 2);
}

#[test]
fn test_identical_inputs_identical_output() {
    let files = vec![
        record("src/a.ts", &["./b", "./c"]),
        record("src/b.ts", &["./c"]),
        record("src/c.ts", &[]),
    ];
    let first = graph::build(&files, &BuildConfig::default()).unwrap();
    let second = graph::build(&files, &BuildConfig::default()).unwrap();

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap(),
        "two builds over identical inputs must serialize identically"
    );
}

#[test]
fn test_duplicate_import_deduplicated() {
    let files = vec![record("src/a.ts", &["./b", "./b.ts", "./b"]), record("src/b.ts", &[])];
    let graph = graph::build(&files, &BuildConfig::default()).unwrap();

    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.node("src/a.ts").unwrap().imports.len(), 1);
    assert_eq!(graph.node("src/b.ts").unwrap().imported_by.len(), 1);
}

#[test]
fn test_self_import_skipped() {
    let files = vec![record("src/a.ts", &["./a"])];
    let graph = graph::build(&files, &BuildConfig::default()).unwrap();
    assert!(graph.edges.is_empty());
    assert!(graph.cycles.is_empty());
}

#[test]
fn test_edge_kind_classification() {
    let files = vec![
        record("src/app.ts", &["./theme.css", "./data.json", "./util"]),
        record("src/theme.css", &[]),
        record("src/data.json", &[]),
        record("src/util.ts", &[]),
    ];
    let graph = graph::build(&files, &BuildConfig::default()).unwrap();

    let kinds: Vec<EdgeKind> = graph.edges.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EdgeKind::Style, EdgeKind::Data, EdgeKind::Module]);
}

#[test]
fn test_relative_cycle_detected() {
    let files = vec![
        record("src/a.ts", &["./b"]),
        record("src/b.ts", &["./c"]),
        record("src/c.ts", &["./a"]),
    ];
    let graph = graph::build(&files, &BuildConfig::default()).unwrap();

    assert_eq!(graph.cycles.len(), 1);
    assert_eq!(graph.cycles[0].files.len(), 3);
    assert_eq!(graph.totals.circular_count, 1);
}

#[test]
fn test_empty_input() {
    let graph = graph::build(&[], &BuildConfig::default()).unwrap();
    assert_eq!(graph.totals.module_count, 0);
    assert_eq!(graph.totals.avg_coupling, 0.0);
    assert_eq!(graph.totals.avg_instability, 0.0);
}

#[test]
fn test_empty_path_is_hard_error() {
    let files = vec![record("", &[])];
    assert!(graph::build(&files, &BuildConfig::default()).is_err());
}

#[test]
fn test_hub_candidates_ranked() {
    let files = vec![
        record("src/a.ts", &["./hub"]),
        record("src/b.ts", &["./hub"]),
        record("src/c.ts", &["./hub", "./a"]),
        record("src/hub.ts", &[]),
    ];
    let graph = graph::build(&files, &BuildConfig::default()).unwrap();

    let hubs = graph.hub_candidates(2);
    assert_eq!(hubs.first(), Some(&("src/hub.ts", 3)));
}
