// src/graph/cycles.rs
//! Circular-dependency detection.
//!
//! Three-color depth-first search over the import adjacency relation, driven
//! by an explicit heap-allocated work stack so pathological import chains
//! cannot exhaust the call stack. Each distinct back-edge yields its own
//! [`CircularDependency`]; overlapping cycles through a shared node are
//! reported separately, not merged into one strongly-connected component.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::GraphNode;

/// One detected dependency cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircularDependency {
    /// Files participating in the cycle, deduplicated, in walk order.
    pub files: Vec<String>,
    /// The closed walk, ending back at its first element.
    pub walk: Vec<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Detects cycles over the nodes' import lists. O(V+E).
#[must_use]
pub fn detect(nodes: &[GraphNode], index: &HashMap<String, usize>) -> Vec<CircularDependency> {
    let mut color = vec![Color::White; nodes.len()];
    let mut parent: Vec<Option<usize>> = vec![None; nodes.len()];
    let mut cycles = Vec::new();

    for root in 0..nodes.len() {
        if color[root] != Color::White {
            continue;
        }
        color[root] = Color::Gray;
        // (node, next import offset) frames replace native recursion.
        let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let (node, offset) = (frame.0, frame.1);
            let imports = &nodes[node].imports;

            if offset >= imports.len() {
                color[node] = Color::Black;
                stack.pop();
                continue;
            }
            frame.1 += 1;

            let Some(&target) = index.get(&imports[offset]) else {
                continue;
            };
            match color[target] {
                Color::White => {
                    parent[target] = Some(node);
                    color[target] = Color::Gray;
                    stack.push((target, 0));
                }
                Color::Gray => cycles.push(reconstruct(node, target, &parent, nodes)),
                Color::Black => {}
            }
        }
    }

    cycles
}

/// Walks parent pointers from `from` back to `to` (the gray neighbor), then
/// reverses into cycle order and closes the walk.
fn reconstruct(
    from: usize,
    to: usize,
    parent: &[Option<usize>],
    nodes: &[GraphNode],
) -> CircularDependency {
    let mut chain = vec![from];
    let mut cursor = from;
    while cursor != to {
        match parent[cursor] {
            Some(prev) => {
                chain.push(prev);
                cursor = prev;
            }
            None => break,
        }
    }
    chain.reverse();

    let mut files: Vec<String> = Vec::new();
    for &idx in &chain {
        let path = &nodes[idx].path;
        if !files.contains(path) {
            files.push(path.clone());
        }
    }

    let mut walk: Vec<String> = chain.iter().map(|&idx| nodes[idx].path.clone()).collect();
    walk.push(nodes[to].path.clone());

    CircularDependency { files, walk }
}
