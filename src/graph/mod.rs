//! FlowIR — petgraph-backed view of the flow model for invariant checks.
//!
//! Supports incremental construction (the parser gates candidate links on a
//! reachability query before admitting them) as well as whole-graph analysis:
//! DAG check, topological order, per-node value balance.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::NodeIndexable;

use crate::syntax::FlowGraph;

/// One interior node whose inflow and outflow disagree beyond tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBalance {
    pub id: String,
    pub inflow: f64,
    pub outflow: f64,
    /// `outflow - inflow`; positive means the node emits more than it receives.
    pub delta: f64,
}

/// Directed graph of admitted flows, node weights are ids, edge weights values.
#[derive(Debug, Default)]
pub struct FlowIR {
    pub digraph: DiGraph<String, f64>,
    /// Maps node id → petgraph NodeIndex.
    pub node_index: HashMap<String, NodeIndex>,
}

impl FlowIR {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_graph(graph: &FlowGraph) -> Self {
        let mut ir = Self::new();
        for node in &graph.nodes {
            ir.ensure_node(&node.id);
        }
        for link in &graph.links {
            ir.add_link(&link.source, &link.target, link.value);
        }
        ir
    }

    pub fn node_count(&self) -> usize {
        self.digraph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.digraph.edge_count()
    }

    /// Add the node if absent; returns its index either way.
    pub fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(id) {
            return idx;
        }
        let idx = self.digraph.add_node(id.to_string());
        self.node_index.insert(id.to_string(), idx);
        idx
    }

    /// Add a directed flow edge, creating missing endpoints.
    pub fn add_link(&mut self, source: &str, target: &str, value: f64) {
        let s = self.ensure_node(source);
        let t = self.ensure_node(target);
        self.digraph.add_edge(s, t, value);
    }

    /// Whether a directed path `from → ... → to` exists among admitted links.
    ///
    /// Iterative DFS with an explicit stack so large pasted datasets cannot
    /// overflow the call stack.
    pub fn reaches(&self, from: &str, to: &str) -> bool {
        let (Some(&start), Some(&goal)) = (self.node_index.get(from), self.node_index.get(to))
        else {
            return false;
        };
        if start == goal {
            return true;
        }
        let mut visited = vec![false; self.digraph.node_bound()];
        let mut stack = vec![start];
        while let Some(idx) = stack.pop() {
            if visited[idx.index()] {
                continue;
            }
            visited[idx.index()] = true;
            for next in self.digraph.neighbors(idx) {
                if next == goal {
                    return true;
                }
                if !visited[next.index()] {
                    stack.push(next);
                }
            }
        }
        false
    }

    /// True when admitting `source → target` would close a directed cycle.
    pub fn would_cycle(&self, source: &str, target: &str) -> bool {
        if source == target {
            return true;
        }
        self.reaches(target, source)
    }

    /// Returns true if the graph is a directed acyclic graph (no cycles).
    pub fn is_dag(&self) -> bool {
        !is_cyclic_directed(&self.digraph)
    }

    /// Returns topological order of node ids, or None if the graph has cycles.
    pub fn topological_order(&self) -> Option<Vec<String>> {
        match toposort(&self.digraph, None) {
            Ok(indices) => Some(
                indices
                    .into_iter()
                    .map(|idx| self.digraph[idx].clone())
                    .collect(),
            ),
            Err(_) => None,
        }
    }

    /// Sum of flow values entering the node.
    pub fn in_value(&self, id: &str) -> f64 {
        self.value_sum(id, Direction::Incoming)
    }

    /// Sum of flow values leaving the node.
    pub fn out_value(&self, id: &str) -> f64 {
        self.value_sum(id, Direction::Outgoing)
    }

    fn value_sum(&self, id: &str, dir: Direction) -> f64 {
        match self.node_index.get(id) {
            None => 0.0,
            Some(&idx) => self
                .digraph
                .edges_directed(idx, dir)
                .map(|e| *e.weight())
                .sum(),
        }
    }

    /// Interior nodes (both inflow and outflow present) whose totals disagree
    /// by more than `tolerance`. Pure sources and sinks are never flagged.
    pub fn balance_report(&self, tolerance: f64) -> Vec<NodeBalance> {
        let mut out: Vec<NodeBalance> = self
            .digraph
            .node_indices()
            .filter_map(|idx| {
                let id = &self.digraph[idx];
                let inflow = self.in_value(id);
                let outflow = self.out_value(id);
                if inflow == 0.0 || outflow == 0.0 {
                    return None;
                }
                let delta = outflow - inflow;
                if delta.abs() > tolerance {
                    Some(NodeBalance {
                        id: id.clone(),
                        inflow,
                        outflow,
                        delta,
                    })
                } else {
                    None
                }
            })
            .collect();
        out.sort_by(|a, b| a.id.cmp(&b.id));
        out
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
