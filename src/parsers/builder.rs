//! Shared graph construction for the DSL parser and CSV import: node
//! materialization, cycle-gated link admission, duplicate aggregation.

use std::collections::HashMap;

use log::{debug, warn};

use super::base::{Comparison, delta_label};
use crate::graph::FlowIR;
use crate::syntax::{FlowGraph, Link, Node, normalize_name};

#[derive(Default)]
pub struct GraphBuilder {
    nodes: Vec<Node>,
    node_slot: HashMap<String, usize>,
    colors: HashMap<String, String>,
    links: Vec<Link>,
    ir: FlowIR,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a name → color mapping, applied when the graph is finished.
    /// The last declaration for a name wins.
    pub fn declare_color(&mut self, name_raw: &str, color: String) {
        self.colors.insert(normalize_name(name_raw), color);
    }

    /// Admit one candidate flow. Returns false when the flow is rejected:
    /// non-positive value, self-loop, or an edge that would close a cycle
    /// against already-admitted links (first-seen edges win).
    pub fn add_flow(
        &mut self,
        source_raw: &str,
        target_raw: &str,
        value: f64,
        comparison: Option<Comparison>,
    ) -> bool {
        if !value.is_finite() || value <= 0.0 {
            debug!("skipping flow with non-positive amount {value}");
            return false;
        }
        let source = normalize_name(source_raw);
        let target = normalize_name(target_raw);
        if source.is_empty() || target.is_empty() {
            return false;
        }
        if source == target {
            warn!("dropping self-loop flow on '{source}'");
            return false;
        }
        if self.ir.would_cycle(&source, &target) {
            warn!("dropping flow {source} -> {target}: it would close a cycle");
            return false;
        }

        self.materialize(&source, source_raw);
        self.materialize(&target, target_raw);

        let mut link = Link::new(source.clone(), target.clone(), value);
        match comparison {
            Some(Comparison::Previous(previous)) => {
                link.previous_value = Some(previous);
                link.comparison = Some(delta_label(value, previous));
            }
            Some(Comparison::Label(label)) => {
                link.comparison = Some(label);
            }
            None => {}
        }

        self.ir.add_link(&source, &target, value);
        self.links.push(link);
        true
    }

    /// First reference to a name creates the node; later references reuse it.
    fn materialize(&mut self, id: &str, display: &str) {
        if self.node_slot.contains_key(id) {
            return;
        }
        self.node_slot.insert(id.to_string(), self.nodes.len());
        self.nodes.push(Node::new(id, display.trim()));
    }

    /// Aggregate duplicates, apply colors, drop orphaned nodes.
    /// Returns None when no valid link survived.
    pub fn finish(mut self) -> Option<FlowGraph> {
        let links = aggregate_links(self.links);

        for node in &mut self.nodes {
            if let Some(color) = self.colors.get(&node.id) {
                node.color = Some(color.clone());
            }
        }
        // color declarations for names no flow references are dropped
        self.nodes
            .retain(|n| links.iter().any(|l| l.source == n.id || l.target == n.id));

        if self.nodes.is_empty() || links.is_empty() {
            return None;
        }
        Some(FlowGraph {
            nodes: self.nodes,
            links,
        })
    }
}

/// Merge links sharing a `(source, target)` pair by summing values.
///
/// When both sides carry a raw previous value those are summed too and the
/// derived comparison string is dropped: it no longer describes the merged
/// pair and the caller must recompute it if needed.
fn aggregate_links(links: Vec<Link>) -> Vec<Link> {
    let mut merged: Vec<Link> = Vec::new();
    let mut slot: HashMap<(String, String), usize> = HashMap::new();
    for link in links {
        let key = (link.source.clone(), link.target.clone());
        match slot.get(&key) {
            None => {
                slot.insert(key, merged.len());
                merged.push(link);
            }
            Some(&i) => {
                let kept = &mut merged[i];
                kept.value += link.value;
                match (kept.previous_value, link.previous_value) {
                    (Some(a), Some(b)) => {
                        kept.previous_value = Some(a + b);
                        debug!(
                            "aggregated duplicate {} -> {}: stale comparison dropped",
                            kept.source, kept.target
                        );
                        kept.comparison = None;
                    }
                    (None, Some(b)) => kept.previous_value = Some(b),
                    _ => {}
                }
                if kept.comparison.is_none() && kept.previous_value.is_none() {
                    kept.comparison = link.comparison;
                }
            }
        }
    }
    merged
}

// ─── Tests ───────────────────────────────────────────────────────────────────
