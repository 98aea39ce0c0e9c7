//! Layout engine adapter.
//!
//! The editor treats the layout algorithm as a collaborator behind the
//! `LayoutEngine` trait; `ColumnLayout` is the built-in deterministic
//! implementation (longest-path columns, value-proportional heights,
//! stacked link ribbons). `route_links` re-derives ribbon endpoints from
//! final node rectangles, which is how override-driven node moves propagate
//! to the links that touch them.

pub mod types;

use std::collections::HashMap;

use thiserror::Error;

pub use types::{LayoutLink, LayoutNode, LayoutResult};

use crate::config::DiagramConfig;
use crate::graph::FlowIR;
use crate::syntax::{FlowGraph, Link};

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("flow graph contains a directed cycle; layout requires a DAG")]
    Cyclic,
}

/// Pluggable layout algorithm.
pub trait LayoutEngine {
    fn layout(&self, graph: &FlowGraph, config: &DiagramConfig) -> Result<LayoutResult, LayoutError>;
}

/// Run the built-in engine with the given config.
pub fn full_layout(graph: &FlowGraph, config: &DiagramConfig) -> Result<LayoutResult, LayoutError> {
    ColumnLayout.layout(graph, config)
}

/// Deterministic columnar Sankey layout.
pub struct ColumnLayout;

impl LayoutEngine for ColumnLayout {
    fn layout(&self, graph: &FlowGraph, config: &DiagramConfig) -> Result<LayoutResult, LayoutError> {
        if graph.nodes.is_empty() {
            return Ok(LayoutResult::default());
        }
        let ir = FlowIR::from_graph(graph);
        let topo = ir.topological_order().ok_or(LayoutError::Cyclic)?;

        // Longest path from a source decides the column.
        let mut incoming: HashMap<&str, Vec<&str>> = HashMap::new();
        for link in &graph.links {
            incoming
                .entry(link.target.as_str())
                .or_default()
                .push(link.source.as_str());
        }
        let mut layer: HashMap<String, usize> = HashMap::new();
        for id in &topo {
            let depth = incoming
                .get(id.as_str())
                .map(|sources| {
                    sources
                        .iter()
                        .map(|s| layer.get(*s).copied().unwrap_or(0) + 1)
                        .max()
                        .unwrap_or(0)
                })
                .unwrap_or(0);
            layer.insert(id.clone(), depth);
        }
        let max_layer = layer.values().copied().max().unwrap_or(0);

        // Pure sinks sit in the last column.
        for node in &graph.nodes {
            if ir.out_value(&node.id) == 0.0 && ir.in_value(&node.id) > 0.0 {
                layer.insert(node.id.clone(), max_layer);
            }
        }

        // Node throughput and column membership (materialization order keeps
        // the stacking stable across renders).
        let mut columns: Vec<Vec<&str>> = vec![Vec::new(); max_layer + 1];
        let mut value: HashMap<&str, f64> = HashMap::new();
        for node in &graph.nodes {
            let v = ir.in_value(&node.id).max(ir.out_value(&node.id));
            value.insert(node.id.as_str(), v);
            columns[layer[&node.id]].push(node.id.as_str());
        }

        // One global vertical scale so equal values get equal heights.
        let mut scale = f64::INFINITY;
        for column in &columns {
            let sum: f64 = column.iter().map(|id| value[id]).sum();
            if sum > 0.0 {
                let padding = config.node_padding * column.len().saturating_sub(1) as f64;
                scale = scale.min((config.height - padding).max(0.0) / sum);
            }
        }
        if !scale.is_finite() {
            scale = 1.0;
        }

        let step = if max_layer == 0 {
            0.0
        } else {
            (config.width - config.node_width) / max_layer as f64
        };

        let mut nodes: Vec<LayoutNode> = Vec::new();
        for (col, members) in columns.iter().enumerate() {
            let mut y = 0.0;
            for id in members {
                let height = value[id] * scale;
                let x0 = col as f64 * step;
                nodes.push(LayoutNode {
                    id: id.to_string(),
                    x0,
                    y0: y,
                    x1: x0 + config.node_width,
                    y1: y + height,
                    value: value[id],
                    layer: col,
                });
                y += height + config.node_padding;
            }
        }

        let links = route_links(&nodes, &graph.links, scale);
        Ok(LayoutResult { nodes, links, scale })
    }
}

/// Re-derive link ribbon endpoints from node rectangles.
///
/// Outgoing ribbons stack from the top of the source rect, incoming ribbons
/// from the top of the target rect, both in link declaration order. Called
/// once by the engine and again by reconciliation after overrides move nodes.
pub fn route_links(nodes: &[LayoutNode], links: &[Link], scale: f64) -> Vec<LayoutLink> {
    let rect: HashMap<&str, &LayoutNode> = nodes.iter().map(|n| (n.id.as_str(), n)).collect();
    let mut out_cursor: HashMap<&str, f64> = HashMap::new();
    let mut in_cursor: HashMap<&str, f64> = HashMap::new();
    let mut routed = Vec::with_capacity(links.len());
    for link in links {
        let (Some(source), Some(target)) =
            (rect.get(link.source.as_str()), rect.get(link.target.as_str()))
        else {
            continue;
        };
        let width = link.value * scale;
        let so = out_cursor.entry(link.source.as_str()).or_insert(0.0);
        let sy = source.y0 + *so + width / 2.0;
        *so += width;
        let ti = in_cursor.entry(link.target.as_str()).or_insert(0.0);
        let ty = target.y0 + *ti + width / 2.0;
        *ti += width;
        routed.push(LayoutLink {
            source: link.source.clone(),
            target: link.target.clone(),
            value: link.value,
            sy,
            ty,
            width,
        });
    }
    routed
}

// ─── Tests ───────────────────────────────────────────────────────────────────
