//! Line parser for the flow DSL.
//!
//! Per non-empty, non-comment line, recognizes four shapes:
//!
//! ```text
//! <source> [<amount>] <target>          flow
//! <source> [<amount>, <comp>] <target>  flow with comparison
//! <name> :<hexcolor>                    node color declaration
//! labelmove <name> <dx>, <dy>           persisted label offset
//! ```
//!
//! Malformed lines are silently skipped; links that would close a directed
//! cycle are dropped (first-seen edges win); duplicate `(source, target)`
//! pairs are aggregated after all lines are read.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::Parser;
use super::base::{classify_comparison, parse_amount, parse_hex_color, split_bracket_content};
use super::builder::GraphBuilder;
use crate::syntax::{FlowGraph, normalize_name};

static FLOW_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\[(.+?)\]\s*(.+?)\s*$").unwrap());
static COLOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*:\s*(#?[0-9a-fA-F]{3,6})\s*$").unwrap());
static LABELMOVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^labelmove\s+(\S+)\s+(-?[0-9][0-9.eE+-]*)\s*,\s*(-?[0-9][0-9.eE+-]*)\s*$")
        .unwrap()
});

/// A persisted label offset parsed from a `labelmove` line.
///
/// Offsets are relative to the node's computed label anchor, so they stay
/// valid no matter where layout later places the node.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMove {
    /// Normalized node id the offset belongs to.
    pub node: String,
    pub dx: f64,
    pub dy: f64,
}

/// Everything a DSL document carries: the flow graph plus label offsets
/// destined for the override store (never for the graph itself).
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    pub graph: FlowGraph,
    pub label_moves: Vec<LabelMove>,
}

/// Line-oriented parser for the flow DSL.
pub struct FlowParser;

impl Parser for FlowParser {
    fn parse_document(&self, src: &str) -> Option<ParsedDocument> {
        let mut builder = GraphBuilder::new();
        let mut label_moves: Vec<LabelMove> = Vec::new();

        for raw in src.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
                continue;
            }

            if let Some(caps) = LABELMOVE_RE.captures(line) {
                let (Ok(dx), Ok(dy)) = (caps[2].parse::<f64>(), caps[3].parse::<f64>()) else {
                    debug!("skipping labelmove line with bad offsets: {line}");
                    continue;
                };
                label_moves.push(LabelMove {
                    node: normalize_name(&caps[1]),
                    dx,
                    dy,
                });
                continue;
            }

            if let Some(caps) = FLOW_RE.captures(line) {
                let (amount_raw, comparison_raw) = split_bracket_content(&caps[2]);
                let Some(value) = parse_amount(amount_raw) else {
                    debug!("skipping flow line with unparseable amount: {line}");
                    continue;
                };
                let comparison = comparison_raw.and_then(classify_comparison);
                builder.add_flow(&caps[1], &caps[3], value, comparison);
                continue;
            }

            if let Some(caps) = COLOR_RE.captures(line) {
                if let Some(color) = parse_hex_color(&caps[2]) {
                    builder.declare_color(&caps[1], color);
                    continue;
                }
            }

            debug!("skipping unrecognized line: {line}");
        }

        builder.finish().map(|graph| ParsedDocument {
            graph,
            label_moves,
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
