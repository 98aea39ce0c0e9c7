//! Round-trip serialization: flow model ⇄ DSL text, CSV, and JSON export.

pub mod csv;
pub mod json;

use thiserror::Error;

pub use csv::{from_csv, to_csv};
pub use json::{Document, export_json, import_json};

use crate::overrides::{OverrideKind, OverrideStore};
use crate::syntax::FlowGraph;

/// Failures importing a whole document. These are surfaced as values, never
/// panics; the caller decides how to present them.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("link {index}: {reason}")]
    InvalidLink { index: usize, reason: String },
    #[error("no valid flow rows found")]
    EmptyDocument,
}

/// Render a flow value the way the DSL writes it (shortest decimal form).
pub(crate) fn fmt_num(v: f64) -> String {
    format!("{v}")
}

/// Serialize a graph (plus customized label offsets) back to DSL text.
///
/// Emits color declarations for nodes with an explicit color, a blank
/// separator, one flow line per link, then `labelmove` lines. Parsing the
/// result reproduces the graph: same links, colors (case-insensitive),
/// comparisons, and label offsets.
pub fn to_dsl(graph: &FlowGraph, store: &OverrideStore) -> String {
    let mut out = String::new();

    let mut wrote_color = false;
    for node in &graph.nodes {
        if let Some(color) = &node.color {
            out.push_str(&format!("{} :{}\n", node.name, color));
            wrote_color = true;
        }
    }
    if wrote_color {
        out.push('\n');
    }

    let display = |id: &str| {
        graph
            .node(id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| id.to_string())
    };
    for link in &graph.links {
        let content = if let Some(prev) = link.previous_value {
            format!("{}, {}", fmt_num(link.value), fmt_num(prev))
        } else if let Some(comp) = &link.comparison {
            format!("{}, {}", fmt_num(link.value), comp)
        } else {
            fmt_num(link.value)
        };
        out.push_str(&format!(
            "{} [{}] {}\n",
            display(&link.source),
            content,
            display(&link.target)
        ));
    }

    for record in store.records() {
        if !record.customized {
            continue;
        }
        if let OverrideKind::Label(label) = &record.kind {
            if let Some(node) = record.id.strip_suffix("/label") {
                out.push_str(&format!(
                    "labelmove {} {}, {}\n",
                    node,
                    fmt_num(label.dx),
                    fmt_num(label.dy)
                ));
            }
        }
    }

    out
}

// ─── Tests ───────────────────────────────────────────────────────────────────
