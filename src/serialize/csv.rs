//! CSV import/export: `Source,Target,Amount,Comparison,Color`, one flow per
//! row. The header row is optional on import; fields follow RFC-4180 style
//! quoting so names may contain commas.

use log::debug;

use super::{ImportError, fmt_num};
use crate::parsers::base::classify_comparison;
use crate::parsers::base::parse_amount;
use crate::parsers::base::parse_hex_color;
use crate::parsers::builder::GraphBuilder;
use crate::syntax::FlowGraph;

pub const CSV_HEADER: &str = "Source,Target,Amount,Comparison,Color";

/// Export every flow as one CSV row. The Comparison column carries the raw
/// previous value when one exists, otherwise the literal comparison label.
/// The Color column carries the source node's declared color.
pub fn to_csv(graph: &FlowGraph) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for link in &graph.links {
        let name = |id: &str| {
            graph
                .node(id)
                .map(|n| n.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        let comparison = match (link.previous_value, &link.comparison) {
            (Some(prev), _) => fmt_num(prev),
            (None, Some(label)) => label.clone(),
            (None, None) => String::new(),
        };
        let color = graph
            .node(&link.source)
            .and_then(|n| n.color.clone())
            .unwrap_or_default();
        let fields = [
            name(&link.source),
            name(&link.target),
            fmt_num(link.value),
            comparison,
            color,
        ];
        let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// Import CSV rows into a flow graph, with the same forgiving semantics as
/// the DSL parser: bad rows are skipped, cycles dropped, duplicates merged.
pub fn from_csv(src: &str) -> Result<FlowGraph, ImportError> {
    let mut builder = GraphBuilder::new();
    let mut saw_first = false;
    for raw in src.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if !saw_first {
            saw_first = true;
            if looks_like_header(line) {
                continue;
            }
        }
        let fields = split_row(line);
        if fields.len() < 3 {
            debug!("skipping short CSV row: {line}");
            continue;
        }
        let Some(amount) = parse_amount(&fields[2]) else {
            debug!("skipping CSV row with unparseable amount: {line}");
            continue;
        };
        let comparison = fields
            .get(3)
            .filter(|f| !f.trim().is_empty())
            .and_then(|f| classify_comparison(f));
        if let Some(color) = fields
            .get(4)
            .filter(|f| !f.trim().is_empty())
            .and_then(|f| parse_hex_color(f))
        {
            builder.declare_color(&fields[0], color);
        }
        builder.add_flow(&fields[0], &fields[1], amount, comparison);
    }
    builder.finish().ok_or(ImportError::EmptyDocument)
}

/// Header detection: the first line mentions a from/source or to/target
/// column name instead of data.
fn looks_like_header(line: &str) -> bool {
    let lower = line.to_lowercase();
    ["from", "source", "to", "target"]
        .iter()
        .any(|k| lower.contains(k))
}

fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split one CSV row into fields, honoring double-quoted fields with `""`
/// escapes.
fn split_row(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(field.trim().to_string());
                field = String::new();
            }
            _ => field.push(ch),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

// ─── Tests ───────────────────────────────────────────────────────────────────
