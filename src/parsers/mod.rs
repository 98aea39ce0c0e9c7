//! Flow DSL parsing — trait seam plus convenience entry points.

pub mod base;
pub mod builder;
pub mod flow;

pub use base::{Comparison, classify_comparison, delta_label, parse_amount, parse_hex_color};
pub use flow::{FlowParser, LabelMove, ParsedDocument};

use crate::syntax::FlowGraph;

/// Trait for flow-document parsers (DSL today, other text shapes later).
pub trait Parser {
    /// Parse input into a document, or None when no valid link survives.
    fn parse_document(&self, src: &str) -> Option<ParsedDocument>;
}

/// Parse DSL text into a flow graph. None when zero valid links were found.
pub fn parse(src: &str) -> Option<FlowGraph> {
    parse_document(src).map(|doc| doc.graph)
}

/// Parse DSL text into a full document (graph + persisted label offsets).
pub fn parse_document(src: &str) -> Option<ParsedDocument> {
    FlowParser.parse_document(src)
}
