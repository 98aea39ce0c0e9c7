//! Canonical in-memory flow model: nodes, links, annotations, row validation.

pub mod types;

pub use types::{
    Annotation, AnnotationKind, AnnotationStyle, FlowGraph, Link, Node, NodeCategory, RowIssue,
    validate_rows,
};

/// Normalize a human-entered node name into a stable identifier:
/// lowercase, runs of whitespace collapsed to a single underscore.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases() {
        assert_eq!(normalize_name("Salary"), "salary");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize_name("Net  Profit"), "net_profit");
        assert_eq!(normalize_name("  Net\tProfit  "), "net_profit");
    }

    #[test]
    fn test_same_name_same_id() {
        assert_eq!(normalize_name("Gross Profit"), normalize_name("gross  PROFIT"));
    }
}
