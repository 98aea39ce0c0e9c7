//! Data structures for the flow graph model.
//!
//! These types are the validated output of the DSL parser and the input to
//! layout: enums (NodeCategory, AnnotationKind) and structs (Node, Link,
//! FlowGraph, Annotation). Everything is serde-serializable because the
//! JSON export schema carries the model verbatim.

use serde::{Deserialize, Serialize};

// ─── NodeCategory ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeCategory {
    Revenue,
    Expense,
    Profit,
    #[default]
    Neutral,
}

// ─── Node ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Stable identifier derived from the name (lowercase, whitespace → `_`).
    pub id: String,
    /// Display name as first written by the user.
    pub name: String,
    /// Explicitly declared color. `None` means "use the palette".
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub color: Option<String>,
    #[serde(default)]
    pub category: NodeCategory,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: None,
            category: NodeCategory::Neutral,
        }
    }
}

// ─── Link ────────────────────────────────────────────────────────────────────

/// A directed, weighted flow between two nodes.
///
/// `previous_value` is the raw prior-period amount when the DSL carried one;
/// `comparison` is the display string (either derived from `previous_value`
/// or written literally by the user).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub source: String,
    pub target: String,
    pub value: f64,
    #[serde(
        rename = "previousValue",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub previous_value: Option<f64>,
    #[serde(
        rename = "comparisonValue",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub comparison: Option<String>,
}

impl Link {
    pub fn new(source: impl Into<String>, target: impl Into<String>, value: f64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            value,
            previous_value: None,
            comparison: None,
        }
    }
}

// ─── FlowGraph ───────────────────────────────────────────────────────────────

/// The validated flow model: single source of truth for flow semantics.
///
/// Invariants (enforced by the parser, assumed by layout): no self-loops,
/// no directed cycles, `(source, target)` pairs unique.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Materialization index of a node, used for palette color cycling.
    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }
}

// ─── Annotation (independent label) ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Text,
    Box,
    Image,
}

/// Free-floating style fields shared by annotation kinds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
}

/// A user-owned element not tied to any node: never produced by the parser,
/// created/moved/deleted only through the editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub kind: AnnotationKind,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub src: Option<String>,
    #[serde(default)]
    pub style: AnnotationStyle,
}

impl Annotation {
    pub fn text(id: impl Into<String>, x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: AnnotationKind::Text,
            x,
            y,
            width: None,
            height: None,
            text: Some(text.into()),
            src: None,
            style: AnnotationStyle::default(),
        }
    }
}

// ─── Row validation ──────────────────────────────────────────────────────────

/// A field-level problem on one editable flow row, surfaced to the editor UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowIssue {
    /// Zero-based row index the issue belongs to.
    pub row: usize,
    /// Offending field name ("source", "target", "amount").
    pub field: &'static str,
    pub message: String,
}

/// Validate editable `(source, target, amount)` rows without aborting on the
/// first problem. Issues are attached to rows; valid rows are unaffected.
pub fn validate_rows(rows: &[(String, String, f64)]) -> Vec<RowIssue> {
    let mut issues = Vec::new();
    for (i, (source, target, amount)) in rows.iter().enumerate() {
        if source.trim().is_empty() {
            issues.push(RowIssue {
                row: i,
                field: "source",
                message: "source is empty".to_string(),
            });
        }
        if target.trim().is_empty() {
            issues.push(RowIssue {
                row: i,
                field: "target",
                message: "target is empty".to_string(),
            });
        }
        if *amount <= 0.0 || !amount.is_finite() {
            issues.push(RowIssue {
                row: i,
                field: "amount",
                message: format!("amount must be a positive number, got {amount}"),
            });
        }
        if !source.trim().is_empty()
            && crate::syntax::normalize_name(source) == crate::syntax::normalize_name(target)
        {
            issues.push(RowIssue {
                row: i,
                field: "target",
                message: "a flow cannot point back at its own source".to_string(),
            });
        }
    }
    issues
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_new() {
        let n = Node::new("salary", "Salary");
        assert_eq!(n.id, "salary");
        assert_eq!(n.name, "Salary");
        assert!(n.color.is_none());
        assert_eq!(n.category, NodeCategory::Neutral);
    }

    #[test]
    fn test_link_new() {
        let l = Link::new("a", "b", 10.0);
        assert_eq!(l.source, "a");
        assert_eq!(l.target, "b");
        assert_eq!(l.value, 10.0);
        assert!(l.previous_value.is_none());
        assert!(l.comparison.is_none());
    }

    #[test]
    fn test_flow_graph_lookup() {
        let mut g = FlowGraph::new();
        g.nodes.push(Node::new("a", "A"));
        g.nodes.push(Node::new("b", "B"));
        assert_eq!(g.node("b").map(|n| n.name.as_str()), Some("B"));
        assert_eq!(g.node_index("b"), Some(1));
        assert!(g.node("zzz").is_none());
    }

    #[test]
    fn test_validate_rows_empty_endpoints() {
        let rows = vec![("".to_string(), "b".to_string(), 5.0)];
        let issues = validate_rows(&rows);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "source");
    }

    #[test]
    fn test_validate_rows_non_positive_amount() {
        let rows = vec![
            ("a".to_string(), "b".to_string(), 0.0),
            ("a".to_string(), "c".to_string(), -3.0),
        ];
        let issues = validate_rows(&rows);
        assert_eq!(issues.len(), 2);
        assert!(issues.iter().all(|i| i.field == "amount"));
    }

    #[test]
    fn test_validate_rows_self_flow() {
        let rows = vec![("Budget".to_string(), "budget".to_string(), 5.0)];
        let issues = validate_rows(&rows);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "target");
    }

    #[test]
    fn test_validate_rows_reports_all_rows() {
        let rows = vec![
            ("a".to_string(), "b".to_string(), 1.0),
            ("".to_string(), "".to_string(), f64::NAN),
        ];
        let issues = validate_rows(&rows);
        // second row: empty source, empty target, bad amount
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.row == 1));
    }

    #[test]
    fn test_annotation_text_helper() {
        let a = Annotation::text("note1", 10.0, 20.0, "hello");
        assert_eq!(a.kind, AnnotationKind::Text);
        assert_eq!(a.text.as_deref(), Some("hello"));
        assert!(a.src.is_none());
    }

    #[test]
    fn test_category_serde_lowercase() {
        let s = serde_json::to_string(&NodeCategory::Revenue).expect("serialize");
        assert_eq!(s, "\"revenue\"");
    }
}
