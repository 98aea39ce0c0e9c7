//! JSON export schema: the full document a saved diagram round-trips
//! through (flow model, override records, independent annotations, and
//! settings). Import validates structure and link semantics and reports
//! failures as values.

use serde::{Deserialize, Serialize};

use super::ImportError;
use crate::config::DiagramConfig;
use crate::overrides::{OverrideRecord, OverrideStore};
use crate::syntax::{Annotation, FlowGraph, Link, Node};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    #[serde(
        rename = "nodeCustomizations",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub node_customizations: Vec<OverrideRecord>,
    #[serde(
        rename = "independentLabels",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub independent_labels: Vec<Annotation>,
    #[serde(default)]
    pub settings: DiagramConfig,
}

impl Document {
    pub fn from_parts(
        graph: &FlowGraph,
        store: &OverrideStore,
        annotations: &[Annotation],
        settings: &DiagramConfig,
    ) -> Self {
        Self {
            nodes: graph.nodes.clone(),
            links: graph.links.clone(),
            node_customizations: store.records().cloned().collect(),
            independent_labels: annotations.to_vec(),
            settings: settings.clone(),
        }
    }

    pub fn graph(&self) -> FlowGraph {
        FlowGraph {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
        }
    }

    pub fn store(&self) -> OverrideStore {
        OverrideStore::from_records(self.node_customizations.clone())
    }
}

pub fn export_json(doc: &Document) -> serde_json::Result<String> {
    serde_json::to_string_pretty(doc)
}

/// Parse and validate an exported document.
///
/// Shape errors (missing arrays, wrong types) come back as
/// [`ImportError::Json`]; semantically broken links (empty endpoints,
/// non-positive values) as [`ImportError::InvalidLink`]. Never panics.
pub fn import_json(src: &str) -> Result<Document, ImportError> {
    let doc: Document = serde_json::from_str(src)?;
    for (index, link) in doc.links.iter().enumerate() {
        validate_link(index, link)?;
    }
    Ok(doc)
}

fn validate_link(index: usize, link: &Link) -> Result<(), ImportError> {
    if link.source.trim().is_empty() || link.target.trim().is_empty() {
        return Err(ImportError::InvalidLink {
            index,
            reason: "source and target must be non-empty strings".to_string(),
        });
    }
    if !link.value.is_finite() || link.value <= 0.0 {
        return Err(ImportError::InvalidLink {
            index,
            reason: format!("value must be a positive number, got {}", link.value),
        });
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{OverrideKind, Position};
    use crate::parsers::parse;

    fn sample() -> Document {
        let graph = parse("Salary :#ff0000\nSalary [1500, 1400] Budget").expect("parses");
        let mut store = OverrideStore::new();
        store.commit_move("budget", OverrideKind::node(), Position::new(10.0, 20.0));
        let annotations = vec![Annotation::text("note1", 5.0, 5.0, "hi")];
        Document::from_parts(&graph, &store, &annotations, &DiagramConfig::default())
    }

    #[test]
    fn test_json_round_trip() {
        let doc = sample();
        let json = export_json(&doc).expect("serialize");
        let back = import_json(&json).expect("import");
        assert_eq!(back, doc);
    }

    #[test]
    fn test_export_uses_schema_names() {
        let json = export_json(&sample()).expect("serialize");
        assert!(json.contains("\"nodeCustomizations\""));
        assert!(json.contains("\"independentLabels\""));
        assert!(json.contains("\"previousValue\""));
        assert!(json.contains("\"currentPosition\""));
    }

    #[test]
    fn test_import_minimal_document() {
        let doc = import_json(
            r#"{"nodes":[{"id":"a","name":"A"}],"links":[{"source":"a","target":"b","value":3}]}"#,
        )
        .expect("minimal import");
        assert_eq!(doc.links.len(), 1);
        assert!(doc.node_customizations.is_empty());
        assert_eq!(doc.settings, DiagramConfig::default());
    }

    #[test]
    fn test_import_malformed_json() {
        assert!(matches!(import_json("{"), Err(ImportError::Json(_))));
        assert!(matches!(
            import_json(r#"{"nodes":{},"links":[]}"#),
            Err(ImportError::Json(_))
        ));
    }

    #[test]
    fn test_import_rejects_bad_link() {
        let err = import_json(
            r#"{"nodes":[],"links":[{"source":"a","target":"b","value":-1}]}"#,
        )
        .expect_err("negative value");
        assert!(matches!(err, ImportError::InvalidLink { index: 0, .. }));

        let err = import_json(
            r#"{"nodes":[],"links":[{"source":"","target":"b","value":1}]}"#,
        )
        .expect_err("empty source");
        assert!(matches!(err, ImportError::InvalidLink { .. }));
    }

    #[test]
    fn test_store_rebuilt_from_document() {
        let doc = sample();
        let store = doc.store();
        let rec = store.get("budget").expect("record restored");
        assert!(rec.customized);
        assert_eq!(rec.current, Position::new(10.0, 20.0));
    }
}
