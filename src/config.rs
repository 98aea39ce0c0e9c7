//! Configuration for the layout and reconciliation pipeline.

use serde::{Deserialize, Serialize};

/// Default categorical palette applied to nodes without an explicit color.
pub const DEFAULT_PALETTE: &[&str] = &[
    "#4e79a7", "#f28e2b", "#e15759", "#76b7b2", "#59a14f", "#edc948", "#b07aa1", "#ff9da7",
    "#9c755f", "#bab0ac",
];

/// Tunable settings for one diagram instance.
///
/// Carried inside the JSON export so a saved document re-renders the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    /// Total drawing width in user units.
    pub width: f64,
    /// Total drawing height in user units.
    pub height: f64,
    /// Horizontal thickness of each node rectangle.
    pub node_width: f64,
    /// Vertical gap between stacked nodes in the same column.
    pub node_padding: f64,
    /// Prefix prepended to formatted values (e.g. "$").
    pub value_prefix: String,
    /// Horizontal gap between a node's right edge and its label anchor.
    pub label_gap: f64,
    /// Node colors cycled by materialization index when no color is declared.
    pub palette: Vec<String>,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 540.0,
            node_width: 24.0,
            node_padding: 12.0,
            value_prefix: String::new(),
            label_gap: 8.0,
            palette: DEFAULT_PALETTE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DiagramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the render color for a node: its declared color if present,
    /// otherwise the palette entry for its materialization index.
    pub fn node_color(&self, index: usize, declared: Option<&str>) -> String {
        if let Some(c) = declared {
            return c.to_string();
        }
        if self.palette.is_empty() {
            return "#888888".to_string();
        }
        self.palette[index % self.palette.len()].clone()
    }
}
