//! Layout output types consumed by the reconciliation layer.

use serde::Serialize;

/// A node with its computed rectangular extent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    pub id: String,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    /// Throughput used for vertical sizing: max(inflow, outflow).
    pub value: f64,
    /// Horizontal column index.
    pub layer: usize,
}

impl LayoutNode {
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// A link ribbon: vertical center offsets at each endpoint plus thickness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutLink {
    pub source: String,
    pub target: String,
    pub value: f64,
    /// Ribbon center y at the source's right edge.
    pub sy: f64,
    /// Ribbon center y at the target's left edge.
    pub ty: f64,
    pub width: f64,
}

/// The full output of one layout pass.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayoutResult {
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<LayoutLink>,
    /// Vertical units per flow unit; link widths are `value * scale`.
    pub scale: f64,
}
