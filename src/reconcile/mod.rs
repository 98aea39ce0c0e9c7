//! Reconciliation — merge freshly computed layout with persisted overrides.
//!
//! This is the only place allowed to read both the layout output and the
//! override store. For every renderable element: no customized record means
//! "computed position verbatim" (with a bookkeeping snapshot on first
//! sighting); a customized record supersedes the computed placement. Link
//! ribbons are re-routed from the final node rectangles so geometry stays
//! consistent with moved nodes.

use serde::Serialize;

use crate::config::DiagramConfig;
use crate::format::format_value;
use crate::layout::types::{LayoutLink, LayoutNode, LayoutResult};
use crate::layout::route_links;
use crate::overrides::{OverrideKind, OverrideStore, Position, label_id};
use crate::syntax::{Annotation, AnnotationKind, AnnotationStyle, FlowGraph};

// ─── Scene types (handed to the rendering collaborator) ──────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub id: String,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLabel {
    pub id: String,
    /// Node this label belongs to.
    pub node: String,
    pub x: f64,
    pub y: f64,
    pub lines: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedAnnotation {
    pub id: String,
    pub kind: AnnotationKind,
    pub x: f64,
    pub y: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    pub style: AnnotationStyle,
}

/// Final render coordinates for one frame: everything the drawing layer
/// needs, no further layout math required.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Scene {
    pub nodes: Vec<PlacedNode>,
    pub links: Vec<LayoutLink>,
    pub labels: Vec<PlacedLabel>,
    pub annotations: Vec<PlacedAnnotation>,
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

pub fn reconcile(
    graph: &FlowGraph,
    layout: &LayoutResult,
    annotations: &[Annotation],
    store: &mut OverrideStore,
    config: &DiagramConfig,
) -> Scene {
    let mut placed_nodes = Vec::with_capacity(layout.nodes.len());
    let mut final_rects: Vec<LayoutNode> = Vec::with_capacity(layout.nodes.len());

    for ln in &layout.nodes {
        let computed = Position::new(ln.x0, ln.y0);
        let record = store.observe(&ln.id, OverrideKind::node(), computed).clone();

        let (x, y) = if record.customized {
            (record.current.x, record.current.y)
        } else {
            (computed.x, computed.y)
        };
        let (mut width, mut height) = (ln.width(), ln.height());
        if record.customized {
            if let OverrideKind::Node(n) = &record.kind {
                if let Some(w) = n.width {
                    width = w;
                }
                if let Some(h) = n.height {
                    height = h;
                }
            }
        }

        let (name, color) = match graph.node(&ln.id) {
            Some(node) => (
                node.name.clone(),
                config.node_color(
                    graph.node_index(&ln.id).unwrap_or(0),
                    node.color.as_deref(),
                ),
            ),
            None => (ln.id.clone(), config.node_color(0, None)),
        };

        final_rects.push(LayoutNode {
            id: ln.id.clone(),
            x0: x,
            y0: y,
            x1: x + width,
            y1: y + height,
            value: ln.value,
            layer: ln.layer,
        });
        placed_nodes.push(PlacedNode {
            id: ln.id.clone(),
            name,
            x,
            y,
            width,
            height,
            color,
            value: ln.value,
        });
    }

    // The raw layout already ran; ribbons are re-derived from the final
    // rects so overridden nodes keep their links attached.
    let links = route_links(&final_rects, &graph.links, layout.scale);

    let mut labels = Vec::with_capacity(placed_nodes.len());
    for node in &placed_nodes {
        let anchor = Position::new(node.x + node.width + config.label_gap, node.y + node.height / 2.0);
        let lid = label_id(&node.id);
        let record = store.observe(&lid, OverrideKind::label(), anchor).clone();

        let (x, y, font_size, color, custom_lines) = match &record.kind {
            OverrideKind::Label(label) if record.customized => (
                anchor.x + label.dx,
                anchor.y + label.dy,
                label.font_size,
                label.color.clone(),
                label.lines.clone(),
            ),
            OverrideKind::Label(label) => {
                (anchor.x, anchor.y, label.font_size, label.color.clone(), Vec::new())
            }
            _ => (anchor.x, anchor.y, None, None, Vec::new()),
        };
        let lines = if custom_lines.is_empty() {
            vec![
                node.name.clone(),
                format_value(node.value, &config.value_prefix),
            ]
        } else {
            custom_lines
        };
        labels.push(PlacedLabel {
            id: lid,
            node: node.id.clone(),
            x,
            y,
            lines,
            font_size,
            color,
        });
    }

    let mut placed_annotations = Vec::with_capacity(annotations.len());
    for a in annotations {
        let computed = Position::new(a.x, a.y);
        let kind = match a.kind {
            AnnotationKind::Box => OverrideKind::Box(Default::default()),
            AnnotationKind::Text => OverrideKind::Text(Default::default()),
            AnnotationKind::Image => OverrideKind::Image(Default::default()),
        };
        let record = store.observe(&a.id, kind, computed).clone();
        let (x, y) = if record.customized {
            (record.current.x, record.current.y)
        } else {
            (computed.x, computed.y)
        };
        let (mut width, mut height) = (a.width, a.height);
        if record.customized {
            match &record.kind {
                OverrideKind::Box(b) => {
                    width = b.width.or(width);
                    height = b.height.or(height);
                }
                OverrideKind::Image(i) => {
                    width = i.width.or(width);
                    height = i.height.or(height);
                }
                _ => {}
            }
        }
        placed_annotations.push(PlacedAnnotation {
            id: a.id.clone(),
            kind: a.kind,
            x,
            y,
            width,
            height,
            text: a.text.clone(),
            src: a.src.clone(),
            style: a.style.clone(),
        });
    }

    Scene {
        nodes: placed_nodes,
        links,
        labels,
        annotations: placed_annotations,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
