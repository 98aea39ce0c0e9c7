//! sankey-studio — flow DSL to interactive Sankey diagram model.
//!
//! Pipeline: parse the flow DSL into a validated acyclic [`syntax::FlowGraph`],
//! compute column layout, then reconcile against persisted per-element
//! overrides to produce a render-ready [`reconcile::Scene`]. Serialization
//! round-trips the model through DSL, CSV, and a JSON document schema.
//!
//! Public API: [`render_scene`] for one-shot use, [`session::EditorSession`]
//! for interactive editing.

pub mod config;
pub mod format;
pub mod graph;
pub mod layout;
pub mod overrides;
pub mod parsers;
pub mod reconcile;
pub mod serialize;
pub mod session;
pub mod syntax;

#[cfg(feature = "wasm")]
pub mod wasm;

use config::DiagramConfig;
use layout::{LayoutError, full_layout};
use overrides::OverrideStore;
use reconcile::Scene;

/// One-shot pipeline: DSL text to a render-ready scene with no overrides.
///
/// Returns `Ok(None)` when the source contains no valid flow line.
pub fn render_scene(src: &str, config: &DiagramConfig) -> Result<Option<Scene>, LayoutError> {
    let Some(doc) = parsers::parse_document(src) else {
        return Ok(None);
    };
    let layout = full_layout(&doc.graph, config)?;
    let mut store = OverrideStore::new();
    store.apply_label_moves(&doc.label_moves);
    let scene = reconcile::reconcile(&doc.graph, &layout, &[], &mut store, config);
    Ok(Some(scene))
}
