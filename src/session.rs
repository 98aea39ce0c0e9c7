//! Editor session — ties the flow model, override store, and annotations
//! together and applies discrete user actions (text edit, drag, reset,
//! import). Single-threaded and synchronous: every mutation happens in
//! response to one action, and committing actions persist fire-and-forget
//! through the `DocumentStore` trait. A failing store degrades the session
//! to in-memory-only with a warning; it never aborts an edit.

use log::warn;
use thiserror::Error;

use crate::config::DiagramConfig;
use crate::layout::{ColumnLayout, LayoutEngine, LayoutError};
use crate::overrides::{
    DragOutcome, DragTracker, OverrideKind, OverrideStore, Position, label_id,
};
use crate::parsers::parse_document;
use crate::reconcile::{Scene, reconcile};
use crate::serialize::{Document, to_csv, to_dsl};
use crate::syntax::{Annotation, AnnotationKind, FlowGraph};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Persistence backend for whole documents. Implementations decide where
/// bytes go (browser storage, file, server); the session only fires saves.
pub trait DocumentStore {
    fn save(&mut self, doc: &Document) -> Result<(), StorageError>;
    fn load(&mut self) -> Result<Option<Document>, StorageError>;
}

/// Keep-everything-in-memory backend, used as the default and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Option<Document>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Option<&Document> {
        self.saved.as_ref()
    }
}

impl DocumentStore for MemoryStore {
    fn save(&mut self, doc: &Document) -> Result<(), StorageError> {
        self.saved = Some(doc.clone());
        Ok(())
    }

    fn load(&mut self) -> Result<Option<Document>, StorageError> {
        Ok(self.saved.clone())
    }
}

pub struct EditorSession {
    pub graph: FlowGraph,
    pub annotations: Vec<Annotation>,
    pub store: OverrideStore,
    pub config: DiagramConfig,
    storage: Option<Box<dyn DocumentStore>>,
    drag: DragTracker,
    engine: ColumnLayout,
    last_scene: Option<Scene>,
}

impl EditorSession {
    pub fn new(config: DiagramConfig) -> Self {
        Self {
            graph: FlowGraph::new(),
            annotations: Vec::new(),
            store: OverrideStore::new(),
            config,
            storage: None,
            drag: DragTracker::new(),
            engine: ColumnLayout,
            last_scene: None,
        }
    }

    pub fn with_storage(mut self, storage: Box<dyn DocumentStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Re-parse the DSL text. Keeps the previous graph (and returns false)
    /// when no valid link survives, so a half-typed edit does not blank the
    /// diagram. Overrides survive re-parses: they are keyed by element id.
    pub fn set_source_text(&mut self, src: &str) -> bool {
        match parse_document(src) {
            Some(doc) => {
                self.graph = doc.graph;
                self.store.apply_label_moves(&doc.label_moves);
                self.persist();
                true
            }
            None => false,
        }
    }

    /// Replace the whole session state from an imported document.
    pub fn load_document(&mut self, doc: Document) {
        self.graph = doc.graph();
        self.store = doc.store();
        self.annotations = doc.independent_labels.clone();
        self.config = doc.settings.clone();
        self.last_scene = None;
    }

    /// One render cycle: layout, then merge with the override store.
    pub fn render(&mut self) -> Result<Scene, LayoutError> {
        let layout = self.engine.layout(&self.graph, &self.config)?;
        let scene = reconcile(
            &self.graph,
            &layout,
            &self.annotations,
            &mut self.store,
            &self.config,
        );
        self.last_scene = Some(scene.clone());
        Ok(scene)
    }

    // ── Pointer interaction ──────────────────────────────────────────────

    /// Begin a potential drag on the element under the pointer.
    /// No-op when the id does not exist in the last rendered scene.
    pub fn pointer_down(&mut self, id: &str, pointer: Position) {
        if let Some(origin) = self.element_position(id) {
            self.drag.pointer_down(id, origin, pointer);
        }
    }

    /// Transient position for live feedback; commits nothing.
    pub fn pointer_move(&self, pointer: Position) -> Option<Position> {
        self.drag.pointer_move(pointer)
    }

    /// End the interaction. A click selects (no override write); a drag
    /// commits an override for the element and persists the document.
    pub fn pointer_up(&mut self, pointer: Position) -> Option<DragOutcome> {
        let outcome = self.drag.pointer_up(pointer)?;
        if let DragOutcome::Drag { id, position } = &outcome {
            self.commit_element_move(id, *position);
            self.persist();
        }
        Some(outcome)
    }

    fn commit_element_move(&mut self, id: &str, position: Position) {
        if let Some(scene) = &self.last_scene {
            if let Some(label) = scene.labels.iter().find(|l| l.id == id) {
                // labels persist as offsets from the node anchor
                if let Some(node) = scene.nodes.iter().find(|n| n.id == label.node) {
                    let anchor = Position::new(
                        node.x + node.width + self.config.label_gap,
                        node.y + node.height / 2.0,
                    );
                    self.store
                        .set_label_offset(id, position.x - anchor.x, position.y - anchor.y);
                }
                return;
            }
            if let Some(a) = self.annotations.iter().find(|a| a.id == id) {
                let kind = match a.kind {
                    AnnotationKind::Box => OverrideKind::Box(Default::default()),
                    AnnotationKind::Text => OverrideKind::Text(Default::default()),
                    AnnotationKind::Image => OverrideKind::Image(Default::default()),
                };
                self.store.commit_move(id, kind, position);
                return;
            }
        }
        self.store.commit_move(id, OverrideKind::node(), position);
    }

    fn element_position(&self, id: &str) -> Option<Position> {
        let scene = self.last_scene.as_ref()?;
        if let Some(n) = scene.nodes.iter().find(|n| n.id == id) {
            return Some(Position::new(n.x, n.y));
        }
        if let Some(l) = scene.labels.iter().find(|l| l.id == id) {
            return Some(Position::new(l.x, l.y));
        }
        scene
            .annotations
            .iter()
            .find(|a| a.id == id)
            .map(|a| Position::new(a.x, a.y))
    }

    // ── Resets and annotations ───────────────────────────────────────────

    pub fn reset_position(&mut self, id: &str) -> bool {
        let changed = self.store.reset(id);
        if changed {
            self.persist();
        }
        changed
    }

    pub fn reset_all(&mut self) {
        self.store.reset_all();
        self.persist();
    }

    pub fn add_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
        self.persist();
    }

    pub fn remove_annotation(&mut self, id: &str) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        let removed = self.annotations.len() != before;
        if removed {
            self.persist();
        }
        removed
    }

    // ── Export ───────────────────────────────────────────────────────────

    pub fn to_document(&self) -> Document {
        Document::from_parts(&self.graph, &self.store, &self.annotations, &self.config)
    }

    pub fn export_dsl(&self) -> String {
        to_dsl(&self.graph, &self.store)
    }

    pub fn export_csv(&self) -> String {
        to_csv(&self.graph)
    }

    /// Fire-and-forget save. Storage failure degrades to in-memory only;
    /// the edit that triggered the save always stands.
    fn persist(&mut self) {
        let doc = self.to_document();
        if let Some(storage) = &mut self.storage {
            if let Err(e) = storage.save(&doc) {
                warn!("persistence failed, continuing in-memory: {e}");
            }
        }
    }

    /// Identifier of the label element attached to a node.
    pub fn node_label_id(node_id: &str) -> String {
        label_id(node_id)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
