//! Override store — manual position/style deviations, keyed by element id.
//!
//! The store is an explicit object handed into reconciliation (never a
//! module-level singleton), so multiple diagram instances coexist and tests
//! stay hermetic. A record exists for an element iff the user interacted
//! with it, or as an uncustomized bookkeeping snapshot of its computed
//! position; only `customized` records change what gets rendered.

pub mod types;

use std::collections::BTreeMap;

pub use types::{
    BoxOverride, ImageOverride, LabelOverride, NodeOverride, OverrideKind, OverrideRecord,
    Position, TextOverride,
};

use crate::parsers::LabelMove;

/// Pointer displacement below this is a click, at or above it a drag.
pub const CLICK_THRESHOLD: f64 = 5.0;

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideStore {
    records: BTreeMap<String, OverrideRecord>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&OverrideRecord> {
        self.records.get(id)
    }

    /// Iterate records in id order (stable for serialization).
    pub fn records(&self) -> impl Iterator<Item = &OverrideRecord> {
        self.records.values()
    }

    /// Rebuild a store from persisted records (JSON import).
    pub fn from_records(records: Vec<OverrideRecord>) -> Self {
        Self {
            records: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        }
    }

    /// Record the computed position of an element seen this render.
    ///
    /// First sighting snapshots the position as `original` without marking
    /// the record customized. Uncustomized records re-snapshot on every
    /// render (which is what makes "Reset Position" pick up a fresh
    /// baseline); customized records are left untouched.
    pub fn observe(&mut self, id: &str, kind: OverrideKind, computed: Position) -> &OverrideRecord {
        let record = self
            .records
            .entry(id.to_string())
            .or_insert_with(|| OverrideRecord::observed(id, kind, computed));
        if !record.customized {
            record.original = computed;
            record.current = computed;
        }
        record
    }

    /// Commit a user move: the element renders at `position` from now on.
    pub fn commit_move(&mut self, id: &str, kind: OverrideKind, position: Position) {
        let record = self
            .records
            .entry(id.to_string())
            .or_insert_with(|| OverrideRecord::observed(id, kind, position));
        record.current = position;
        record.customized = true;
    }

    /// Commit a user resize on a node record.
    pub fn commit_node_size(&mut self, id: &str, width: Option<f64>, height: Option<f64>) {
        let record = self
            .records
            .entry(id.to_string())
            .or_insert_with(|| {
                OverrideRecord::observed(id, OverrideKind::node(), Position::default())
            });
        if let OverrideKind::Node(node) = &mut record.kind {
            node.width = width;
            node.height = height;
        }
        record.customized = true;
    }

    /// Persist a label offset relative to its node anchor.
    pub fn set_label_offset(&mut self, id: &str, dx: f64, dy: f64) {
        let record = self
            .records
            .entry(id.to_string())
            .or_insert_with(|| {
                OverrideRecord::observed(id, OverrideKind::label(), Position::default())
            });
        if let OverrideKind::Label(label) = &mut record.kind {
            label.dx = dx;
            label.dy = dy;
        }
        record.customized = true;
    }

    pub fn label_offset(&self, id: &str) -> Option<(f64, f64)> {
        match self.records.get(id) {
            Some(OverrideRecord {
                customized: true,
                kind: OverrideKind::Label(label),
                ..
            }) => Some((label.dx, label.dy)),
            _ => None,
        }
    }

    /// Load `labelmove` declarations parsed out of a DSL document.
    pub fn apply_label_moves(&mut self, moves: &[LabelMove]) {
        for m in moves {
            self.set_label_offset(&label_id(&m.node), m.dx, m.dy);
        }
    }

    /// Reset Position: drop the customization flag and dimension/offset
    /// overrides so the next render re-snapshots and places the element at
    /// its computed position again. Style fields survive.
    pub fn reset(&mut self, id: &str) -> bool {
        let Some(record) = self.records.get_mut(id) else {
            return false;
        };
        record.customized = false;
        match &mut record.kind {
            OverrideKind::Node(n) => {
                n.width = None;
                n.height = None;
            }
            OverrideKind::Label(l) => {
                l.dx = 0.0;
                l.dy = 0.0;
            }
            OverrideKind::Box(b) => {
                b.width = None;
                b.height = None;
            }
            OverrideKind::Image(i) => {
                i.width = None;
                i.height = None;
            }
            OverrideKind::Text(_) => {}
        }
        true
    }

    /// Reset Position for every tracked element.
    pub fn reset_all(&mut self) {
        let ids: Vec<String> = self.records.keys().cloned().collect();
        for id in ids {
            self.reset(&id);
        }
    }
}

/// Store key for the label attached to a node.
pub fn label_id(node_id: &str) -> String {
    format!("{node_id}/label")
}

// ─── Drag state machine ──────────────────────────────────────────────────────

/// Terminal classification of a pointer-down/up pair.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Displacement under the threshold: a selection, no override written.
    Click { id: String },
    /// Displacement at or over the threshold: commit the element here.
    Drag { id: String, position: Position },
}

#[derive(Debug, Clone)]
struct ActiveDrag {
    id: String,
    element_origin: Position,
    pointer_origin: Position,
}

/// Bounded drag state machine: idle → dragging → idle.
///
/// Intermediate moves yield transient positions for live feedback; nothing
/// is committed until pointer-up, and only when the total Euclidean
/// displacement reaches [`CLICK_THRESHOLD`].
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    active: Option<ActiveDrag>,
}

impl DragTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    pub fn pointer_down(&mut self, id: &str, element_origin: Position, pointer: Position) {
        self.active = Some(ActiveDrag {
            id: id.to_string(),
            element_origin,
            pointer_origin: pointer,
        });
    }

    /// Transient element position for the current pointer location.
    pub fn pointer_move(&self, pointer: Position) -> Option<Position> {
        self.active.as_ref().map(|drag| {
            Position::new(
                drag.element_origin.x + (pointer.x - drag.pointer_origin.x),
                drag.element_origin.y + (pointer.y - drag.pointer_origin.y),
            )
        })
    }

    pub fn pointer_up(&mut self, pointer: Position) -> Option<DragOutcome> {
        let drag = self.active.take()?;
        let displacement = drag.pointer_origin.distance_to(pointer);
        if displacement < CLICK_THRESHOLD {
            Some(DragOutcome::Click { id: drag.id })
        } else {
            Some(DragOutcome::Drag {
                id: drag.id,
                position: Position::new(
                    drag.element_origin.x + (pointer.x - drag.pointer_origin.x),
                    drag.element_origin.y + (pointer.y - drag.pointer_origin.y),
                ),
            })
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_snapshots_original_once_seen() {
        let mut store = OverrideStore::new();
        store.observe("a", OverrideKind::node(), Position::new(10.0, 20.0));
        let r = store.get("a").expect("recorded");
        assert_eq!(r.original, Position::new(10.0, 20.0));
        assert!(!r.customized);
    }

    #[test]
    fn test_observe_resnapshots_uncustomized() {
        let mut store = OverrideStore::new();
        store.observe("a", OverrideKind::node(), Position::new(10.0, 20.0));
        store.observe("a", OverrideKind::node(), Position::new(15.0, 25.0));
        assert_eq!(store.get("a").expect("recorded").original, Position::new(15.0, 25.0));
    }

    #[test]
    fn test_observe_leaves_customized_alone() {
        let mut store = OverrideStore::new();
        store.observe("a", OverrideKind::node(), Position::new(10.0, 20.0));
        store.commit_move("a", OverrideKind::node(), Position::new(99.0, 99.0));
        store.observe("a", OverrideKind::node(), Position::new(15.0, 25.0));
        let r = store.get("a").expect("recorded");
        assert_eq!(r.current, Position::new(99.0, 99.0));
        assert_eq!(r.original, Position::new(10.0, 20.0));
    }

    #[test]
    fn test_reset_resnapshots_next_observe() {
        let mut store = OverrideStore::new();
        store.observe("a", OverrideKind::node(), Position::new(10.0, 20.0));
        store.commit_move("a", OverrideKind::node(), Position::new(99.0, 99.0));
        assert!(store.reset("a"));
        store.observe("a", OverrideKind::node(), Position::new(30.0, 40.0));
        let r = store.get("a").expect("recorded");
        assert!(!r.customized);
        assert_eq!(r.original, Position::new(30.0, 40.0));
        assert_eq!(r.current, Position::new(30.0, 40.0));
    }

    #[test]
    fn test_reset_unknown_id() {
        let mut store = OverrideStore::new();
        assert!(!store.reset("missing"));
    }

    #[test]
    fn test_reset_all() {
        let mut store = OverrideStore::new();
        store.commit_move("a", OverrideKind::node(), Position::new(1.0, 1.0));
        store.set_label_offset("b/label", 5.0, 5.0);
        store.reset_all();
        assert!(store.records().all(|r| !r.customized));
        assert_eq!(store.label_offset("b/label"), None);
    }

    #[test]
    fn test_label_offset_roundtrips_through_store() {
        let mut store = OverrideStore::new();
        store.set_label_offset("n/label", 12.25, -3.5);
        assert_eq!(store.label_offset("n/label"), Some((12.25, -3.5)));
    }

    #[test]
    fn test_apply_label_moves() {
        let mut store = OverrideStore::new();
        store.apply_label_moves(&[LabelMove {
            node: "budget".to_string(),
            dx: 4.0,
            dy: 9.0,
        }]);
        assert_eq!(store.label_offset(&label_id("budget")), Some((4.0, 9.0)));
    }

    #[test]
    fn test_click_under_threshold() {
        let mut drag = DragTracker::new();
        drag.pointer_down("a", Position::new(0.0, 0.0), Position::new(100.0, 100.0));
        let outcome = drag.pointer_up(Position::new(103.0, 103.0)).expect("ended");
        // (3,3): Euclidean ~4.24 < 5, even though Manhattan distance is 6
        assert_eq!(outcome, DragOutcome::Click { id: "a".to_string() });
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_drag_at_threshold() {
        let mut drag = DragTracker::new();
        drag.pointer_down("a", Position::new(10.0, 10.0), Position::new(0.0, 0.0));
        let outcome = drag.pointer_up(Position::new(5.0, 0.0)).expect("ended");
        assert_eq!(
            outcome,
            DragOutcome::Drag {
                id: "a".to_string(),
                position: Position::new(15.0, 10.0),
            }
        );
    }

    #[test]
    fn test_diagonal_drag_over_threshold() {
        let mut drag = DragTracker::new();
        drag.pointer_down("a", Position::new(0.0, 0.0), Position::new(0.0, 0.0));
        // (4,4): Euclidean ~5.66 >= 5
        let outcome = drag.pointer_up(Position::new(4.0, 4.0)).expect("ended");
        assert!(matches!(outcome, DragOutcome::Drag { .. }));
    }

    #[test]
    fn test_pointer_move_is_transient() {
        let mut drag = DragTracker::new();
        drag.pointer_down("a", Position::new(10.0, 10.0), Position::new(0.0, 0.0));
        let transient = drag.pointer_move(Position::new(20.0, 5.0)).expect("dragging");
        assert_eq!(transient, Position::new(30.0, 15.0));
        assert!(drag.is_dragging());
    }

    #[test]
    fn test_pointer_up_without_down() {
        let mut drag = DragTracker::new();
        assert!(drag.pointer_up(Position::new(0.0, 0.0)).is_none());
    }
}
