//! Override record types — one tagged variant per element kind so each kind
//! only carries the style fields that make sense for it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Position) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Label placement is an offset from the node's computed anchor, so the
/// offset survives the node itself being moved or re-laid-out.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelOverride {
    pub dx: f64,
    pub dy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Replacement text lines shown instead of the default name + value.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoxOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageOverride {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum OverrideKind {
    Node(NodeOverride),
    Label(LabelOverride),
    Box(BoxOverride),
    Text(TextOverride),
    Image(ImageOverride),
}

impl OverrideKind {
    pub fn node() -> Self {
        Self::Node(NodeOverride::default())
    }

    pub fn label() -> Self {
        Self::Label(LabelOverride::default())
    }
}

/// One element's persisted deviation from computed layout.
///
/// `original` is the last computed position, snapshotted whenever the record
/// is not user-customized; `current` is where the user left the element.
/// An uncustomized record is pure bookkeeping and must not affect rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverrideRecord {
    pub id: String,
    #[serde(flatten)]
    pub kind: OverrideKind,
    #[serde(rename = "originalPosition")]
    pub original: Position,
    #[serde(rename = "currentPosition")]
    pub current: Position,
    pub customized: bool,
}

impl OverrideRecord {
    pub fn observed(id: impl Into<String>, kind: OverrideKind, computed: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            original: computed,
            current: computed,
            customized: false,
        }
    }
}
