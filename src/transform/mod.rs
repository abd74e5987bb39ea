//! Folds raw post-gesture node state from the rendering surface into canonical layer fields.
//!
//! A single selected layer is resized by reflowing: the horizontal scale is multiplied into
//! `width` and both scales return to 1. With two or more layers selected the shared bounding
//! box stretches members independently, so each keeps its reported scale and `width` is left
//! alone. Drags only ever move `x`/`y`.

use crate::document::{clamp_width, Document, LayerId, TextLayer};
use crate::geometry::BoundBox;
use crate::selection::{Selection, SelectionPolicy};

pub const UPDATE_LAYER_LABEL: &str = "Update layer";
pub const UPDATE_LAYERS_LABEL: &str = "Update multiple layers";
pub const MOVE_LAYER_LABEL: &str = "Move layer";
pub const MOVE_LAYERS_LABEL: &str = "Move layers";

/// Node-local state read back from the surface once a gesture ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub rotation: f64,
    pub width: f64,
}

impl NodeTransform {
    pub fn of_layer(layer: &TextLayer) -> Self {
        Self {
            x: layer.x,
            y: layer.y,
            scale_x: layer.scale_x,
            scale_y: layer.scale_y,
            rotation: layer.rotation,
            width: layer.width,
        }
    }

    pub fn is_finite(&self) -> bool {
        [
            self.x,
            self.y,
            self.scale_x,
            self.scale_y,
            self.rotation,
            self.width,
        ]
        .iter()
        .all(|value| value.is_finite())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Drag,
    Transform,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

const SINGLE_ANCHORS: &[Anchor] = &[Anchor::MiddleLeft, Anchor::MiddleRight];
const MULTI_ANCHORS: &[Anchor] = &[
    Anchor::TopLeft,
    Anchor::TopCenter,
    Anchor::TopRight,
    Anchor::MiddleLeft,
    Anchor::MiddleRight,
    Anchor::BottomLeft,
    Anchor::BottomCenter,
    Anchor::BottomRight,
];

/// Manipulation handles the surface should attach for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleConfig {
    pub anchors: &'static [Anchor],
    pub rotate_enabled: bool,
}

impl HandleConfig {
    pub const fn for_policy(policy: SelectionPolicy) -> Self {
        match policy {
            SelectionPolicy::Empty => Self {
                anchors: &[],
                rotate_enabled: false,
            },
            SelectionPolicy::Single(_) => Self {
                anchors: SINGLE_ANCHORS,
                rotate_enabled: true,
            },
            SelectionPolicy::Multiple => Self {
                anchors: MULTI_ANCHORS,
                rotate_enabled: true,
            },
        }
    }

    pub fn shows_handles(&self) -> bool {
        !self.anchors.is_empty()
    }
}

/// Keeps the previous box while a live resize would drop below the width floor.
pub fn constrain_bound_box(old: BoundBox, new: BoundBox) -> BoundBox {
    if new.width < crate::document::MIN_LAYER_WIDTH {
        old
    } else {
        new
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub document: Document,
    pub label: &'static str,
    pub changed: Vec<LayerId>,
}

/// Canonical fields for one layer after a transform gesture.
pub fn reconcile_layer(layer: &TextLayer, report: NodeTransform, multi: bool) -> TextLayer {
    let mut next = layer.clone();
    next.x = report.x;
    next.y = report.y;
    next.rotation = report.rotation;
    if multi {
        next.scale_x = report.scale_x;
        next.scale_y = report.scale_y;
    } else {
        next.width = clamp_width(report.width * report.scale_x);
        next.scale_x = 1.0;
        next.scale_y = 1.0;
    }
    next
}

/// Builds the next document for a finished gesture. Returns `None` when nothing changed,
/// in which case no history entry should be recorded.
///
/// Drag reports apply to any layer. Transform reports apply only to members of `selection`.
/// Reports carrying a non-finite field are dropped.
pub fn reconcile(
    document: &Document,
    selection: &Selection,
    gesture: Gesture,
    reports: &[(LayerId, NodeTransform)],
) -> Option<Reconciliation> {
    let policy = selection.policy();
    let mut next = document.clone();
    let mut changed = Vec::new();

    for (id, report) in reports {
        if !report.is_finite() {
            tracing::warn!(%id, ?report, "non-finite gesture report ignored");
            continue;
        }
        let Some(layer) = next.layer_mut(*id) else {
            tracing::debug!(%id, "gesture report for unknown layer ignored");
            continue;
        };
        let updated = match gesture {
            Gesture::Drag => {
                let mut moved = layer.clone();
                moved.x = report.x;
                moved.y = report.y;
                moved
            }
            Gesture::Transform if selection.contains(*id) => {
                reconcile_layer(layer, *report, policy == SelectionPolicy::Multiple)
            }
            Gesture::Transform => {
                tracing::debug!(%id, ?policy, "transform report outside selection ignored");
                continue;
            }
        };
        if updated != *layer {
            *layer = updated;
            changed.push(*id);
        }
    }

    if changed.is_empty() {
        tracing::debug!(?gesture, "gesture produced no net change");
        return None;
    }

    let label = match (gesture, changed.len()) {
        (Gesture::Drag, 1) => MOVE_LAYER_LABEL,
        (Gesture::Drag, _) => MOVE_LAYERS_LABEL,
        (Gesture::Transform, _) if policy == SelectionPolicy::Multiple => UPDATE_LAYERS_LABEL,
        (Gesture::Transform, _) => UPDATE_LAYER_LABEL,
    };
    Some(Reconciliation {
        document: next,
        label,
        changed,
    })
}
