//! Layer document model: an ordered stack of text layers over one background.

mod layer;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

pub use layer::{
    clamp_width, FontStyle, LayerId, LayerPatch, TextAlign, TextLayer, MIN_LAYER_WIDTH,
};

/// Native dimensions of the background raster. Pixel data lives outside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundInfo {
    pub width: u32,
    pub height: u32,
}

impl BackgroundInfo {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerMove {
    Up,
    Down,
    Top,
    Bottom,
}

impl LayerMove {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Up => "Move layer up",
            Self::Down => "Move layer down",
            Self::Top => "Move layer to top",
            Self::Bottom => "Move layer to bottom",
        }
    }
}

/// Versioned unit of state. Later layers paint on top of earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    layers: Vec<TextLayer>,
    background: Option<BackgroundInfo>,
}

impl Document {
    pub const fn new() -> Self {
        Self {
            layers: Vec::new(),
            background: None,
        }
    }

    /// Builds a document, dropping any layer whose id repeats an earlier one.
    pub fn from_layers(layers: Vec<TextLayer>, background: Option<BackgroundInfo>) -> Self {
        let mut seen = BTreeSet::new();
        let layers = layers
            .into_iter()
            .filter(|layer| {
                let unique = seen.insert(layer.id);
                if !unique {
                    tracing::warn!(id = %layer.id, "dropping layer with duplicate id");
                }
                unique
            })
            .collect();
        Self { layers, background }
    }

    pub fn layers(&self) -> &[TextLayer] {
        &self.layers
    }

    pub fn background(&self) -> Option<BackgroundInfo> {
        self.background
    }

    pub fn set_background(&mut self, background: Option<BackgroundInfo>) {
        self.background = background;
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|layer| layer.id).collect()
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id == id)
    }

    pub fn layer(&self, id: LayerId) -> Option<&TextLayer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Option<&mut TextLayer> {
        self.layers.iter_mut().find(|layer| layer.id == id)
    }

    pub fn max_id(&self) -> Option<LayerId> {
        self.layers.iter().map(|layer| layer.id).max()
    }

    /// Appends `layer` on top. Rejects ids already present.
    pub fn push(&mut self, layer: TextLayer) -> bool {
        if self.contains(layer.id) {
            tracing::warn!(id = %layer.id, "refusing to add layer with duplicate id");
            return false;
        }
        self.layers.push(layer);
        true
    }

    pub fn remove_layers(&mut self, ids: &BTreeSet<LayerId>) -> usize {
        let before = self.layers.len();
        self.layers.retain(|layer| !ids.contains(&layer.id));
        before - self.layers.len()
    }

    pub fn update_layer(&mut self, id: LayerId, patch: &LayerPatch) -> bool {
        self.layer_mut(id).is_some_and(|layer| patch.apply(layer))
    }

    /// Shifts one layer within the paint order. Returns whether the order changed.
    pub fn move_layer(&mut self, id: LayerId, direction: LayerMove) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let layer = self.layers.remove(index);
        let target = match direction {
            LayerMove::Up => (index + 1).min(self.layers.len()),
            LayerMove::Down => index.saturating_sub(1),
            LayerMove::Top => self.layers.len(),
            LayerMove::Bottom => 0,
        };
        self.layers.insert(target, layer);
        target != index
    }

    pub fn reorder_layers(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.layers.len() || to >= self.layers.len() {
            return false;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        true
    }
}
