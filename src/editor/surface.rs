//! Seam to the scene graph that draws layers and owns the manipulation handles.

use image::RgbaImage;

use crate::document::LayerId;
use crate::export::ExportPlan;
use crate::transform::{HandleConfig, NodeTransform};

pub trait RenderSurface {
    /// Node-local transform of the node drawing `id`, read back after a gesture.
    fn node(&self, id: LayerId) -> Option<NodeTransform>;

    /// Replaces the handle set. An empty `ids` slice detaches every handle.
    fn attach_handles(&mut self, ids: &[LayerId], config: HandleConfig);

    /// Draws `plan` at its native size.
    fn rasterize(&mut self, plan: &ExportPlan) -> Result<RgbaImage, String>;
}

/// Surface that draws nothing. Used by headless sessions such as the restore dry-run.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetachedSurface;

impl RenderSurface for DetachedSurface {
    fn node(&self, _id: LayerId) -> Option<NodeTransform> {
        None
    }

    fn attach_handles(&mut self, _ids: &[LayerId], _config: HandleConfig) {}

    fn rasterize(&mut self, _plan: &ExportPlan) -> Result<RgbaImage, String> {
        Err("no rendering surface attached".to_string())
    }
}
