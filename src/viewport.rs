use serde::{Deserialize, Serialize};

use crate::document::BackgroundInfo;
use crate::geometry::{fit_scale, Size};

const DEFAULT_STAGE_WIDTH: f64 = 900.0;
const DEFAULT_STAGE_HEIGHT: f64 = 600.0;
const STAGE_SCALE_MIN: f64 = 0.1;
const STAGE_SCALE_MAX: f64 = 2.0;
const STAGE_SCALE_STEP: f64 = 0.05;

/// On-screen presentation of the document. Not versioned, but part of autosave.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub stage_size: Size,
    pub stage_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_stage_scale(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.clamp(STAGE_SCALE_MIN, STAGE_SCALE_MAX)
    } else {
        1.0
    }
}

impl Viewport {
    pub const fn new() -> Self {
        Self {
            stage_size: Size::new(DEFAULT_STAGE_WIDTH, DEFAULT_STAGE_HEIGHT),
            stage_scale: 1.0,
        }
    }

    pub const fn min_scale() -> f64 {
        STAGE_SCALE_MIN
    }

    pub const fn max_scale() -> f64 {
        STAGE_SCALE_MAX
    }

    /// Stage size as displayed, after applying the zoom.
    pub fn display_size(&self) -> Size {
        Size::new(
            self.stage_size.width * self.stage_scale,
            self.stage_size.height * self.stage_scale,
        )
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.stage_scale = clamp_stage_scale(scale);
    }

    pub fn zoom_in(&mut self) {
        self.set_scale(self.stage_scale + STAGE_SCALE_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_scale(self.stage_scale - STAGE_SCALE_STEP);
    }

    /// Sizes the stage to the background's native resolution and fits it in `container`.
    ///
    /// The fit scale is not clamped to the zoom range: very large images may need to go below
    /// the manual minimum to fit on screen.
    pub fn fit_background(&mut self, background: BackgroundInfo, container: Size) {
        let native = Size::new(
            f64::from(background.width.max(1)),
            f64::from(background.height.max(1)),
        );
        self.stage_size = native;
        let scale = fit_scale(container, native);
        self.stage_scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
    }

    /// Maps a point on screen (relative to the stage origin) into document coordinates.
    pub fn to_document(&self, screen_x: f64, screen_y: f64) -> (f64, f64) {
        (screen_x / self.stage_scale, screen_y / self.stage_scale)
    }
}
