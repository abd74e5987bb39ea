//! Raster export: the composition order handed to the surface and the PNG writer.

use std::path::Path;

use image::RgbaImage;
use thiserror::Error;

use crate::document::{BackgroundInfo, Document, TextLayer};

pub const DEFAULT_EXPORT_FILE_NAME: &str = "design.png";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("nothing to export: no background image is loaded")]
    MissingBackground,
    #[error("surface failed to rasterize the scene: {message}")]
    Render { message: String },
    #[error("raster is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}")]
    SizeMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("failed to write exported image: {0}")]
    Write(#[from] image::ImageError),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Everything the surface needs to rasterize the scene at native resolution.
///
/// Paint order is the background first, then `layers` front to back as listed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPlan {
    pub background: BackgroundInfo,
    pub layers: Vec<TextLayer>,
}

impl ExportPlan {
    pub fn for_document(document: &Document) -> ExportResult<Self> {
        let background = document
            .background()
            .ok_or(ExportError::MissingBackground)?;
        Ok(Self {
            background,
            layers: document.layers().to_vec(),
        })
    }

    pub fn width(&self) -> u32 {
        self.background.width
    }

    pub fn height(&self) -> u32 {
        self.background.height
    }

    pub fn check_raster(&self, raster: &RgbaImage) -> ExportResult<()> {
        if raster.width() != self.width() || raster.height() != self.height() {
            return Err(ExportError::SizeMismatch {
                expected_width: self.width(),
                expected_height: self.height(),
                actual_width: raster.width(),
                actual_height: raster.height(),
            });
        }
        Ok(())
    }
}

pub fn write_png(raster: &RgbaImage, path: &Path) -> ExportResult<()> {
    raster.save_with_format(path, image::ImageFormat::Png)?;
    tracing::info!(
        path = %path.display(),
        width = raster.width(),
        height = raster.height(),
        "exported image written"
    );
    Ok(())
}
