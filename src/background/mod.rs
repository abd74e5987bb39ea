//! Background raster handle. Only the native size enters the document.

use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use thiserror::Error;

use crate::document::BackgroundInfo;

#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("failed to open background {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("background {path} is not a PNG image")]
    UnsupportedFormat { path: PathBuf },
    #[error("failed to decode background {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("background {path} has zero size")]
    Empty { path: PathBuf },
}

pub type BackgroundResult<T> = std::result::Result<T, BackgroundError>;

/// Session-scoped handle to the loaded background. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundImage {
    path: PathBuf,
    info: BackgroundInfo,
}

impl BackgroundImage {
    pub fn open(path: impl AsRef<Path>) -> BackgroundResult<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = ImageReader::open(&path)
            .and_then(|reader| reader.with_guessed_format())
            .map_err(|source| BackgroundError::Open {
                path: path.clone(),
                source,
            })?;
        if reader.format() != Some(ImageFormat::Png) {
            return Err(BackgroundError::UnsupportedFormat { path });
        }
        let (width, height) =
            reader
                .into_dimensions()
                .map_err(|source| BackgroundError::Decode {
                    path: path.clone(),
                    source,
                })?;
        if width == 0 || height == 0 {
            return Err(BackgroundError::Empty { path });
        }
        tracing::debug!(path = %path.display(), width, height, "background loaded");
        Ok(Self {
            path,
            info: BackgroundInfo::new(width, height),
        })
    }

    /// Loads the background, or logs and yields `None` so editing can continue without it.
    pub fn open_or_none(path: impl AsRef<Path>) -> Option<Self> {
        match Self::open(path) {
            Ok(background) => Some(background),
            Err(err) => {
                tracing::warn!(%err, "background failed to load; continuing without it");
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> BackgroundInfo {
        self.info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_reads_native_png_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.png");
        image::RgbaImage::new(64, 32).save(&path).unwrap();

        let background = BackgroundImage::open(&path).unwrap();
        assert_eq!(background.info(), BackgroundInfo::new(64, 32));
        assert_eq!(background.path(), path.as_path());
    }

    #[test]
    fn open_rejects_non_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.bmp");
        image::RgbaImage::new(4, 4)
            .save_with_format(&path, ImageFormat::Bmp)
            .unwrap();
        assert!(matches!(
            BackgroundImage::open(&path),
            Err(BackgroundError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn missing_file_yields_none() {
        assert!(BackgroundImage::open_or_none("/nonexistent/textplate/bg.png").is_none());
    }
}
