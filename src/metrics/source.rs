//! Where image dimensions come from.
//!
//! The [`MetricSource`] trait is the single operation the loader needs:
//! given an image URI, report the bitmap's natural size. The production
//! implementation is [`ImageFileSource`], which reads local files.
//!
//! | Input | Crate / function |
//! |---|---|
//! | JPEG, PNG, TIFF, WebP, GIF | `image::image_dimensions` (header only, no full decode) |
//! | AVIF | `avif-parse` container metadata |
//! | `http://`, `https://`, `data:` | rejected with [`MetricError::UnsupportedScheme`] |

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported URI scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("Failed to measure {uri}: {reason}")]
    Measure { uri: String, reason: String },
}

/// Natural pixel size of a bitmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Something that can measure an image by URI.
///
/// Implementations are called from the rayon pool, hence `Send + Sync`.
pub trait MetricSource: Send + Sync {
    fn measure(&self, uri: &str) -> Result<Dimensions, MetricError>;
}

/// Reads dimensions from local image files.
///
/// Relative paths are resolved against `root` when one is set.
#[derive(Debug, Clone, Default)]
pub struct ImageFileSource {
    root: Option<PathBuf>,
}

impl ImageFileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    fn resolve(&self, uri: &str) -> Result<PathBuf, MetricError> {
        let path = uri_to_path(uri)?;
        match &self.root {
            Some(root) if path.is_relative() => Ok(root.join(path)),
            _ => Ok(path),
        }
    }
}

impl MetricSource for ImageFileSource {
    fn measure(&self, uri: &str) -> Result<Dimensions, MetricError> {
        let path = self.resolve(uri)?;
        if is_avif(&path) {
            return identify_avif(&path);
        }
        let (width, height) =
            image::image_dimensions(&path).map_err(|e| MetricError::Measure {
                uri: uri.to_string(),
                reason: e.to_string(),
            })?;
        Ok(Dimensions { width, height })
    }
}

/// Map an image URI to a filesystem path.
///
/// `file://` is stripped; any other `scheme://` or a `data:` URI is rejected.
pub fn uri_to_path(uri: &str) -> Result<PathBuf, MetricError> {
    if let Some(rest) = uri.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if uri.starts_with("data:") {
        return Err(MetricError::UnsupportedScheme("data".to_string()));
    }
    if let Some((scheme, _)) = uri.split_once("://") {
        return Err(MetricError::UnsupportedScheme(scheme.to_string()));
    }
    Ok(PathBuf::from(uri))
}

fn is_avif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avif"))
}

/// AVIF dimensions from container metadata, without decoding the AV1 payload.
fn identify_avif(path: &Path) -> Result<Dimensions, MetricError> {
    let data = std::fs::read(path)?;
    let avif = avif_parse::read_avif(&mut std::io::Cursor::new(&data)).map_err(|e| {
        MetricError::Measure {
            uri: path.display().to_string(),
            reason: format!("{e:?}"),
        }
    })?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| MetricError::Measure {
            uri: path.display().to_string(),
            reason: format!("{e:?}"),
        })?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}
