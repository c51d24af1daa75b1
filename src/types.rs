//! Shared data types passed between the engine's components.
//!
//! Items are owned by the caller and never mutated. Metrics and placements are
//! produced by the engine and keyed by [`GalleryItem::id`].

use serde::{Deserialize, Serialize};

/// One image tile in the gallery, as supplied by the content source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Unique and stable across recomputes.
    pub id: String,
    /// Image URI (`file://`, plain path, or a remote URL).
    pub image_source: String,
    /// Opened in a new browsing context on activation when no click handler is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

impl GalleryItem {
    pub fn new(id: impl Into<String>, image_source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image_source: image_source.into(),
            link_target: None,
            alt: None,
            group: None,
        }
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link_target = Some(link.into());
        self
    }

    pub fn with_alt(mut self, alt: impl Into<String>) -> Self {
        self.alt = Some(alt.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Natural pixel size of an item's image, once measured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetrics {
    pub item_id: String,
    pub natural_width: u32,
    pub natural_height: u32,
}

impl ImageMetrics {
    /// Width over height. `None` for a degenerate zero-sized bitmap.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.natural_width == 0 || self.natural_height == 0 {
            return None;
        }
        Some(self.natural_width as f64 / self.natural_height as f64)
    }
}

/// Absolute box for one item in one layout pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub item_id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Plain box geometry without an owner, used for animation endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Component-wise linear interpolation; `t = 0` is `self`, `t = 1` is `to`.
    pub fn lerp(&self, to: &Rect, t: f64) -> Rect {
        Rect {
            x: lerp(self.x, to.x, t),
            y: lerp(self.y, to.y, t),
            width: lerp(self.width, to.width, t),
            height: lerp(self.height, to.height, t),
        }
    }
}

/// Content-box size of a container or viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

pub(crate) fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from * (1.0 - t) + to * t
}
