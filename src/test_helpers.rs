//! Shared test utilities for the masonry-gal test suite.
//!
//! Builders for the inputs the layout computer and animator take, so tests
//! can state a scenario in one line.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let metrics = metrics_map(&[("item-0", 800, 600), ("item-1", 600, 800)]);
//! let layout = compute(ids(2).iter().map(String::as_str), &metrics, 2, 1200.0, 16.0, &opts);
//!
//! let layout = layout_of(&[("a", 0.0, 0.0), ("b", 116.0, 0.0)]);
//! ```

use std::collections::HashMap;

use crate::layout::Layout;
use crate::types::{GalleryItem, ImageMetrics, Placement};

// =========================================================================
// Items
// =========================================================================

/// `item-0`, `item-1`, … in order.
pub fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("item-{i}")).collect()
}

/// Items `item-N` with sources `item-N.jpg`.
pub fn items(n: usize) -> Vec<GalleryItem> {
    ids(n)
        .into_iter()
        .map(|id| {
            let src = format!("{id}.jpg");
            GalleryItem::new(id, src)
        })
        .collect()
}

// =========================================================================
// Metrics
// =========================================================================

/// Metrics keyed by item id from `(id, width, height)` triples.
pub fn metrics_map(entries: &[(&str, u32, u32)]) -> HashMap<String, ImageMetrics> {
    entries
        .iter()
        .map(|&(id, w, h)| {
            (
                id.to_string(),
                ImageMetrics {
                    item_id: id.to_string(),
                    natural_width: w,
                    natural_height: h,
                },
            )
        })
        .collect()
}

// =========================================================================
// Layouts
// =========================================================================

/// A layout with 100×120 tiles at the given `(id, x, y)` positions.
///
/// Column bookkeeping is left empty; the animator only reads placements.
pub fn layout_of(entries: &[(&str, f64, f64)]) -> Layout {
    let placements: Vec<Placement> = entries
        .iter()
        .map(|&(id, x, y)| Placement {
            item_id: id.to_string(),
            x,
            y,
            width: 100.0,
            height: 120.0,
        })
        .collect();
    let height = placements
        .iter()
        .map(|p| p.y + p.height)
        .fold(0.0, f64::max);
    Layout {
        placements,
        column_heights: Vec::new(),
        column_width: 100.0,
        height,
    }
}
