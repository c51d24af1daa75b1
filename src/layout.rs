//! Masonry placement.
//!
//! [`compute`] is a pure function: items, their metrics, the column count,
//! the container width and the gap go in; a [`Layout`] comes out. It never
//! suspends, never mutates its inputs and keeps no state between calls, so
//! the engine can rerun it as often as inputs change.
//!
//! # Algorithm
//!
//! ```text
//! column_width = (container_width − gap × (columns − 1)) / columns
//! heights      = [0; columns]
//! for item in items:
//!     col    = index of min(heights)          (ties → lowest index)
//!     x      = col × (column_width + gap)
//!     y      = heights[col]
//!     h      = clamp(column_width / aspect, min_height, max_height)
//!     heights[col] += h + gap
//! total = max(heights)
//! ```
//!
//! Because each item extends the currently shortest column, the spread between
//! the tallest and shortest column never exceeds one item's height plus the gap.

use crate::types::{ImageMetrics, Placement};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

pub const DEFAULT_GAP: f64 = 16.0;
pub const DEFAULT_MIN_HEIGHT: f64 = 100.0;
pub const DEFAULT_MAX_HEIGHT: f64 = 800.0;
/// Portrait 4:5, used until (or instead of) real metrics.
pub const DEFAULT_FALLBACK_ASPECT: f64 = 4.0 / 5.0;

/// Random height variation, reproducible for a given seed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    /// Maximum relative deviation, e.g. `0.05` for ±5%.
    pub amount: f64,
    pub seed: u64,
}

/// Sizing rules for a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub min_height: f64,
    pub max_height: f64,
    /// Width over height for items without resolved metrics.
    pub fallback_aspect: f64,
    pub jitter: Option<Jitter>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            min_height: DEFAULT_MIN_HEIGHT,
            max_height: DEFAULT_MAX_HEIGHT,
            fallback_aspect: DEFAULT_FALLBACK_ASPECT,
            jitter: None,
        }
    }
}

/// Result of one layout pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Layout {
    pub placements: Vec<Placement>,
    /// Accumulated height per column, including the trailing gap.
    pub column_heights: Vec<f64>,
    pub column_width: f64,
    /// `max(column_heights)`; 0 for an empty pass.
    pub height: f64,
}

impl Layout {
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn placement(&self, item_id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.item_id == item_id)
    }

    /// Spread between the tallest and shortest column.
    pub fn imbalance(&self) -> f64 {
        let max = self.column_heights.iter().copied().fold(0.0, f64::max);
        let min = self
            .column_heights
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        if min.is_finite() { max - min } else { 0.0 }
    }
}

/// Uniform column width, or `None` when the geometry leaves no room.
pub fn column_width(container_width: f64, columns: usize, gap: f64) -> Option<f64> {
    if columns == 0 || !(container_width > 0.0) {
        return None;
    }
    let width = (container_width - gap * (columns as f64 - 1.0)) / columns as f64;
    (width > 0.0).then_some(width)
}

/// Render height for an aspect ratio scaled to `column_width`, clamped.
pub fn aspect_height(column_width: f64, aspect: f64, min_height: f64, max_height: f64) -> f64 {
    (column_width / aspect).clamp(min_height, max_height)
}

/// Compute placements for every item.
///
/// `items` are `(item_id, …)` pairs in display order; only the id is read.
/// `metrics` is keyed by item id. Degenerate geometry yields an empty layout.
pub fn compute<'a, I>(
    items: I,
    metrics: &HashMap<String, ImageMetrics>,
    columns: usize,
    container_width: f64,
    gap: f64,
    options: &LayoutOptions,
) -> Layout
where
    I: IntoIterator<Item = &'a str>,
{
    let Some(col_width) = column_width(container_width, columns, gap) else {
        tracing::debug!(columns, container_width, "degenerate geometry, empty layout");
        return Layout::default();
    };

    let mut rng = options.jitter.map(|j| StdRng::seed_from_u64(j.seed));
    let mut heights = vec![0.0_f64; columns];
    let mut placements = Vec::new();

    for item_id in items {
        let col = shortest_column(&heights);
        let aspect = metrics
            .get(item_id)
            .and_then(ImageMetrics::aspect_ratio)
            .unwrap_or(options.fallback_aspect);
        let mut height = aspect_height(col_width, aspect, options.min_height, options.max_height);

        if let (Some(jitter), Some(rng)) = (options.jitter, rng.as_mut()) {
            let amount = jitter.amount.abs();
            let factor = 1.0 + rng.gen_range(-amount..=amount);
            height = (height * factor).clamp(options.min_height, options.max_height);
        }

        placements.push(Placement {
            item_id: item_id.to_string(),
            x: col as f64 * (col_width + gap),
            y: heights[col],
            width: col_width,
            height,
        });
        heights[col] += height + gap;
    }

    let height = heights.iter().copied().fold(0.0, f64::max);
    Layout {
        placements,
        column_heights: heights,
        column_width: col_width,
        height,
    }
}

/// Index of the shortest column; the first one wins ties.
fn shortest_column(heights: &[f64]) -> usize {
    let mut best = 0;
    for (i, h) in heights.iter().enumerate().skip(1) {
        if *h < heights[best] {
            best = i;
        }
    }
    best
}
