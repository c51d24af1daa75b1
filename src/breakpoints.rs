//! Viewport width → column count.
//!
//! A [`Breakpoints`] table holds `(min_width, columns)` thresholds. Resolution
//! tests the largest threshold first and falls back to `default_columns` when
//! the viewport is narrower than every threshold:
//!
//! ```text
//! width ≥ 1500 → 5
//! width ≥ 1000 → 4
//! width ≥  600 → 3
//! width ≥  400 → 2
//! otherwise    → 1
//! ```
//!
//! [`BreakpointWatcher`] is the reactive half: the host feeds it every viewport
//! change and it reports only threshold crossings.

use serde::{Deserialize, Serialize};

/// A single `min-width` threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Breakpoint {
    pub min_width: u32,
    pub columns: usize,
}

/// Ordered threshold table.
#[derive(Debug, Clone, PartialEq)]
pub struct Breakpoints {
    /// Sorted by descending `min_width`. Stable, so equal thresholds keep input order.
    thresholds: Vec<Breakpoint>,
    default_columns: usize,
}

impl Breakpoints {
    pub fn new(mut thresholds: Vec<Breakpoint>, default_columns: usize) -> Self {
        thresholds.sort_by(|a, b| b.min_width.cmp(&a.min_width));
        Self {
            thresholds,
            default_columns,
        }
    }

    /// Column count for a viewport width.
    pub fn resolve(&self, viewport_width: f64) -> usize {
        self.thresholds
            .iter()
            .find(|bp| viewport_width >= bp.min_width as f64)
            .map(|bp| bp.columns)
            .unwrap_or(self.default_columns)
    }

    pub fn thresholds(&self) -> &[Breakpoint] {
        &self.thresholds
    }

    pub fn default_columns(&self) -> usize {
        self.default_columns
    }
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self::new(stock_thresholds(), 1)
    }
}

/// The stock threshold list, widest first.
pub fn stock_thresholds() -> Vec<Breakpoint> {
    [(1500, 5), (1000, 4), (600, 3), (400, 2)]
        .into_iter()
        .map(|(min_width, columns)| Breakpoint { min_width, columns })
        .collect()
}

/// Tracks the resolved column count and reports threshold crossings.
#[derive(Debug, Clone)]
pub struct BreakpointWatcher {
    breakpoints: Breakpoints,
    current: Option<usize>,
}

impl BreakpointWatcher {
    pub fn new(breakpoints: Breakpoints) -> Self {
        Self {
            breakpoints,
            current: None,
        }
    }

    /// Feed a viewport width. Returns the new column count when it changed,
    /// including the very first observation.
    pub fn observe(&mut self, viewport_width: f64) -> Option<usize> {
        let resolved = self.breakpoints.resolve(viewport_width);
        if self.current == Some(resolved) {
            return None;
        }
        tracing::debug!(viewport_width, columns = resolved, "breakpoint crossed");
        self.current = Some(resolved);
        Some(resolved)
    }

    /// Last resolved count, or the default before any observation.
    pub fn columns(&self) -> usize {
        self.current.unwrap_or(self.breakpoints.default_columns)
    }
}
