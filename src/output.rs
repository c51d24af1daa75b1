//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every tile is shown by its position and alt text first, with the file and
//! box geometry as indented context lines. Items without alt text fall back to
//! their id in parentheses, since the id is then the only identity they have.
//!
//! # Output Format
//!
//! ## Layout
//!
//! ```text
//! Layout 1200px, 4 columns (285.0px wide), height 1432.5px
//! 001 dawn
//!     Source: 001-dawn.jpg
//!     Box: x 0.0, y 0.0, 285.0 × 213.8
//!     Link: https://example.com/dawn
//! 002 (010-Japan/002.jpg)
//!     Group: Japan
//!     Box: x 305.0, y 0.0, 285.0 × 356.3 (fallback)
//! ```
//!
//! ## Check
//!
//! ```text
//! ok      800 × 600  001-dawn.jpg
//! FAILED  002-broken.jpg: unsupported image format
//!
//! 1 of 2 images measured, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::layout::Layout;
use crate::metrics::{Dimensions, MetricError};
use crate::types::{GalleryItem, ImageMetrics, Placement};
use serde::Serialize;
use std::collections::HashMap;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Header line for one tile: alt text when present, id in parens otherwise.
///
/// ```text
/// 001 The Sunset
/// 002 (010-Japan/002.jpg)
/// ```
fn item_line(index: usize, item: &GalleryItem) -> String {
    match item.alt.as_deref() {
        Some(alt) if !alt.is_empty() => format!("{} {}", format_index(index), alt),
        _ => format!("{} ({})", format_index(index), item.id),
    }
}

fn box_line(placement: &Placement, measured: bool) -> String {
    let mut line = format!(
        "Box: x {:.1}, y {:.1}, {:.1} × {:.1}",
        placement.x, placement.y, placement.width, placement.height
    );
    if !measured {
        line.push_str(" (fallback)");
    }
    line
}

// ============================================================================
// Layout
// ============================================================================

/// Format a layout pass as a tile inventory.
///
/// Items are listed in input order; items missing from `layout` (degenerate
/// geometry) produce a single notice line instead.
pub fn format_layout_output(
    layout: &Layout,
    items: &[GalleryItem],
    metrics: &HashMap<String, ImageMetrics>,
    container_width: f64,
) -> Vec<String> {
    let mut lines = Vec::new();
    if layout.is_empty() && !items.is_empty() {
        lines.push(format!(
            "No layout: {container_width}px leaves no room for a column"
        ));
        return lines;
    }

    lines.push(format!(
        "Layout {}px, {} columns ({:.1}px wide), height {:.1}px",
        container_width,
        layout.column_heights.len(),
        layout.column_width,
        layout.height
    ));

    for (i, item) in items.iter().enumerate() {
        lines.push(item_line(i + 1, item));
        match &item.group {
            Some(group) => lines.push(format!("{}Group: {}", indent(1), group)),
            None => lines.push(format!("{}Source: {}", indent(1), item.id)),
        }
        if let Some(placement) = layout.placement(&item.id) {
            let measured = metrics.contains_key(&item.id);
            lines.push(format!("{}{}", indent(1), box_line(placement, measured)));
        }
        if let Some(link) = &item.link_target {
            lines.push(format!("{}Link: {}", indent(1), link));
        }
    }
    lines
}

pub fn print_layout_output(
    layout: &Layout,
    items: &[GalleryItem],
    metrics: &HashMap<String, ImageMetrics>,
    container_width: f64,
) {
    for line in format_layout_output(layout, items, metrics, container_width) {
        println!("{}", line);
    }
}

/// Machine-readable layout report for `--json`.
#[derive(Debug, Serialize)]
pub struct LayoutReport<'a> {
    pub container_width: f64,
    pub viewport_width: f64,
    pub columns: usize,
    pub column_width: f64,
    pub height: f64,
    pub items: &'a [GalleryItem],
    pub placements: &'a [Placement],
}

impl<'a> LayoutReport<'a> {
    pub fn new(
        layout: &'a Layout,
        items: &'a [GalleryItem],
        container_width: f64,
        viewport_width: f64,
    ) -> Self {
        Self {
            container_width,
            viewport_width,
            columns: layout.column_heights.len(),
            column_width: layout.column_width,
            height: layout.height,
            items,
            placements: &layout.placements,
        }
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format metric resolution results, one line per source plus a summary.
pub fn format_check_output(results: &[(String, Result<Dimensions, MetricError>)]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut failed = 0;
    for (uri, outcome) in results {
        match outcome {
            Ok(dims) => lines.push(format!(
                "ok      {} × {}  {}",
                dims.width, dims.height, uri
            )),
            Err(e) => {
                failed += 1;
                lines.push(format!("FAILED  {}: {}", uri, e));
            }
        }
    }
    if !results.is_empty() {
        lines.push(String::new());
    }
    let measured = results.len() - failed;
    let mut summary = format!("{} of {} images measured", measured, results.len());
    if failed > 0 {
        summary.push_str(&format!(", {} failed", failed));
    }
    lines.push(summary);
    lines
}

pub fn print_check_output(results: &[(String, Result<Dimensions, MetricError>)]) {
    for line in format_check_output(results) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{layout_of, metrics_map};

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_single_digit() {
        assert_eq!(format_index(1), "001");
    }

    #[test]
    fn format_index_triple_digit() {
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn item_line_with_alt() {
        let item = GalleryItem::new("001-sunset.jpg", "x").with_alt("The Sunset");
        assert_eq!(item_line(1, &item), "001 The Sunset");
    }

    #[test]
    fn item_line_without_alt_shows_id() {
        let item = GalleryItem::new("010.jpg", "x");
        assert_eq!(item_line(3, &item), "003 (010.jpg)");
    }

    #[test]
    fn box_line_marks_fallback() {
        let p = &layout_of(&[("a", 10.0, 20.0)]).placements[0];
        assert_eq!(box_line(p, true), "Box: x 10.0, y 20.0, 100.0 × 120.0");
        assert!(box_line(p, false).ends_with("(fallback)"));
    }

    // =========================================================================
    // Layout output tests
    // =========================================================================

    #[test]
    fn layout_output_lists_every_item() {
        let layout = layout_of(&[("a", 0.0, 0.0), ("b", 116.0, 0.0)]);
        let items = vec![
            GalleryItem::new("a", "a.jpg").with_alt("Dawn"),
            GalleryItem::new("b", "b.jpg")
                .with_group("Japan")
                .with_link("https://example.com"),
        ];
        let metrics = metrics_map(&[("a", 100, 120)]);

        let lines = format_layout_output(&layout, &items, &metrics, 232.0);
        assert!(lines[0].starts_with("Layout 232px"));
        assert_eq!(lines[1], "001 Dawn");
        assert_eq!(lines[2], "    Source: a");
        assert!(!lines[3].contains("fallback"));
        assert_eq!(lines[4], "002 (b)");
        assert_eq!(lines[5], "    Group: Japan");
        assert!(lines[6].contains("fallback"));
        assert_eq!(lines[7], "    Link: https://example.com");
    }

    #[test]
    fn layout_output_degenerate() {
        let items = vec![GalleryItem::new("a", "a.jpg")];
        let lines = format_layout_output(&Layout::default(), &items, &HashMap::new(), 0.0);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("No layout"));
    }

    #[test]
    fn layout_report_serializes() {
        let layout = layout_of(&[("a", 0.0, 0.0)]);
        let items = vec![GalleryItem::new("a", "a.jpg")];
        let report = LayoutReport::new(&layout, &items, 800.0, 1024.0);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["placements"][0]["item_id"], "a");
        assert_eq!(json["viewport_width"], 1024.0);
        assert!(json["items"][0].get("link_target").is_none());
    }

    // =========================================================================
    // Check output tests
    // =========================================================================

    #[test]
    fn check_output_summarizes_failures() {
        let results = vec![
            (
                "001-dawn.jpg".to_string(),
                Ok(Dimensions {
                    width: 800,
                    height: 600,
                }),
            ),
            (
                "002-broken.jpg".to_string(),
                Err(MetricError::Measure {
                    uri: "002-broken.jpg".into(),
                    reason: "truncated".into(),
                }),
            ),
        ];
        let lines = format_check_output(&results);
        assert_eq!(lines[0], "ok      800 × 600  001-dawn.jpg");
        assert!(lines[1].starts_with("FAILED  002-broken.jpg"));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "1 of 2 images measured, 1 failed");
    }

    #[test]
    fn check_output_empty() {
        assert_eq!(format_check_output(&[]), vec!["0 of 0 images measured"]);
    }
}
