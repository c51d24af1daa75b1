//! # Masonry Gal
//!
//! A masonry gallery layout engine. Images of varying aspect ratio are packed
//! into uniform-width columns so column heights stay as close as possible;
//! layouts recompute on resize and on image load, and tiles animate from
//! their previous box to the new one.
//!
//! # Architecture
//!
//! The engine is a set of small components, wired together by
//! [`gallery::MasonryGallery`]:
//!
//! ```text
//! viewport width ──► breakpoints ──► columns ─┐
//! container size ──► observer ───► width ─────┼──► layout ──► animation ──► AnimationDriver
//! image sources ───► metrics ────► aspects ───┘
//!
//! activation ──────► interaction ──► click handler / LinkOpener
//! ```
//!
//! The layout computer is a pure function. Everything that touches the
//! outside world (measuring images, playing animations, opening links) goes
//! through a trait injected at construction, so the engine runs the same in a
//! test, a CLI, or a UI host.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Shared data: `GalleryItem`, `ImageMetrics`, `Placement`, `Rect`, `Size` |
//! | [`breakpoints`] | Viewport width → column count, with crossing detection |
//! | [`observer`] | Frame-coalesced container size tracking |
//! | [`metrics`] | Concurrent, cached image dimension loading on rayon |
//! | [`layout`] | Shortest-column placement algorithm |
//! | [`animation`] | Per-tile state machine, tweens, easing, built-in timeline driver |
//! | [`interaction`] | Click handler / link opener dispatch |
//! | [`gallery`] | The engine: host events in, layout passes out |
//! | [`config`] | `masonry.toml` loading, validation, merging |
//! | [`scan`] | Directory of images → ordered item list (CLI content source) |
//! | [`output`] | CLI output formatting |
//! | [`preview`] | Static HTML preview of a layout with Maud |
//!
//! # Design Decisions
//!
//! ## Last Write Wins
//!
//! Resizes and image loads can arrive faster than animations finish. Every
//! layout pass carries a generation number; a new pass cancels whatever a
//! tile is playing and moves it on from wherever the driver stopped it, never
//! queueing. Each tween is tagged with its pass and its place in the tile's
//! sequence, and completions for anything but the current tween are ignored.
//!
//! ## Determinism By Default
//!
//! With jitter disabled (the default), the same items, metrics and geometry
//! always produce the same placements. Jitter and the random entry direction
//! are seeded, so they are reproducible too.
//!
//! ## Unknown Sizes Never Block
//!
//! Items whose image has not been measured yet, or failed to measure, are laid
//! out at a fallback aspect ratio. When the real size arrives the next frame
//! relayouts and the tile animates to its corrected box.

pub mod animation;
pub mod breakpoints;
pub mod config;
pub mod gallery;
pub mod interaction;
pub mod layout;
pub mod metrics;
pub mod observer;
pub mod output;
pub mod preview;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
