//! Placement animation.
//!
//! The animator keeps one [`Tile`] per item in an arena addressed by
//! [`TileHandle`]s. Layout passes, pointer events and completions go through
//! each tile's state machine, which emits driver commands. Playing the tweens
//! is the job of an injected [`AnimationDriver`], so nothing here depends on a
//! particular animation runtime.
//!
//! - **Easing**: named curves ([`Easing`])
//! - **Tween**: what to animate and how to sample it ([`Tween`], [`Frame`])
//! - **Tile**: the per-tile state machine ([`Tile`], [`TileState`])
//! - **Animator**: arena, start boxes, stagger ([`Animator`])
//! - **Timeline**: a self-contained driver that plays tweens on `tick(dt)` ([`TimelineDriver`])

mod animator;
mod easing;
mod tile;
mod timeline;
mod tween;

pub use animator::{Animator, Stage};
pub use easing::Easing;
pub use tile::{Command, Tile, TileEvent, TileState};
pub use timeline::TimelineDriver;
pub use tween::{Frame, Tween, TweenKind};

use serde::{Deserialize, Serialize};

/// Stable index of a tile in the animator's arena.
///
/// Valid while its item stays in the list; slots of removed items are reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileHandle(pub usize);

/// Identifies one tween when its completion is reported.
///
/// `generation` is the layout pass that started it; `seq` counts tweens per
/// tile, so hover tweens within one pass stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TweenTag {
    pub generation: u64,
    pub seq: u64,
}

/// Plays tweens for tiles.
///
/// `start` replaces whatever the tile was playing. `cancel` stops the tile
/// where it is and returns that frame when the driver knows it; the next
/// tween then starts from there instead of jumping. Completion is reported
/// back by the host through [`Animator::complete`] with the tween's tag.
pub trait AnimationDriver {
    fn start(&mut self, tile: TileHandle, tween: &Tween);
    fn cancel(&mut self, tile: TileHandle) -> Option<Frame>;
}

/// Where entering tiles come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimateFrom {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
    /// One of the four edges, chosen per item.
    Random,
}
