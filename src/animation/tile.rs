//! Per-tile animation state machine.
//!
//! ```text
//!                 LayoutPassArrived (new box)
//!   ┌──────────┐ ───────────────────────────▶ ┌─────────────────────────┐
//!   │ Entering │                              │ AnimatingToNewPlacement │◀─┐
//!   └──────────┘                              └─────────────────────────┘  │
//!        │ AnimationComplete                        │ AnimationComplete    │
//!        ▼                                          ▼                      │
//!   ┌─────────┐   PointerEnter   ┌─────────┐                               │
//!   │ Settled │ ───────────────▶ │ Hovered │ ──────────────────────────────┘
//!   └─────────┘ ◀─────────────── └─────────┘      LayoutPassArrived
//!                 PointerLeave
//! ```
//!
//! A tile never plays two tweens at once: every transition that starts a
//! tween while another is in flight cancels the old one first. Completions
//! are matched on the full [`TweenTag`], so a report from a tween that has
//! since been replaced is ignored, including a hover tween from the same pass.

use super::TweenTag;
use super::easing::Easing;
use super::tween::{Tween, TweenKind};
use crate::config::AnimationConfig;
use crate::types::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileState {
    Entering,
    Settled,
    AnimatingToNewPlacement,
    Hovered,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TileEvent {
    LayoutPassArrived { placement: Rect, generation: u64 },
    AnimationComplete { tag: TweenTag },
    PointerEnter,
    PointerLeave,
}

/// What the animator must tell the driver after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Cancel,
    Start(Tween),
}

const HOVER_EASING: Easing = Easing::Out(2);

#[derive(Debug, Clone)]
pub struct Tile {
    pub item_id: String,
    state: TileState,
    /// Target box of the latest pass. Hover never changes it.
    committed: Rect,
    /// Generation of the latest pass that moved this tile.
    generation: u64,
    /// Sequence number of the tween currently in flight (or last played).
    seq: u64,
    in_flight: bool,
    pointer_inside: bool,
    scale: f64,
    overlay: f64,
}

impl Tile {
    /// Create a tile in `Entering`, returning the tween that brings it on screen.
    pub fn enter(
        item_id: String,
        start: Rect,
        placement: Rect,
        delay: f64,
        generation: u64,
        config: &AnimationConfig,
    ) -> (Self, Tween) {
        let tween = Tween {
            kind: TweenKind::Enter,
            generation,
            seq: 1,
            from: start,
            to: placement,
            delay,
            duration: config.duration,
            easing: config.easing,
            blur: config.blur_to_focus.then_some((config.blur_px, 0.0)),
            scale: None,
            overlay: None,
        };
        let tile = Self {
            item_id,
            state: TileState::Entering,
            committed: placement,
            generation,
            seq: 1,
            in_flight: true,
            pointer_inside: false,
            scale: 1.0,
            overlay: 0.0,
        };
        (tile, tween)
    }

    pub fn state(&self) -> TileState {
        self.state
    }

    pub fn committed(&self) -> Rect {
        self.committed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Tag of the tween currently in flight (or last played).
    pub fn tag(&self) -> TweenTag {
        TweenTag {
            generation: self.generation,
            seq: self.seq,
        }
    }

    pub fn is_animating(&self) -> bool {
        self.in_flight
    }

    /// Target hover scale (1.0 when not hovered).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn overlay(&self) -> f64 {
        self.overlay
    }

    /// Apply one trigger and return the driver commands it implies.
    pub fn handle(&mut self, event: TileEvent, config: &AnimationConfig) -> Vec<Command> {
        match event {
            TileEvent::LayoutPassArrived {
                placement,
                generation,
            } => self.on_layout(placement, generation, config),
            TileEvent::AnimationComplete { tag } => self.on_complete(tag, config),
            TileEvent::PointerEnter => self.on_pointer_enter(config),
            TileEvent::PointerLeave => self.on_pointer_leave(config),
        }
    }

    fn on_layout(&mut self, placement: Rect, generation: u64, config: &AnimationConfig) -> Vec<Command> {
        // Same box: whatever is playing already heads there.
        if placement == self.committed {
            return Vec::new();
        }
        let mut commands = self.cancel_in_flight();
        self.generation = generation;
        let tween = Tween {
            kind: TweenKind::Move,
            generation,
            seq: self.next_seq(),
            from: self.committed,
            to: placement,
            delay: 0.0,
            duration: config.duration,
            easing: config.easing,
            blur: None,
            scale: (self.scale != 1.0).then_some((self.scale, 1.0)),
            overlay: (self.overlay != 0.0).then_some((self.overlay, 0.0)),
        };
        self.committed = placement;
        self.in_flight = true;
        self.scale = 1.0;
        self.overlay = 0.0;
        self.state = TileState::AnimatingToNewPlacement;
        commands.push(Command::Start(tween));
        commands
    }

    fn on_complete(&mut self, tag: TweenTag, config: &AnimationConfig) -> Vec<Command> {
        if !self.in_flight || tag != self.tag() {
            tracing::trace!(
                item = %self.item_id,
                generation = tag.generation,
                seq = tag.seq,
                "stale completion ignored"
            );
            return Vec::new();
        }
        self.in_flight = false;
        match self.state {
            TileState::Entering | TileState::AnimatingToNewPlacement => {
                if self.pointer_inside && hover_enabled(config) {
                    self.state = TileState::Hovered;
                    vec![Command::Start(self.hover_tween(true, config))]
                } else {
                    self.state = TileState::Settled;
                    Vec::new()
                }
            }
            TileState::Settled | TileState::Hovered => Vec::new(),
        }
    }

    fn on_pointer_enter(&mut self, config: &AnimationConfig) -> Vec<Command> {
        self.pointer_inside = true;
        if self.state != TileState::Settled || !hover_enabled(config) {
            return Vec::new();
        }
        let mut commands = self.cancel_in_flight();
        self.state = TileState::Hovered;
        commands.push(Command::Start(self.hover_tween(true, config)));
        commands
    }

    fn on_pointer_leave(&mut self, config: &AnimationConfig) -> Vec<Command> {
        self.pointer_inside = false;
        if self.state != TileState::Hovered {
            return Vec::new();
        }
        let mut commands = self.cancel_in_flight();
        self.state = TileState::Settled;
        commands.push(Command::Start(self.hover_tween(false, config)));
        commands
    }

    fn cancel_in_flight(&mut self) -> Vec<Command> {
        if self.in_flight {
            self.in_flight = false;
            vec![Command::Cancel]
        } else {
            Vec::new()
        }
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    /// Scale/tint tween in place. Marks the tile as animating.
    fn hover_tween(&mut self, entering: bool, config: &AnimationConfig) -> Tween {
        let target_scale = if entering && config.scale_on_hover {
            config.hover_scale
        } else {
            1.0
        };
        let target_overlay = if entering && config.color_shift_on_hover {
            config.overlay_opacity
        } else {
            0.0
        };
        let tween = Tween {
            kind: TweenKind::Hover,
            generation: self.generation,
            seq: self.next_seq(),
            from: self.committed,
            to: self.committed,
            delay: 0.0,
            duration: config.hover_duration,
            easing: HOVER_EASING,
            blur: None,
            scale: Some((self.scale, target_scale)),
            overlay: config
                .color_shift_on_hover
                .then_some((self.overlay, target_overlay)),
        };
        self.scale = target_scale;
        self.overlay = target_overlay;
        self.in_flight = true;
        tween
    }
}

fn hover_enabled(config: &AnimationConfig) -> bool {
    config.scale_on_hover || config.color_shift_on_hover
}
