//! Tween descriptions and sampling.
//!
//! A [`Tween`] says *what* should happen to one tile's visual box. Drivers
//! decide how to play it; [`Tween::sample`] is the reference interpolation
//! they (and the built-in timeline) use.

use super::TweenTag;
use super::easing::Easing;
use crate::types::{Rect, lerp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenKind {
    /// First appearance, from a synthetic off-screen box.
    Enter,
    /// Prior placement to new placement.
    Move,
    /// Transient hover feedback; the box does not move.
    Hover,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween {
    pub kind: TweenKind,
    /// Layout pass this tween belongs to.
    pub generation: u64,
    /// Position in the owning tile's tween sequence.
    pub seq: u64,
    pub from: Rect,
    pub to: Rect,
    /// Seconds before the tween starts moving.
    pub delay: f64,
    pub duration: f64,
    pub easing: Easing,
    /// Blur radius in pixels, `(from, to)`.
    pub blur: Option<(f64, f64)>,
    pub scale: Option<(f64, f64)>,
    /// Tint overlay opacity, `(from, to)`.
    pub overlay: Option<(f64, f64)>,
}

/// Visual state of a tile at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub rect: Rect,
    pub blur: f64,
    pub scale: f64,
    pub overlay: f64,
}

impl Tween {
    /// What a completion for this tween carries back.
    pub fn tag(&self) -> TweenTag {
        TweenTag {
            generation: self.generation,
            seq: self.seq,
        }
    }

    /// Start from where an interrupted tween left the tile.
    ///
    /// The box starts at the stopped frame, and any effect the tile is still
    /// showing eases back from its current value.
    pub fn continue_from(&mut self, frame: &Frame) {
        self.from = frame.rect;
        self.blur = resume(self.blur, frame.blur, 0.0);
        self.scale = resume(self.scale, frame.scale, 1.0);
        self.overlay = resume(self.overlay, frame.overlay, 0.0);
    }

    /// Total run time including the delay.
    pub fn total(&self) -> f64 {
        self.delay + self.duration
    }

    /// Linear progress in `[0, 1]` at `elapsed` seconds after start.
    pub fn progress(&self, elapsed: f64) -> f64 {
        if self.duration <= 0.0 {
            return if elapsed >= self.delay { 1.0 } else { 0.0 };
        }
        ((elapsed - self.delay) / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self, elapsed: f64) -> bool {
        elapsed >= self.total()
    }

    pub fn sample(&self, elapsed: f64) -> Frame {
        let t = self.easing.apply(self.progress(elapsed));
        let channel = |range: Option<(f64, f64)>, rest: f64| match range {
            Some((from, to)) => lerp(from, to, t),
            None => rest,
        };
        Frame {
            rect: self.from.lerp(&self.to, t),
            blur: channel(self.blur, 0.0),
            scale: channel(self.scale, 1.0),
            overlay: channel(self.overlay, 0.0),
        }
    }
}

fn resume(range: Option<(f64, f64)>, current: f64, rest: f64) -> Option<(f64, f64)> {
    match range {
        Some((_, to)) => Some((current, to)),
        None if current != rest => Some((current, rest)),
        None => None,
    }
}
