//! A driver that plays tweens against an explicit clock.
//!
//! Hosts without an animation runtime of their own call [`TimelineDriver::tick`]
//! once per frame with the elapsed seconds, read each tile's [`Frame`] for
//! rendering, and feed the returned completions back to the animator.

use super::tween::{Frame, Tween};
use super::{AnimationDriver, TileHandle, TweenTag};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Active {
    tween: Tween,
    elapsed: f64,
}

#[derive(Debug, Default)]
pub struct TimelineDriver {
    active: HashMap<TileHandle, Active>,
    /// Where each tile came to rest after finishing or being cancelled.
    resting: HashMap<TileHandle, Frame>,
}

impl TimelineDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance every active tween by `dt` seconds.
    ///
    /// Returns `(tile, tag)` for each tween that finished, in handle order.
    pub fn tick(&mut self, dt: f64) -> Vec<(TileHandle, TweenTag)> {
        let mut finished = Vec::new();
        for (handle, active) in self.active.iter_mut() {
            active.elapsed += dt;
            if active.tween.is_finished(active.elapsed) {
                finished.push((*handle, active.tween.tag()));
            }
        }
        finished.sort();
        for (handle, _) in &finished {
            if let Some(active) = self.active.remove(handle) {
                self.resting
                    .insert(*handle, active.tween.sample(active.tween.total()));
            }
        }
        finished
    }

    /// Current visual state of a tile, if it has ever been animated.
    pub fn frame(&self, tile: TileHandle) -> Option<Frame> {
        match self.active.get(&tile) {
            Some(active) => Some(active.tween.sample(active.elapsed)),
            None => self.resting.get(&tile).copied(),
        }
    }

    pub fn is_animating(&self, tile: TileHandle) -> bool {
        self.active.contains_key(&tile)
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}

impl AnimationDriver for TimelineDriver {
    fn start(&mut self, tile: TileHandle, tween: &Tween) {
        self.active.insert(
            tile,
            Active {
                tween: tween.clone(),
                elapsed: 0.0,
            },
        );
    }

    fn cancel(&mut self, tile: TileHandle) -> Option<Frame> {
        let active = self.active.remove(&tile)?;
        let stopped = active.tween.sample(active.elapsed);
        self.resting.insert(tile, stopped);
        Some(stopped)
    }
}
