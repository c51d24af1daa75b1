use super::tile::{Command, Tile, TileEvent};
use super::{AnimateFrom, AnimationDriver, TileHandle, TweenTag};
use crate::config::AnimationConfig;
use crate::layout::Layout;
use crate::types::{Rect, Size};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};

/// How far past the edge entering tiles start, in pixels.
const OFFSCREEN_MARGIN: f64 = 200.0;

const EDGES: [AnimateFrom; 4] = [
    AnimateFrom::Top,
    AnimateFrom::Bottom,
    AnimateFrom::Left,
    AnimateFrom::Right,
];

/// Geometry the start boxes are computed against.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stage {
    pub viewport: Size,
    pub container: Size,
}

/// Arena of tiles plus the rules for bringing new ones on screen.
pub struct Animator {
    config: AnimationConfig,
    slots: Vec<Option<Tile>>,
    free: Vec<usize>,
    index: HashMap<String, TileHandle>,
    rng: StdRng,
}

impl Animator {
    pub fn new(config: AnimationConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            config,
            slots: Vec::new(),
            free: Vec::new(),
            index: HashMap::new(),
            rng,
        }
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Run a layout pass through every tile.
    ///
    /// Tiles whose item is gone are cancelled and freed. Known tiles move from
    /// their prior placement; new ones enter from the configured direction with
    /// a stagger that grows with their position in this batch.
    pub fn apply_layout(
        &mut self,
        layout: &Layout,
        generation: u64,
        stage: Stage,
        driver: &mut dyn AnimationDriver,
    ) {
        self.retain(layout.placements.iter().map(|p| p.item_id.as_str()), driver);

        let mut entering = 0usize;
        for placement in &layout.placements {
            let target = placement.rect();
            if let Some(&handle) = self.index.get(&placement.item_id) {
                let Some(tile) = self.slots[handle.0].as_mut() else {
                    continue;
                };
                let commands = tile.handle(
                    TileEvent::LayoutPassArrived {
                        placement: target,
                        generation,
                    },
                    &self.config,
                );
                dispatch(driver, handle, commands);
            } else {
                let start = self.start_rect(target, stage);
                let delay = self.stagger_delay(entering);
                entering += 1;
                let (tile, tween) = Tile::enter(
                    placement.item_id.clone(),
                    start,
                    target,
                    delay,
                    generation,
                    &self.config,
                );
                let handle = self.insert(tile);
                driver.start(handle, &tween);
            }
        }
        tracing::debug!(
            generation,
            tiles = self.index.len(),
            entering,
            "layout pass applied"
        );
    }

    /// Cancel and free every tile whose id is not in `ids`.
    pub fn retain<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a str>,
        driver: &mut dyn AnimationDriver,
    ) {
        let present: HashSet<&str> = ids.into_iter().collect();
        let gone: Vec<String> = self
            .index
            .keys()
            .filter(|id| !present.contains(id.as_str()))
            .cloned()
            .collect();
        for id in gone {
            self.remove(&id, driver);
        }
    }

    /// Forward a completion. Stale tags are ignored by the tile.
    pub fn complete(&mut self, handle: TileHandle, tag: TweenTag, driver: &mut dyn AnimationDriver) {
        self.send(handle, TileEvent::AnimationComplete { tag }, driver);
    }

    pub fn pointer_enter(&mut self, item_id: &str, driver: &mut dyn AnimationDriver) {
        if let Some(handle) = self.handle(item_id) {
            self.send(handle, TileEvent::PointerEnter, driver);
        }
    }

    pub fn pointer_leave(&mut self, item_id: &str, driver: &mut dyn AnimationDriver) {
        if let Some(handle) = self.handle(item_id) {
            self.send(handle, TileEvent::PointerLeave, driver);
        }
    }

    /// Cancel and drop every tile.
    pub fn clear(&mut self, driver: &mut dyn AnimationDriver) {
        let ids: Vec<String> = self.index.keys().cloned().collect();
        for id in ids {
            self.remove(&id, driver);
        }
    }

    pub fn handle(&self, item_id: &str) -> Option<TileHandle> {
        self.index.get(item_id).copied()
    }

    pub fn tile(&self, handle: TileHandle) -> Option<&Tile> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    pub fn tile_by_id(&self, item_id: &str) -> Option<&Tile> {
        self.handle(item_id).and_then(|h| self.tile(h))
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn send(&mut self, handle: TileHandle, event: TileEvent, driver: &mut dyn AnimationDriver) {
        let Some(tile) = self.slots.get_mut(handle.0).and_then(Option::as_mut) else {
            return;
        };
        let commands = tile.handle(event, &self.config);
        dispatch(driver, handle, commands);
    }

    fn insert(&mut self, tile: Tile) -> TileHandle {
        let id = tile.item_id.clone();
        let handle = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(tile);
                TileHandle(slot)
            }
            None => {
                self.slots.push(Some(tile));
                TileHandle(self.slots.len() - 1)
            }
        };
        self.index.insert(id, handle);
        handle
    }

    fn remove(&mut self, item_id: &str, driver: &mut dyn AnimationDriver) {
        if let Some(handle) = self.index.remove(item_id) {
            driver.cancel(handle);
            self.slots[handle.0] = None;
            self.free.push(handle.0);
        }
    }

    fn stagger_delay(&self, position: usize) -> f64 {
        (position as f64 * self.config.stagger).min(self.config.max_stagger_delay)
    }

    fn start_rect(&mut self, target: Rect, stage: Stage) -> Rect {
        let direction = match self.config.animate_from {
            AnimateFrom::Random => EDGES[self.rng.gen_range(0..EDGES.len())],
            fixed => fixed,
        };
        match direction {
            AnimateFrom::Top => Rect {
                y: -OFFSCREEN_MARGIN,
                ..target
            },
            AnimateFrom::Bottom | AnimateFrom::Random => Rect {
                y: stage.viewport.height + OFFSCREEN_MARGIN,
                ..target
            },
            AnimateFrom::Left => Rect {
                x: -OFFSCREEN_MARGIN,
                ..target
            },
            AnimateFrom::Right => Rect {
                x: stage.viewport.width + OFFSCREEN_MARGIN,
                ..target
            },
            AnimateFrom::Center => Rect {
                x: stage.container.width / 2.0 - target.width / 2.0,
                y: stage.container.height / 2.0 - target.height / 2.0,
                ..target
            },
        }
    }
}

/// Send a tile's commands to the driver. A tween that replaces a cancelled
/// one starts from wherever the driver says the tile stopped.
fn dispatch(driver: &mut dyn AnimationDriver, handle: TileHandle, commands: Vec<Command>) {
    let mut stopped = None;
    for command in commands {
        match command {
            Command::Cancel => stopped = driver.cancel(handle),
            Command::Start(mut tween) => {
                if let Some(frame) = stopped.take() {
                    tween.continue_from(&frame);
                }
                driver.start(handle, &tween);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::tests::RecordingDriver;
    use crate::animation::{TileState, TimelineDriver, TweenKind};
    use crate::test_helpers::layout_of;

    fn stage() -> Stage {
        Stage {
            viewport: Size::new(1280.0, 800.0),
            container: Size::new(1200.0, 2000.0),
        }
    }

    #[test]
    fn first_pass_enters_every_tile_from_below() {
        let mut animator = Animator::new(AnimationConfig::default());
        let mut driver = RecordingDriver::default();
        let layout = layout_of(&[("a", 0.0, 0.0), ("b", 200.0, 0.0)]);

        animator.apply_layout(&layout, 1, stage(), &mut driver);

        let starts = driver.starts();
        assert_eq!(starts.len(), 2);
        for (_, tween) in &starts {
            assert_eq!(tween.kind, TweenKind::Enter);
            assert_eq!(tween.from.y, 800.0 + OFFSCREEN_MARGIN);
        }
        assert_eq!(animator.len(), 2);
    }

    #[test]
    fn stagger_grows_and_is_capped() {
        let config = AnimationConfig {
            stagger: 0.1,
            max_stagger_delay: 0.25,
            ..Default::default()
        };
        let mut animator = Animator::new(config);
        let mut driver = RecordingDriver::default();
        let layout = layout_of(&[("a", 0.0, 0.0), ("b", 0.0, 0.0), ("c", 0.0, 0.0), ("d", 0.0, 0.0)]);

        animator.apply_layout(&layout, 1, stage(), &mut driver);

        let delays: Vec<f64> = driver.starts().iter().map(|(_, t)| t.delay).collect();
        assert_eq!(delays[0], 0.0);
        assert!((delays[1] - 0.1).abs() < 1e-12);
        assert!((delays[2] - 0.2).abs() < 1e-12);
        assert_eq!(delays[3], 0.25);
    }

    #[test]
    fn second_pass_moves_from_prior_box() {
        let mut animator = Animator::new(AnimationConfig::default());
        let mut driver = RecordingDriver::default();
        animator.apply_layout(&layout_of(&[("a", 0.0, 0.0)]), 1, stage(), &mut driver);
        driver.clear();

        animator.apply_layout(&layout_of(&[("a", 300.0, 40.0)]), 2, stage(), &mut driver);

        // Still entering, so the old tween is cancelled first.
        assert_eq!(driver.cancels().len(), 1);
        let starts = driver.starts();
        assert_eq!(starts.len(), 1);
        let (_, tween) = starts[0];
        assert_eq!(tween.kind, TweenKind::Move);
        assert_eq!(tween.from.x, 0.0);
        assert_eq!(tween.to.x, 300.0);
        assert_eq!(tween.delay, 0.0);
    }

    #[test]
    fn interrupted_move_starts_where_the_tile_stopped() {
        let mut animator = Animator::new(AnimationConfig {
            easing: crate::animation::Easing::Linear,
            duration: 1.0,
            ..Default::default()
        });
        let mut driver = TimelineDriver::new();
        animator.apply_layout(&layout_of(&[("a", 0.0, 0.0)]), 1, stage(), &mut driver);
        let h = animator.handle("a").unwrap();
        driver.tick(0.5);
        let before = driver.frame(h).unwrap();
        assert_eq!(before.rect.y, (800.0 + OFFSCREEN_MARGIN) / 2.0);

        animator.apply_layout(&layout_of(&[("a", 300.0, 40.0)]), 2, stage(), &mut driver);

        assert_eq!(driver.frame(h), Some(before));
        driver.tick(1.0);
        assert_eq!(driver.frame(h).unwrap().rect.x, 300.0);
        assert_eq!(driver.frame(h).unwrap().rect.y, 40.0);
    }

    #[test]
    fn removed_items_are_cancelled_and_slots_reused() {
        let mut animator = Animator::new(AnimationConfig::default());
        let mut driver = RecordingDriver::default();
        animator.apply_layout(&layout_of(&[("a", 0.0, 0.0), ("b", 0.0, 0.0)]), 1, stage(), &mut driver);
        let b = animator.handle("b").unwrap();
        driver.clear();

        animator.apply_layout(&layout_of(&[("a", 0.0, 0.0), ("c", 0.0, 0.0)]), 2, stage(), &mut driver);

        assert_eq!(driver.cancels(), vec![b]);
        assert!(animator.handle("b").is_none());
        assert_eq!(animator.handle("c"), Some(b));
    }

    #[test]
    fn stale_completion_for_reused_slot_is_ignored() {
        let mut animator = Animator::new(AnimationConfig::default());
        let mut driver = RecordingDriver::default();
        animator.apply_layout(&layout_of(&[("b", 0.0, 0.0)]), 1, stage(), &mut driver);
        let handle = animator.handle("b").unwrap();
        animator.apply_layout(&layout_of(&[("c", 0.0, 0.0)]), 2, stage(), &mut driver);

        let old_tile = TweenTag {
            generation: 1,
            seq: 1,
        };
        animator.complete(handle, old_tile, &mut driver);
        assert_eq!(animator.tile(handle).unwrap().state(), TileState::Entering);
        let current = animator.tile(handle).unwrap().tag();
        animator.complete(handle, current, &mut driver);
        assert_eq!(animator.tile(handle).unwrap().state(), TileState::Settled);
    }

    #[test]
    fn fixed_directions() {
        let target = Rect {
            x: 100.0,
            y: 100.0,
            width: 50.0,
            height: 80.0,
        };
        let start = |from| {
            let mut a = Animator::new(AnimationConfig {
                animate_from: from,
                ..Default::default()
            });
            a.start_rect(target, stage())
        };
        assert_eq!(start(AnimateFrom::Top).y, -OFFSCREEN_MARGIN);
        assert_eq!(start(AnimateFrom::Left).x, -OFFSCREEN_MARGIN);
        assert_eq!(start(AnimateFrom::Right).x, 1280.0 + OFFSCREEN_MARGIN);
        let center = start(AnimateFrom::Center);
        assert_eq!(center.x, 600.0 - 25.0);
        assert_eq!(center.y, 1000.0 - 40.0);
        assert_eq!(center.width, 50.0);
    }

    #[test]
    fn random_direction_is_an_edge_and_seeded() {
        let config = AnimationConfig {
            animate_from: AnimateFrom::Random,
            seed: 42,
            ..Default::default()
        };
        let target = Rect {
            x: 100.0,
            y: 100.0,
            width: 50.0,
            height: 80.0,
        };
        let mut a = Animator::new(config.clone());
        let mut b = Animator::new(config);
        for _ in 0..20 {
            let ra = a.start_rect(target, stage());
            let rb = b.start_rect(target, stage());
            assert_eq!(ra, rb);
            let moved_x = ra.x != target.x;
            let moved_y = ra.y != target.y;
            assert!(moved_x ^ moved_y, "start must leave along exactly one axis");
        }
    }

    #[test]
    fn hover_routes_by_id() {
        let mut animator = Animator::new(AnimationConfig::default());
        let mut driver = RecordingDriver::default();
        animator.apply_layout(&layout_of(&[("a", 0.0, 0.0)]), 1, stage(), &mut driver);
        let h = animator.handle("a").unwrap();
        let tag = animator.tile(h).unwrap().tag();
        animator.complete(h, tag, &mut driver);
        driver.clear();

        animator.pointer_enter("a", &mut driver);
        assert_eq!(animator.tile(h).unwrap().state(), TileState::Hovered);
        animator.pointer_enter("unknown", &mut driver);
        assert_eq!(driver.starts().len(), 1);

        animator.pointer_leave("a", &mut driver);
        assert_eq!(animator.tile(h).unwrap().state(), TileState::Settled);
    }

    #[test]
    fn clear_cancels_everything() {
        let mut animator = Animator::new(AnimationConfig::default());
        let mut driver = RecordingDriver::default();
        animator.apply_layout(&layout_of(&[("a", 0.0, 0.0), ("b", 0.0, 0.0)]), 1, stage(), &mut driver);
        driver.clear();
        animator.clear(&mut driver);
        assert_eq!(driver.cancels().len(), 2);
        assert!(animator.is_empty());
    }
}
