//! The gallery engine.
//!
//! [`MasonryGallery`] owns one of each component and turns host events into
//! layout passes:
//!
//! ```text
//! set_items ──────────┐
//! viewport_resized ───┤ (column count changed)
//! container_resized ──┼──► SizeObserver ──► frame() ──► dirty? ──► layout::compute
//! poll_metrics ───────┘  (new metrics)                               │
//!                                                                    ▼
//!                                          Animator::apply_layout(generation)
//!                                                                    │
//!                                                                    ▼
//!                                                           AnimationDriver
//! ```
//!
//! Input changes only mark the engine dirty. The pass itself runs once on the
//! next [`MasonryGallery::frame`], however many changes arrived in between.
//! Each pass bumps the generation; completions from earlier passes are
//! dropped by the tiles.
//!
//! Nothing here blocks except [`MasonryGallery::wait_for_metrics`], which
//! exists for batch callers such as the CLI.

use crate::animation::{
    AnimationDriver, Animator, Frame, Stage, TileHandle, TimelineDriver, TweenTag,
};
use crate::breakpoints::BreakpointWatcher;
use crate::config::{GalleryConfig, effective_threads};
use crate::interaction::{Activation, ClickHandler, Dispatcher};
use crate::layout::{self, Layout, LayoutOptions};
use crate::metrics::{MetricEvent, MetricLoader, MetricSource};
use crate::observer::SizeObserver;
use crate::types::{GalleryItem, ImageMetrics, Size};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub struct MasonryGallery<D: AnimationDriver> {
    config: GalleryConfig,
    options: LayoutOptions,
    items: Vec<GalleryItem>,
    metrics: HashMap<String, ImageMetrics>,
    loader: MetricLoader,
    observer: SizeObserver,
    watcher: BreakpointWatcher,
    viewport: Option<Size>,
    animator: Animator,
    dispatcher: Dispatcher,
    driver: D,
    generation: u64,
    dirty: bool,
    layout: Layout,
}

impl<D: AnimationDriver> MasonryGallery<D> {
    /// Engine with the default dispatcher (links are logged, not opened).
    ///
    /// `config` is expected to be validated already.
    pub fn new(config: GalleryConfig, source: Arc<dyn MetricSource>, driver: D) -> Self {
        let loader = MetricLoader::with_threads(source, effective_threads(&config.loading));
        Self {
            options: config.layout_options(),
            watcher: BreakpointWatcher::new(config.breakpoints()),
            animator: Animator::new(config.animation.clone()),
            config,
            items: Vec::new(),
            metrics: HashMap::new(),
            loader,
            observer: SizeObserver::new(),
            viewport: None,
            dispatcher: Dispatcher::default(),
            driver,
            generation: 0,
            dirty: false,
            layout: Layout::default(),
        }
    }

    pub fn with_dispatcher(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn set_click_handler(&mut self, handler: Option<ClickHandler>) {
        self.dispatcher.set_click_handler(handler);
    }

    // =========================================================================
    // Host events
    // =========================================================================

    /// Replace the item list.
    ///
    /// Later duplicates of an id are dropped. Metrics of items no longer in the
    /// list are discarded; new sources start loading immediately.
    pub fn set_items(&mut self, items: Vec<GalleryItem>) {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(items.len());
        for item in items {
            if seen.insert(item.id.clone()) {
                kept.push(item);
            } else {
                tracing::warn!(id = %item.id, "duplicate item id, keeping the first");
            }
        }
        self.items = kept;

        let ids: HashSet<&str> = self.items.iter().map(|i| i.id.as_str()).collect();
        self.metrics.retain(|id, _| ids.contains(id.as_str()));
        self.loader
            .retain(self.items.iter().map(|i| i.image_source.as_str()));
        self.loader
            .request(self.items.iter().map(|i| i.image_source.as_str()));

        // Sources shared with a previous list may already be resolved.
        for item in &self.items {
            if let Some(dims) = self.loader.dimensions(&item.image_source) {
                self.metrics
                    .entry(item.id.clone())
                    .or_insert_with(|| ImageMetrics {
                        item_id: item.id.clone(),
                        natural_width: dims.width,
                        natural_height: dims.height,
                    });
            }
        }
        self.dirty = true;
    }

    /// Viewport width drives the column count.
    pub fn viewport_resized(&mut self, size: Size) {
        self.viewport = Some(size);
        if self.watcher.observe(size.width).is_some() {
            self.dirty = true;
        }
    }

    /// Report a container measurement. Coalesced until the next frame.
    ///
    /// Only a width change leads to a pass; the height follows the layout.
    pub fn container_resized(&mut self, size: Size) {
        self.observer.observe(size);
    }

    /// Frame tick. Flushes the size observer and runs at most one layout pass.
    ///
    /// Returns the generation of the pass that ran, if any.
    pub fn frame(&mut self) -> Option<u64> {
        let previous = self.observer.current().map(|s| s.width);
        if let Some(size) = self.observer.on_frame() {
            if previous != Some(size.width) {
                self.dirty = true;
            }
        }
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.relayout())
    }

    /// Apply finished metric loads. Returns how many arrived.
    pub fn poll_metrics(&mut self) -> usize {
        let events = self.loader.drain();
        self.apply_metric_events(&events);
        events.len()
    }

    /// Block until every requested source has resolved or failed.
    pub fn wait_for_metrics(&mut self) -> usize {
        let events = self.loader.wait_all();
        self.apply_metric_events(&events);
        events.len()
    }

    pub fn pointer_enter(&mut self, item_id: &str) {
        self.animator.pointer_enter(item_id, &mut self.driver);
    }

    pub fn pointer_leave(&mut self, item_id: &str) {
        self.animator.pointer_leave(item_id, &mut self.driver);
    }

    /// Activate a tile. `None` if the id is not in the current list.
    pub fn activate(&mut self, item_id: &str) -> Option<Activation> {
        let index = self.items.iter().position(|i| i.id == item_id)?;
        let outcome = self.dispatcher.activate(&self.items[index]);
        Some(Activation {
            item_id: item_id.to_string(),
            index,
            count: self.items.len(),
            outcome,
        })
    }

    /// Completion callback from the driver.
    pub fn animation_complete(&mut self, handle: TileHandle, tag: TweenTag) {
        self.animator.complete(handle, tag, &mut self.driver);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Placements of the last pass.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn metrics(&self) -> &HashMap<String, ImageMetrics> {
        &self.metrics
    }

    pub fn items(&self) -> &[GalleryItem] {
        &self.items
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn columns(&self) -> usize {
        self.watcher.columns()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn pending_metrics(&self) -> usize {
        self.loader.pending_count()
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn apply_metric_events(&mut self, events: &[MetricEvent]) {
        let mut resolved = 0;
        for event in events {
            let Ok(dims) = &event.outcome else {
                continue;
            };
            for item in self
                .items
                .iter()
                .filter(|i| i.image_source == event.uri)
            {
                self.metrics.insert(
                    item.id.clone(),
                    ImageMetrics {
                        item_id: item.id.clone(),
                        natural_width: dims.width,
                        natural_height: dims.height,
                    },
                );
                resolved += 1;
            }
        }
        if resolved > 0 {
            self.dirty = true;
        }
    }

    fn relayout(&mut self) -> u64 {
        self.generation += 1;
        let generation = self.generation;

        let container = self.observer.current().unwrap_or_default();
        if self.viewport.is_none() {
            // No viewport reported; the container is the best stand-in.
            self.watcher.observe(container.width);
        }
        let columns = self.watcher.columns();

        if layout::column_width(container.width, columns, self.config.gap).is_none() {
            tracing::debug!(
                generation,
                container_width = container.width,
                columns,
                "degenerate geometry, skipping pass"
            );
            self.layout = Layout::default();
            // Tiles of removed items still go; the rest wait for a usable size.
            self.animator
                .retain(self.items.iter().map(|i| i.id.as_str()), &mut self.driver);
            return generation;
        }

        self.layout = layout::compute(
            self.items.iter().map(|i| i.id.as_str()),
            &self.metrics,
            columns,
            container.width,
            self.config.gap,
            &self.options,
        );
        let stage = Stage {
            viewport: self.viewport.unwrap_or(container),
            container: Size::new(container.width, self.layout.height),
        };
        self.animator
            .apply_layout(&self.layout, generation, stage, &mut self.driver);
        tracing::debug!(
            generation,
            columns,
            items = self.items.len(),
            height = self.layout.height,
            "layout pass"
        );
        generation
    }
}

impl MasonryGallery<TimelineDriver> {
    /// Advance the built-in timeline by `dt` seconds and feed completions back.
    ///
    /// Returns the number of tweens that finished.
    pub fn advance(&mut self, dt: f64) -> usize {
        let finished = self.driver.tick(dt);
        for (handle, tag) in &finished {
            self.animator.complete(*handle, *tag, &mut self.driver);
        }
        finished.len()
    }

    /// Current visual box and effects of an item's tile.
    pub fn tile_frame(&self, item_id: &str) -> Option<Frame> {
        self.animator
            .handle(item_id)
            .and_then(|h| self.driver.frame(h))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::tests::RecordingDriver;
    use crate::animation::{TileState, TweenKind};
    use crate::interaction::ActivationOutcome;
    use crate::metrics::source::tests::MockSource;
    use crate::test_helpers::items;

    const EPS: f64 = 1e-6;

    fn gallery_with(source: MockSource) -> MasonryGallery<RecordingDriver> {
        let mut config = GalleryConfig::default();
        config.gap = 20.0;
        MasonryGallery::new(config, Arc::new(source), RecordingDriver::default())
    }

    /// Six items `[1:1, 1:1, 2:1, 1:2, 1:1, 1:1]` with metrics already loaded.
    fn six_item_gallery() -> MasonryGallery<RecordingDriver> {
        let source = MockSource::with(&[
            ("item-0.jpg", 1000, 1000),
            ("item-1.jpg", 1000, 1000),
            ("item-2.jpg", 2000, 1000),
            ("item-3.jpg", 1000, 2000),
            ("item-4.jpg", 1000, 1000),
            ("item-5.jpg", 1000, 1000),
        ]);
        let mut g = gallery_with(source);
        g.set_items(items(6));
        g.wait_for_metrics();
        g
    }

    fn sized(g: &mut MasonryGallery<RecordingDriver>, width: f64) {
        g.viewport_resized(Size::new(width, 900.0));
        g.container_resized(Size::new(width, 900.0));
    }

    // =========================================================================
    // Layout passes
    // =========================================================================

    #[test]
    fn first_frame_lays_out_six_items() {
        let mut g = six_item_gallery();
        sized(&mut g, 1200.0);

        assert_eq!(g.frame(), Some(1));
        assert_eq!(g.columns(), 4);
        assert_eq!(g.layout().placements.len(), 6);
        assert_eq!(g.driver().starts().len(), 6);
        assert!(
            g.driver()
                .starts()
                .iter()
                .all(|(_, t)| t.kind == TweenKind::Enter)
        );
    }

    #[test]
    fn scenario_heights_at_three_columns() {
        let mut config = GalleryConfig::default();
        config.gap = 20.0;
        config.breakpoints.columns.retain(|bp| bp.columns <= 3);
        let source = MockSource::with(&[
            ("item-0.jpg", 1000, 1000),
            ("item-1.jpg", 1000, 1000),
            ("item-2.jpg", 2000, 1000),
            ("item-3.jpg", 1000, 2000),
            ("item-4.jpg", 1000, 1000),
            ("item-5.jpg", 1000, 1000),
        ]);
        let mut g = MasonryGallery::new(config, Arc::new(source), RecordingDriver::default());
        g.set_items(items(6));
        g.wait_for_metrics();
        sized(&mut g, 1200.0);
        g.frame();

        let cw = 1160.0 / 3.0;
        let layout = g.layout();
        assert!((layout.column_width - cw).abs() < EPS);
        let h = |id: &str| layout.placement(id).unwrap().height;
        assert!((h("item-0") - cw).abs() < EPS);
        assert!((h("item-2") - cw / 2.0).abs() < EPS);
        assert!((h("item-3") - cw * 2.0).abs() < EPS);
    }

    #[test]
    fn no_pass_without_changes() {
        let mut g = six_item_gallery();
        sized(&mut g, 1200.0);
        g.frame();
        assert_eq!(g.frame(), None);
        assert_eq!(g.generation(), 1);
    }

    #[test]
    fn changes_coalesce_into_one_pass() {
        let mut g = six_item_gallery();
        sized(&mut g, 1200.0);
        g.container_resized(Size::new(1180.0, 900.0));
        g.container_resized(Size::new(1200.0, 900.0));
        g.set_items(items(6));

        assert_eq!(g.frame(), Some(1));
        assert_eq!(g.frame(), None);
    }

    #[test]
    fn resize_across_breakpoint_recomputes_from_scratch() {
        let mut g = six_item_gallery();
        sized(&mut g, 1200.0);
        g.frame();
        assert_eq!(g.columns(), 4);

        sized(&mut g, 700.0);
        assert_eq!(g.frame(), Some(2));
        assert_eq!(g.columns(), 3);

        let cw = (700.0 - 2.0 * 20.0) / 3.0;
        for p in &g.layout().placements {
            assert!((p.width - cw).abs() < EPS);
            assert!(p.x + p.width <= 700.0 + EPS);
        }
        // Every tile was still entering, so each move cancels first.
        let anim = g.animator();
        for item in g.items() {
            let tile = anim.tile_by_id(&item.id).unwrap();
            assert_eq!(tile.generation(), 2);
            assert_eq!(tile.state(), TileState::AnimatingToNewPlacement);
        }
    }

    #[test]
    fn relayout_is_idempotent() {
        let mut g = six_item_gallery();
        sized(&mut g, 1200.0);
        g.frame();
        let first = g.layout().clone();

        g.set_items(items(6));
        g.frame();
        assert_eq!(g.layout(), &first);
    }

    #[test]
    fn degenerate_geometry_skips_animator() {
        let mut g = six_item_gallery();
        g.viewport_resized(Size::new(1200.0, 900.0));
        g.container_resized(Size::new(0.0, 0.0));

        assert_eq!(g.frame(), Some(1));
        assert!(g.layout().is_empty());
        assert!(g.driver().ops.is_empty());
        assert!(g.animator().is_empty());
    }

    #[test]
    fn narrow_container_still_drops_removed_tiles() {
        let mut g = six_item_gallery();
        sized(&mut g, 1200.0);
        g.frame();
        g.driver_mut().clear();

        g.set_items(items(4));
        g.container_resized(Size::new(0.0, 900.0));
        assert_eq!(g.frame(), Some(2));

        assert!(g.layout().is_empty());
        assert_eq!(g.animator().len(), 4);
        assert!(g.animator().tile_by_id("item-5").is_none());
        assert_eq!(g.driver().cancels().len(), 2);
        assert!(g.driver().starts().is_empty());
    }

    #[test]
    fn height_only_change_skips_pass() {
        let mut g = six_item_gallery();
        sized(&mut g, 1200.0);
        assert_eq!(g.frame(), Some(1));

        let height = g.layout().height;
        g.container_resized(Size::new(1200.0, height));
        assert_eq!(g.frame(), None);
        assert_eq!(g.generation(), 1);

        g.container_resized(Size::new(1100.0, height));
        assert_eq!(g.frame(), Some(2));
    }

    #[test]
    fn missing_viewport_uses_container_width() {
        let mut g = six_item_gallery();
        g.container_resized(Size::new(500.0, 900.0));
        g.frame();
        assert_eq!(g.columns(), 2);
    }

    // =========================================================================
    // Items and metrics
    // =========================================================================

    #[test]
    fn duplicate_ids_keep_first() {
        let mut g = gallery_with(MockSource::default());
        g.set_items(vec![
            GalleryItem::new("a", "one.jpg"),
            GalleryItem::new("a", "two.jpg"),
            GalleryItem::new("b", "three.jpg"),
        ]);
        let ids: Vec<&str> = g.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(g.items()[0].image_source, "one.jpg");
    }

    #[test]
    fn failed_metrics_fall_back() {
        let mut g = gallery_with(MockSource::with(&[("item-0.jpg", 1000, 500)]));
        g.set_items(items(2));
        g.wait_for_metrics();
        sized(&mut g, 1200.0);
        g.frame();

        assert!(g.metrics().contains_key("item-0"));
        assert!(!g.metrics().contains_key("item-1"));
        let p = g.layout().placement("item-1").unwrap();
        assert!((p.height - p.width * 5.0 / 4.0).abs() < EPS);
    }

    #[test]
    fn removed_items_drop_metrics_and_tiles() {
        let mut g = six_item_gallery();
        sized(&mut g, 1200.0);
        g.frame();
        g.driver_mut().clear();

        g.set_items(items(4));
        g.frame();
        assert_eq!(g.metrics().len(), 4);
        assert_eq!(g.animator().len(), 4);
        assert_eq!(g.driver().cancels().len(), 2);
    }

    #[test]
    fn shared_source_is_measured_once() {
        let source = Arc::new(MockSource::with(&[("same.jpg", 400, 300)]));
        let mut g = MasonryGallery::new(
            GalleryConfig::default(),
            source.clone(),
            RecordingDriver::default(),
        );
        g.set_items(vec![
            GalleryItem::new("a", "same.jpg"),
            GalleryItem::new("b", "same.jpg"),
        ]);
        g.wait_for_metrics();
        g.set_items(vec![
            GalleryItem::new("b", "same.jpg"),
            GalleryItem::new("c", "same.jpg"),
        ]);

        assert_eq!(source.calls(), vec!["same.jpg"]);
        assert!(g.metrics().contains_key("c"));
        assert!(!g.metrics().contains_key("a"));
    }

    // =========================================================================
    // Interaction and animation
    // =========================================================================

    #[test]
    fn activation_reports_index_and_count() {
        let mut g = gallery_with(MockSource::default());
        let mut list = items(3);
        list[1] = list[1].clone().with_link("https://example.com");
        g.set_items(list);

        let a = g.activate("item-1").unwrap();
        assert_eq!(a.index, 1);
        assert_eq!(a.count, 3);
        assert_eq!(
            a.outcome,
            ActivationOutcome::OpenedLink("https://example.com".into())
        );
        assert!(g.activate("nope").is_none());
    }

    #[test]
    fn stale_completion_is_ignored() {
        let mut g = six_item_gallery();
        sized(&mut g, 1200.0);
        g.frame();
        let h = g.animator().handle("item-0").unwrap();
        let entering = g.animator().tile(h).unwrap().tag();
        sized(&mut g, 700.0);
        g.frame();

        g.animation_complete(h, entering);
        assert_eq!(
            g.animator().tile(h).unwrap().state(),
            TileState::AnimatingToNewPlacement
        );
        let moving = g.animator().tile(h).unwrap().tag();
        assert_eq!(moving.generation, 2);
        g.animation_complete(h, moving);
        assert_eq!(g.animator().tile(h).unwrap().state(), TileState::Settled);
    }

    #[test]
    fn timeline_driver_settles_everything() {
        let source = MockSource::with(&[("item-0.jpg", 100, 100), ("item-1.jpg", 100, 200)]);
        let mut g = MasonryGallery::new(
            GalleryConfig::default(),
            Arc::new(source),
            TimelineDriver::new(),
        );
        g.set_items(items(2));
        g.wait_for_metrics();
        g.viewport_resized(Size::new(800.0, 600.0));
        g.container_resized(Size::new(800.0, 600.0));
        g.frame();

        let finished = g.advance(10.0);
        assert_eq!(finished, 2);
        for item in ["item-0", "item-1"] {
            let tile = g.animator().tile_by_id(item).unwrap();
            assert_eq!(tile.state(), TileState::Settled);
            let frame = g.tile_frame(item).unwrap();
            assert_eq!(frame.rect, g.layout().placement(item).unwrap().rect());
        }
        assert!(g.driver().is_idle());
    }

    #[test]
    fn hover_keeps_placement() {
        let mut g = six_item_gallery();
        sized(&mut g, 1200.0);
        g.frame();
        let h = g.animator().handle("item-0").unwrap();
        let tag = g.animator().tile(h).unwrap().tag();
        g.animation_complete(h, tag);
        let before = g.animator().tile(h).unwrap().committed();

        g.pointer_enter("item-0");
        assert_eq!(g.animator().tile(h).unwrap().state(), TileState::Hovered);
        assert_eq!(g.animator().tile(h).unwrap().committed(), before);
        g.pointer_leave("item-0");
        assert_eq!(g.animator().tile(h).unwrap().state(), TileState::Settled);
    }
}
