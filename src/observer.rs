//! Frame-coalesced container size tracking.
//!
//! Hosts report every measurement they get (resize, scrollbar insertion, font
//! load) through [`SizeObserver::observe`]. Nothing is emitted until the next
//! [`SizeObserver::on_frame`], which yields at most one size per frame and only
//! when it differs from the last one emitted.

use crate::types::Size;

#[derive(Debug, Clone, Default)]
pub struct SizeObserver {
    pending: Option<Size>,
    emitted: Option<Size>,
}

impl SizeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a measurement. Later calls in the same frame replace earlier ones.
    pub fn observe(&mut self, size: Size) {
        self.pending = Some(size);
    }

    /// Flush the pending measurement, if it changed anything.
    pub fn on_frame(&mut self) -> Option<Size> {
        let size = self.pending.take()?;
        if self.emitted == Some(size) {
            return None;
        }
        self.emitted = Some(size);
        Some(size)
    }

    /// Last emitted size.
    pub fn current(&self) -> Option<Size> {
        self.emitted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_emitted_before_frame() {
        let mut obs = SizeObserver::new();
        obs.observe(Size::new(800.0, 600.0));
        assert_eq!(obs.current(), None);
    }

    #[test]
    fn burst_coalesces_to_latest() {
        let mut obs = SizeObserver::new();
        obs.observe(Size::new(800.0, 600.0));
        obs.observe(Size::new(790.0, 600.0));
        obs.observe(Size::new(780.0, 610.0));
        assert_eq!(obs.on_frame(), Some(Size::new(780.0, 610.0)));
        assert_eq!(obs.on_frame(), None);
    }

    #[test]
    fn unchanged_size_is_not_reemitted() {
        let mut obs = SizeObserver::new();
        obs.observe(Size::new(800.0, 600.0));
        obs.on_frame();
        obs.observe(Size::new(800.0, 600.0));
        assert_eq!(obs.on_frame(), None);
        assert_eq!(obs.current(), Some(Size::new(800.0, 600.0)));
    }
}
