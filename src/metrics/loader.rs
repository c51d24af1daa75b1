//! Concurrent, cached metric resolution.
//!
//! Every source not yet known to the cache gets one task on the rayon pool.
//! Tasks report back over an mpsc channel, so results arrive in whatever order
//! the images finish. The owner of the loader applies them on its own thread
//! by calling [`MetricLoader::drain`]; nothing outside the loader ever touches
//! the cache concurrently.
//!
//! A source is measured at most once. Failures are logged and remembered so a
//! broken image is not retried on every request, and never block the others.

use super::source::{Dimensions, MetricError, MetricSource};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

/// Cache state for one source URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricState {
    Pending,
    Resolved(Dimensions),
    Failed(String),
}

/// One completed load, as delivered by [`MetricLoader::drain`].
#[derive(Debug)]
pub struct MetricEvent {
    pub uri: String,
    pub outcome: Result<Dimensions, MetricError>,
}

pub struct MetricLoader {
    source: Arc<dyn MetricSource>,
    pool: Option<Arc<rayon::ThreadPool>>,
    cache: HashMap<String, MetricState>,
    tx: Sender<MetricEvent>,
    rx: Receiver<MetricEvent>,
}

impl MetricLoader {
    /// Loader running on the global rayon pool.
    pub fn new(source: Arc<dyn MetricSource>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            pool: None,
            cache: HashMap::new(),
            tx,
            rx,
        }
    }

    /// Loader with a dedicated pool of `threads` workers.
    ///
    /// Falls back to the global pool if the dedicated one cannot be built.
    pub fn with_threads(source: Arc<dyn MetricSource>, threads: usize) -> Self {
        let mut loader = Self::new(source);
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => loader.pool = Some(Arc::new(pool)),
            Err(e) => tracing::warn!("metric pool unavailable, using global pool: {e}"),
        }
        loader
    }

    /// Start loading every source not already cached. Returns how many loads were issued.
    pub fn request<'a, I>(&mut self, uris: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut issued = 0;
        for uri in uris {
            if self.cache.contains_key(uri) {
                continue;
            }
            self.cache.insert(uri.to_string(), MetricState::Pending);
            self.spawn(uri.to_string());
            issued += 1;
        }
        if issued > 0 {
            tracing::debug!(issued, "metric loads issued");
        }
        issued
    }

    fn spawn(&self, uri: String) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let task = move || {
            let outcome = source.measure(&uri);
            // Receiver gone means the loader was dropped; nobody wants the result.
            let _ = tx.send(MetricEvent { uri, outcome });
        };
        match &self.pool {
            Some(pool) => pool.spawn(task),
            None => rayon::spawn(task),
        }
    }

    /// Apply every completed load without blocking.
    pub fn drain(&mut self) -> Vec<MetricEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            if self.apply(&event) {
                events.push(event);
            }
        }
        events
    }

    /// Block until nothing is pending. Returns the events applied while waiting.
    pub fn wait_all(&mut self) -> Vec<MetricEvent> {
        let mut events = self.drain();
        while self.pending_count() > 0 {
            match self.rx.recv() {
                Ok(event) => {
                    if self.apply(&event) {
                        events.push(event);
                    }
                }
                Err(_) => break,
            }
        }
        events
    }

    /// Record an event in the cache. Returns false for sources discarded
    /// by [`retain`](Self::retain) while their load was in flight.
    fn apply(&mut self, event: &MetricEvent) -> bool {
        let Some(state) = self.cache.get_mut(&event.uri) else {
            return false;
        };
        *state = match &event.outcome {
            Ok(dims) => MetricState::Resolved(*dims),
            Err(e) => {
                tracing::warn!(uri = %event.uri, "metric resolution failed: {e}");
                MetricState::Failed(e.to_string())
            }
        };
        true
    }

    /// Drop cache entries for sources not in `keep`.
    pub fn retain<'a, I>(&mut self, keep: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let keep: HashSet<&str> = keep.into_iter().collect();
        self.cache.retain(|uri, _| keep.contains(uri.as_str()));
    }

    pub fn state(&self, uri: &str) -> Option<&MetricState> {
        self.cache.get(uri)
    }

    /// Resolved dimensions, if any.
    pub fn dimensions(&self, uri: &str) -> Option<Dimensions> {
        match self.cache.get(uri) {
            Some(MetricState::Resolved(dims)) => Some(*dims),
            _ => None,
        }
    }

    pub fn pending_count(&self) -> usize {
        self.cache
            .values()
            .filter(|s| matches!(s, MetricState::Pending))
            .count()
    }
}

/// Measure every source in parallel and return results in input order.
pub fn load_all(
    source: &dyn MetricSource,
    uris: &[String],
) -> Vec<(String, Result<Dimensions, MetricError>)> {
    uris.par_iter()
        .map(|uri| (uri.clone(), source.measure(uri)))
        .collect()
}
