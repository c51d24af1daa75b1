//! Image metric resolution.
//!
//! - **Source**: [`MetricSource`] trait + [`ImageFileSource`] (header reads)
//! - **Loader**: [`MetricLoader`], the concurrent cache the engine polls

pub mod loader;
pub mod source;

pub use loader::{MetricEvent, MetricLoader, MetricState, load_all};
pub use source::{Dimensions, ImageFileSource, MetricError, MetricSource, uri_to_path};
