//! Gallery configuration.
//!
//! Handles loading, validating, and merging `masonry.toml`. Stock defaults are
//! the base layer; a user file overrides only the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! gap = 16.0                  # Pixel spacing between tiles
//!
//! [sizing]
//! min_height = 100.0          # Tile height clamp
//! max_height = 800.0
//! fallback_aspect = [4, 5]    # width:height until metrics resolve
//!
//! [jitter]
//! enabled = false             # Random height variation
//! amount = 0.05               # ±5%
//! seed = 0
//!
//! [animation]
//! easing = "power3.out"
//! duration = 0.6              # Seconds
//! stagger = 0.05              # Extra delay per entering tile
//! max_stagger_delay = 1.0
//! animate_from = "bottom"     # top | bottom | left | right | center | random
//! blur_to_focus = true
//! blur_px = 10.0
//! scale_on_hover = true
//! hover_scale = 0.95
//! hover_duration = 0.3
//! color_shift_on_hover = false
//! overlay_opacity = 0.3
//! seed = 0                    # For animate_from = "random"
//!
//! [breakpoints]
//! default_columns = 1
//! columns = [
//!     { min_width = 1500, columns = 5 },
//!     { min_width = 1000, columns = 4 },
//!     { min_width = 600, columns = 3 },
//!     { min_width = 400, columns = 2 },
//! ]
//!
//! [loading]
//! max_threads = 4             # Metric loader workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::animation::{AnimateFrom, Easing};
use crate::breakpoints::{Breakpoint, Breakpoints, stock_thresholds};
use crate::layout::{
    DEFAULT_GAP, DEFAULT_MAX_HEIGHT, DEFAULT_MIN_HEIGHT, Jitter, LayoutOptions,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up by [`load_config`].
pub const CONFIG_FILENAME: &str = "masonry.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Engine configuration loaded from `masonry.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Pixel spacing between tiles, both axes.
    pub gap: f64,
    pub sizing: SizingConfig,
    pub jitter: JitterConfig,
    pub animation: AnimationConfig,
    pub breakpoints: BreakpointsConfig,
    pub loading: LoadingConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            gap: DEFAULT_GAP,
            sizing: SizingConfig::default(),
            jitter: JitterConfig::default(),
            animation: AnimationConfig::default(),
            breakpoints: BreakpointsConfig::default(),
            loading: LoadingConfig::default(),
        }
    }
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Validation(msg.into()));

        if !(self.gap >= 0.0) {
            return invalid("gap must be >= 0");
        }
        let s = &self.sizing;
        if !(s.min_height > 0.0 && s.min_height <= s.max_height) {
            return invalid("sizing requires 0 < min_height <= max_height");
        }
        if s.fallback_aspect[0] == 0 || s.fallback_aspect[1] == 0 {
            return invalid("sizing.fallback_aspect values must be non-zero");
        }
        if !(0.0..1.0).contains(&self.jitter.amount) {
            return invalid("jitter.amount must be in [0, 1)");
        }
        let a = &self.animation;
        if !(a.duration > 0.0) {
            return invalid("animation.duration must be > 0");
        }
        if !(a.stagger >= 0.0) || !(a.max_stagger_delay >= 0.0) {
            return invalid("animation.stagger and max_stagger_delay must be >= 0");
        }
        if !(a.hover_scale > 0.0) {
            return invalid("animation.hover_scale must be > 0");
        }
        if !(a.hover_duration >= 0.0) || !(a.blur_px >= 0.0) {
            return invalid("animation.hover_duration and blur_px must be >= 0");
        }
        if !(0.0..=1.0).contains(&a.overlay_opacity) {
            return invalid("animation.overlay_opacity must be in [0, 1]");
        }
        self.breakpoints.validate()?;
        if self.loading.max_threads == Some(0) {
            return invalid("loading.max_threads must be >= 1");
        }
        Ok(())
    }

    /// Sizing and jitter rules for the layout computer.
    pub fn layout_options(&self) -> LayoutOptions {
        let [w, h] = self.sizing.fallback_aspect;
        LayoutOptions {
            min_height: self.sizing.min_height,
            max_height: self.sizing.max_height,
            fallback_aspect: w as f64 / h as f64,
            jitter: self.jitter.enabled.then_some(Jitter {
                amount: self.jitter.amount,
                seed: self.jitter.seed,
            }),
        }
    }

    pub fn breakpoints(&self) -> Breakpoints {
        Breakpoints::new(
            self.breakpoints.columns.clone(),
            self.breakpoints.default_columns,
        )
    }
}

/// Tile height rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SizingConfig {
    pub min_height: f64,
    pub max_height: f64,
    /// `[width, height]` used while an item has no metrics.
    pub fallback_aspect: [u32; 2],
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            min_height: DEFAULT_MIN_HEIGHT,
            max_height: DEFAULT_MAX_HEIGHT,
            fallback_aspect: [4, 5],
        }
    }
}

/// Random height variation. Off by default so layout is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JitterConfig {
    pub enabled: bool,
    pub amount: f64,
    pub seed: u64,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            amount: 0.05,
            seed: 0,
        }
    }
}

/// Tween timing and first-appearance / hover effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    pub easing: Easing,
    /// Seconds.
    pub duration: f64,
    /// Delay added per entering tile, seconds.
    pub stagger: f64,
    /// Upper bound for any single tile's stagger delay.
    pub max_stagger_delay: f64,
    pub animate_from: AnimateFrom,
    pub blur_to_focus: bool,
    pub blur_px: f64,
    pub scale_on_hover: bool,
    pub hover_scale: f64,
    pub hover_duration: f64,
    pub color_shift_on_hover: bool,
    pub overlay_opacity: f64,
    /// Seeds the per-item direction choice for `animate_from = "random"`.
    pub seed: u64,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            easing: Easing::Out(3),
            duration: 0.6,
            stagger: 0.05,
            max_stagger_delay: 1.0,
            animate_from: AnimateFrom::Bottom,
            blur_to_focus: true,
            blur_px: 10.0,
            scale_on_hover: true,
            hover_scale: 0.95,
            hover_duration: 0.3,
            color_shift_on_hover: false,
            overlay_opacity: 0.3,
            seed: 0,
        }
    }
}

/// Viewport thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreakpointsConfig {
    pub default_columns: usize,
    pub columns: Vec<Breakpoint>,
}

impl Default for BreakpointsConfig {
    fn default() -> Self {
        Self {
            default_columns: 1,
            columns: stock_thresholds(),
        }
    }
}

impl BreakpointsConfig {
    /// Column counts must be positive and never shrink as width grows.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_columns == 0 {
            return Err(ConfigError::Validation(
                "breakpoints.default_columns must be >= 1".into(),
            ));
        }
        if self.columns.iter().any(|bp| bp.columns == 0) {
            return Err(ConfigError::Validation(
                "breakpoints.columns entries must have columns >= 1".into(),
            ));
        }
        let mut sorted = self.columns.clone();
        sorted.sort_by_key(|bp| bp.min_width);
        let mut last = self.default_columns;
        for bp in &sorted {
            if bp.columns < last {
                return Err(ConfigError::Validation(format!(
                    "breakpoints must not decrease columns as width grows (min_width {} → {} columns)",
                    bp.min_width, bp.columns
                )));
            }
            last = bp.columns;
        }
        Ok(())
    }
}

/// Metric loader settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoadingConfig {
    /// Maximum concurrent metric loads. `None` = number of CPU cores.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &LoadingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_threads.map(|n| n.min(cores)).unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, arrays included.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file as a raw TOML value. `Ok(None)` if it does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load a specific config file over the stock defaults.
pub fn load_config_file(path: &Path) -> Result<GalleryConfig, ConfigError> {
    resolve_config(stock_defaults_value()?, load_raw_config(path)?)
}

/// Load `masonry.toml` from a directory over the stock defaults.
pub fn load_config(dir: &Path) -> Result<GalleryConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILENAME))
}

/// Returns a fully-commented stock `masonry.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Masonry Gallery Configuration
# =============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# Pixel spacing between tiles, horizontally and vertically.
gap = 16.0

# ---------------------------------------------------------------------------
# Tile sizing
# ---------------------------------------------------------------------------
[sizing]
# Every tile height is clamped to [min_height, max_height].
min_height = 100.0
max_height = 800.0

# Aspect ratio [width, height] used for images whose size is not known yet
# (still loading, or failed to load).
fallback_aspect = [4, 5]

# ---------------------------------------------------------------------------
# Height jitter
# ---------------------------------------------------------------------------
[jitter]
# Random height variation for a more organic look. Seeded, so a given seed
# always produces the same layout.
enabled = false
amount = 0.05
seed = 0

# ---------------------------------------------------------------------------
# Animation
# ---------------------------------------------------------------------------
[animation]
# linear, or powerN.in / powerN.out / powerN.inOut for N in 1..4
easing = "power3.out"
duration = 0.6

# Entering tiles start one after another, `stagger` seconds apart,
# never later than max_stagger_delay.
stagger = 0.05
max_stagger_delay = 1.0

# Where tiles come from on first appearance:
# top, bottom, left, right, center, random
animate_from = "bottom"

# Fade in from a blur on first appearance.
blur_to_focus = true
blur_px = 10.0

# Hover feedback.
scale_on_hover = true
hover_scale = 0.95
hover_duration = 0.3
color_shift_on_hover = false
overlay_opacity = 0.3

# Seed for animate_from = "random".
seed = 0

# ---------------------------------------------------------------------------
# Breakpoints
# ---------------------------------------------------------------------------
[breakpoints]
# Columns when the viewport is narrower than every threshold.
default_columns = 1

# Viewport min-width → column count. The widest matching threshold wins.
columns = [
    { min_width = 1500, columns = 5 },
    { min_width = 1000, columns = 4 },
    { min_width = 600, columns = 3 },
    { min_width = 400, columns = 2 },
]

# ---------------------------------------------------------------------------
# Metric loading
# ---------------------------------------------------------------------------
[loading]
# Maximum parallel image-measuring workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4
"##
}
