//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! the base layer; the optional `config.toml` in the site root is merged on
//! top of them key by key, so a user file only needs the values it changes.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [assets]
//! root = "assets"             # Managed asset root (content paths start here)
//! photo_dir = "assets/photo"  # Scanned for photos not listed in the content file
//! low_res_root = "low_res"    # Mirror of `root` holding the low-res variants
//!
//! [images]
//! low_res_width = 400         # Width of low-res variants in pixels
//! quality = 85                # JPEG quality for low-res variants (1-100)
//!
//! [gallery]
//! photos_key = "photos"       # Top-level content key holding the photo list
//!
//! [layout]
//! mode = "order"              # "order" or "geometry"
//!
//! [[layout.breakpoints]]
//! name = "large"
//! columns = 3
//! total_width = 100.0         # Viewport units (geometry mode)
//! gap = 1.0                   # Viewport units (geometry mode)
//!
//! [processing]
//! max_processes = 4           # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Where managed assets, discoverable photos and low-res variants live.
    pub assets: AssetsConfig,
    /// Low-res variant encoding.
    pub images: ImagesConfig,
    /// Where the photo list sits in the content tree.
    pub gallery: GalleryConfig,
    /// Masonry mode and breakpoints.
    pub layout: LayoutConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let assets = &self.assets;
        if assets.root.as_os_str().is_empty()
            || assets.photo_dir.as_os_str().is_empty()
            || assets.low_res_root.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "assets.root, assets.photo_dir and assets.low_res_root must not be empty".into(),
            ));
        }
        if !assets.photo_dir.starts_with(&assets.root) {
            return Err(ConfigError::Validation(
                "assets.photo_dir must be inside assets.root".into(),
            ));
        }
        if assets.low_res_root.starts_with(&assets.root) {
            return Err(ConfigError::Validation(
                "assets.low_res_root must not be inside assets.root".into(),
            ));
        }
        if self.images.low_res_width == 0 {
            return Err(ConfigError::Validation(
                "images.low_res_width must be non-zero".into(),
            ));
        }
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.gallery.photos_key.is_empty() {
            return Err(ConfigError::Validation(
                "gallery.photos_key must not be empty".into(),
            ));
        }
        self.layout.validate()
    }
}

/// Asset locations, all relative to the site root.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Content strings under this root with an image extension are managed.
    pub root: PathBuf,
    /// Directory scanned for photos that the content file does not list.
    pub photo_dir: PathBuf,
    /// Low-res variants mirror `root`'s layout under this directory.
    pub low_res_root: PathBuf,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            photo_dir: PathBuf::from("assets/photo"),
            low_res_root: PathBuf::from("low_res"),
        }
    }
}

/// Low-res variant encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Target width in pixels; height follows the source aspect ratio.
    pub low_res_width: u32,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            low_res_width: 400,
            quality: 85,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Top-level key of the content tree holding the declared photo list.
    pub photos_key: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            photos_key: "photos".to_string(),
        }
    }
}

/// What the masonry engine emits per photo and breakpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Sequential order index; the page reflows columns itself.
    #[default]
    Order,
    /// Absolute position and size in viewport units.
    Geometry,
}

/// A named column configuration, e.g. `large` = 3 columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Breakpoint {
    pub name: String,
    pub columns: usize,
    /// Width available to the gallery, in viewport units.
    #[serde(default = "default_total_width")]
    pub total_width: f64,
    /// Gap between columns and between stacked photos, in viewport units.
    #[serde(default = "default_gap")]
    pub gap: f64,
}

fn default_total_width() -> f64 {
    100.0
}

fn default_gap() -> f64 {
    1.0
}

impl Breakpoint {
    pub fn new(name: &str, columns: usize) -> Self {
        Self {
            name: name.to_string(),
            columns,
            total_width: default_total_width(),
            gap: default_gap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub mode: LayoutMode,
    pub breakpoints: Vec<Breakpoint>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            mode: LayoutMode::Order,
            breakpoints: vec![
                Breakpoint::new("large", 3),
                Breakpoint::new("medium", 2),
                Breakpoint::new("small", 1),
            ],
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.breakpoints.is_empty() {
            return Err(ConfigError::Validation(
                "layout.breakpoints must not be empty".into(),
            ));
        }
        let mut seen = HashSet::new();
        for bp in &self.breakpoints {
            if bp.columns == 0 {
                return Err(ConfigError::Validation(format!(
                    "layout.breakpoints '{}': columns must be at least 1",
                    bp.name
                )));
            }
            if !(bp.total_width > 0.0) || !(bp.gap >= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "layout.breakpoints '{}': total_width must be positive and gap non-negative",
                    bp.name
                )));
            }
            if bp.total_width - (bp.columns - 1) as f64 * bp.gap <= 0.0 {
                return Err(ConfigError::Validation(format!(
                    "layout.breakpoints '{}': gaps leave no room for columns",
                    bp.name
                )));
            }
            if !seen.insert(bp.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "layout.breakpoints: duplicate name '{}'",
                    bp.name
                )));
            }
        }
        Ok(())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, never less than one
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// Tables merge key by key; any other overlay value replaces the base value
/// outright (arrays included, so a user `[[layout.breakpoints]]` list
/// replaces the stock list rather than extending it).
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

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file doesn't exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the site root, on top of stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(root)?)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys cause an error.

# ---------------------------------------------------------------------------
# Asset locations (relative to the site root)
# ---------------------------------------------------------------------------
[assets]
# Content strings under this directory with an image extension
# (jpg, jpeg, png, gif, svg) are replaced by {original_src, low_res_src}.
root = "assets"

# Photos in this directory join the gallery even when the content file
# does not list them.
photo_dir = "assets/photo"

# Low-res variants mirror the asset tree here. Must be outside `root`.
low_res_root = "low_res"

# ---------------------------------------------------------------------------
# Low-res variants
# ---------------------------------------------------------------------------
[images]
# Width in pixels; height keeps the source aspect ratio.
low_res_width = 400

# JPEG quality (1 = worst, 100 = best).
quality = 85

# ---------------------------------------------------------------------------
# Gallery
# ---------------------------------------------------------------------------
[gallery]
# Top-level content key holding the photo list.
photos_key = "photos"

# ---------------------------------------------------------------------------
# Masonry layout
# ---------------------------------------------------------------------------
[layout]
# "order": each photo gets its sequential position per breakpoint.
# "geometry": each photo gets left/top/width/height in viewport units.
mode = "order"

[[layout.breakpoints]]
name = "large"
columns = 3
total_width = 100.0
gap = 1.0

[[layout.breakpoints]]
name = "medium"
columns = 2
total_width = 100.0
gap = 1.0

[[layout.breakpoints]]
name = "small"
columns = 1
total_width = 100.0
gap = 1.0

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
