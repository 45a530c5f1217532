//! Pipeline orchestration.
//!
//! Runs the stages in order over one loaded content tree:
//!
//! 1. **Rewrite**: every managed image string in the tree becomes
//!    `{original_src, low_res_src}`, deriving low-res variants on the way.
//! 2. **Assemble**: declared photos (the list under `gallery.photos_key`)
//!    are merged with photos found in the photo directory, timestamped,
//!    measured, and sorted newest first.
//! 3. **Layout**: the masonry engine fills each photo's per-breakpoint slot.
//! 4. **Merge back**: the photo list replaces the declared list in the tree
//!    (or is added when the content had none). Geometry mode also adds a
//!    `gallery_layout` entry with each breakpoint's total height.
//!
//! The resulting tree is written as `site.json` for the template renderer.
//!
//! ## Output Structure
//!
//! ```text
//! <site root>/
//! ├── data.json                  # Content description (input)
//! ├── assets/photo/a.jpg         # Originals
//! ├── low_res/photo/a.jpg        # Derived variants (cache)
//! └── build/
//!     └── site.json              # Augmented tree for the renderer
//! ```

use crate::cache::{CacheStats, LowResCache};
use crate::config::{ConfigError, SiteConfig};
use crate::content::{ContentError, ContentNode, Scalar};
use crate::gallery::{GalleryAssembler, declared_photos};
use crate::imaging::{ImageBackend, LowResConfig, Quality, RustBackend};
use crate::layout::{BreakpointSummary, apply_layout};
use crate::lowres::LowResDeriver;
use crate::rewrite::Rewriter;
use crate::scan::AssetLocator;
use crate::types::Photo;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the augmented tree inside the output directory.
pub const SITE_FILENAME: &str = "site.json";

/// Key added next to the photo list in geometry mode.
pub const GALLERY_LAYOUT_KEY: &str = "gallery_layout";

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Content error: {0}")]
    Content(#[from] ContentError),
    #[error("Content root must be a mapping")]
    RootNotMapping,
}

/// Low-res settings from the site config.
pub fn low_res_config(config: &SiteConfig) -> LowResConfig {
    LowResConfig {
        width: config.images.low_res_width,
        quality: Quality::new(config.images.quality),
    }
}

/// Everything a build produced.
#[derive(Debug)]
pub struct ProcessResult {
    /// The augmented tree handed to the renderer.
    pub site: ContentNode,
    /// Gallery photos, newest first, with layout filled in.
    pub photos: Vec<Photo>,
    /// Per-breakpoint totals (geometry mode only).
    pub layout: Vec<BreakpointSummary>,
    pub declared: usize,
    pub discovered: usize,
    pub stats: CacheStats,
}

pub fn process(
    content: &ContentNode,
    config: &SiteConfig,
    site_root: &Path,
    use_cache: bool,
) -> Result<ProcessResult, ProcessError> {
    let backend = RustBackend::new();
    process_with_backend(&backend, content, config, site_root, use_cache)
}

/// Run the pipeline using a specific backend (allows testing with mock).
pub fn process_with_backend(
    backend: &impl ImageBackend,
    content: &ContentNode,
    config: &SiteConfig,
    site_root: &Path,
    use_cache: bool,
) -> Result<ProcessResult, ProcessError> {
    let locator = AssetLocator::new(site_root, &config.assets);
    let deriver = LowResDeriver::new(
        backend,
        LowResCache::new(site_root, &config.assets),
        low_res_config(config),
        use_cache,
    );

    let mut rewriter = Rewriter::new(&locator, &deriver);
    let mut site = rewriter.rewrite(content)?;
    let mut stats = rewriter.stats();

    let photos_key = config.gallery.photos_key.as_str();
    let declared = declared_photos(site.get(photos_key));
    let assembled = GalleryAssembler::new(
        backend,
        &locator,
        &deriver,
        site_root,
        &config.assets.photo_dir,
    )
    .assemble(declared)?;
    stats.merge(assembled.stats);

    let mut photos = assembled.photos;
    let layout = apply_layout(&mut photos, &config.layout);

    let map = site.as_mapping_mut().ok_or(ProcessError::RootNotMapping)?;
    map.insert(
        photos_key.to_string(),
        ContentNode::Sequence(photos.iter().map(ContentNode::from).collect()),
    );
    if !layout.is_empty() {
        map.insert(GALLERY_LAYOUT_KEY.to_string(), layout_node(&layout));
    }

    Ok(ProcessResult {
        site,
        photos,
        layout,
        declared: assembled.declared,
        discovered: assembled.discovered,
        stats,
    })
}

fn layout_node(layout: &[BreakpointSummary]) -> ContentNode {
    ContentNode::Mapping(
        layout
            .iter()
            .map(|bp| {
                let mut entry = IndexMap::new();
                entry.insert(
                    "columns".to_string(),
                    ContentNode::Scalar(Scalar::Integer(bp.columns as i64)),
                );
                entry.insert(
                    "height".to_string(),
                    ContentNode::Scalar(Scalar::Float(bp.height)),
                );
                (bp.name.clone(), ContentNode::Mapping(entry))
            })
            .collect(),
    )
}

/// Resolve a CLI path against the site root unless it is absolute.
///
/// Both the content file and the output directory are given relative to the
/// site, so `--source site` writes to `site/build/` by default.
pub fn site_path(site_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        site_root.join(path)
    }
}

/// Write the augmented tree as pretty JSON. Returns the file path.
pub fn write_site(output_dir: &Path, site: &ContentNode) -> Result<PathBuf, ProcessError> {
    std::fs::create_dir_all(output_dir)?;
    let path = output_dir.join(SITE_FILENAME);
    let json = serde_json::to_string_pretty(site)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

/// What a build would touch, computed without decoding or writing anything.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    /// Managed asset paths referenced by the content, in tree order.
    pub managed: Vec<String>,
    /// Referenced managed assets that do not exist on disk.
    pub missing: Vec<String>,
    /// Photos that would join the gallery from the photo directory.
    pub discoverable: Vec<String>,
}

pub fn check(content: &ContentNode, config: &SiteConfig, site_root: &Path) -> CheckReport {
    let locator = AssetLocator::new(site_root, &config.assets);

    let mut seen = HashSet::new();
    let managed: Vec<String> = content
        .strings()
        .into_iter()
        .filter(|s| locator.is_managed_asset(s))
        .filter(|s| seen.insert(s.to_string()))
        .map(String::from)
        .collect();

    let missing = managed
        .iter()
        .filter(|path| !site_root.join(path).is_file())
        .cloned()
        .collect();

    let declared: HashSet<String> = content
        .get(&config.gallery.photos_key)
        .map(|node| node.strings())
        .unwrap_or_default()
        .into_iter()
        .map(String::from)
        .collect();
    let discoverable = locator.discover(&config.assets.photo_dir, &declared);

    CheckReport {
        managed,
        missing,
        discoverable,
    }
}
