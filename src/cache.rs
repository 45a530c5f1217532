//! On-disk cache of low-res variants.
//!
//! Encoding is the slow part of a build, and a site rarely changes more than
//! a handful of photos between runs. Each low-res variant is therefore kept
//! on disk and reused as long as it exists.
//!
//! # Design
//!
//! The cache is **path-mirrored**: the variant of `<asset root>/rel/path.jpg`
//! lives at `<low-res root>/rel/path.jpg`. There is no manifest and no
//! content hash; a hit is simply "the target file exists". Replacing an
//! original under the same name therefore needs either deleting the variant
//! or `--no-cache`.
//!
//! ```text
//! assets/                     low_res/
//! ├── logo.png          →     ├── logo.png
//! └── photo/                  └── photo/
//!     ├── a.jpg         →         ├── a.jpg
//!     └── b.jpg         →         └── b.jpg
//! ```
//!
//! Creating the target's directory is the one filesystem step whose failure
//! is not recoverable: without a writable cache location no variant can be
//! produced.

use crate::config::AssetsConfig;
use crate::scan::{content_path, is_plain_relative};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Maps originals to their cached variants.
#[derive(Debug, Clone)]
pub struct LowResCache {
    site_root: PathBuf,
    asset_root: PathBuf,
    low_res_root: PathBuf,
}

impl LowResCache {
    pub fn new(site_root: &Path, assets: &AssetsConfig) -> Self {
        Self {
            site_root: site_root.to_path_buf(),
            asset_root: assets.root.clone(),
            low_res_root: assets.low_res_root.clone(),
        }
    }

    /// Content path of the variant for `original`, or `None` when
    /// `original` is not under the asset root.
    ///
    /// The target is always below the low-res root: paths that could climb
    /// out of it (`..`, absolute, leading `.`) get no target.
    pub fn target_for(&self, original: &str) -> Option<String> {
        let original = Path::new(original);
        if !is_plain_relative(original) {
            return None;
        }
        let rel = original.strip_prefix(&self.asset_root).ok()?;
        if rel.as_os_str().is_empty() {
            return None;
        }
        Some(content_path(&self.low_res_root.join(rel)))
    }

    /// Resolve a content path against the site root.
    pub fn disk_path(&self, rel: &str) -> PathBuf {
        self.site_root.join(rel)
    }

    pub fn is_cached(&self, target: &str) -> bool {
        self.disk_path(target).is_file()
    }

    /// Ensure the target's directory exists and return its disk path.
    ///
    /// Safe to call repeatedly.
    pub fn prepare(&self, target: &str) -> io::Result<PathBuf> {
        let path = self.disk_path(target);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }
}

/// Summary of cache performance for a build run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub encoded: u32,
    pub failed: u32,
}

impl CacheStats {
    pub fn hit(&mut self) {
        self.hits += 1;
    }

    pub fn encode(&mut self) {
        self.encoded += 1;
    }

    pub fn fail(&mut self) {
        self.failed += 1;
    }

    pub fn total(&self) -> u32 {
        self.hits + self.encoded + self.failed
    }

    /// Fold in stats gathered elsewhere (e.g. by a parallel pass).
    pub fn merge(&mut self, other: CacheStats) {
        self.hits += other.hits;
        self.encoded += other.encoded;
        self.failed += other.failed;
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} encoded ({} total)",
                self.hits,
                self.encoded,
                self.total()
            )?;
        } else {
            write!(f, "{} encoded", self.encoded)?;
        }
        if self.failed > 0 {
            write!(f, ", {} failed", self.failed)?;
        }
        Ok(())
    }
}
