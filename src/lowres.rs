//! Low-res variant derivation.
//!
//! [`LowResDeriver::derive`] turns an original's content path into the path
//! the page should use for its low-res variant, producing the variant on
//! first use:
//!
//! 1. Not under the asset root, or not a raster image → the original path
//!    is returned untouched.
//! 2. The mirrored target already exists → cache hit, nothing is decoded.
//! 3. Otherwise the original is decoded, orientation-normalized, resized to
//!    the configured width and encoded to the target.
//!
//! A decode or encode failure is logged and degrades to the original path:
//! one bad image never stops a build. Anything the failed attempt wrote to
//! the target is removed so it cannot be mistaken for a cached variant. Failing to create the target's
//! directory is the exception and propagates as an `io::Error`.

use crate::cache::{CacheStats, LowResCache};
use crate::imaging::{ImageBackend, LowResConfig, create_low_res};
use crate::scan::{RASTER_EXTENSIONS, extension_of};
use std::io;
use std::path::Path;

/// What [`LowResDeriver::derive`] did for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeriveOutcome {
    /// Not a managed raster image; the original is used as-is.
    PassThrough,
    /// The variant already existed.
    Cached,
    /// The variant was produced by this call.
    Encoded,
    /// Producing the variant failed; the original is used instead.
    Failed,
}

impl DeriveOutcome {
    pub fn record(self, stats: &mut CacheStats) {
        match self {
            DeriveOutcome::PassThrough => {}
            DeriveOutcome::Cached => stats.hit(),
            DeriveOutcome::Encoded => stats.encode(),
            DeriveOutcome::Failed => stats.fail(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derived {
    /// Always usable: the variant, or the original on pass-through/failure.
    pub low_res_src: String,
    pub outcome: DeriveOutcome,
}

pub struct LowResDeriver<'a, B: ImageBackend> {
    backend: &'a B,
    cache: LowResCache,
    config: LowResConfig,
    use_cache: bool,
}

impl<'a, B: ImageBackend> LowResDeriver<'a, B> {
    pub fn new(backend: &'a B, cache: LowResCache, config: LowResConfig, use_cache: bool) -> Self {
        Self {
            backend,
            cache,
            config,
            use_cache,
        }
    }

    pub fn derive(&self, original: &str) -> io::Result<Derived> {
        let target = match self.cache.target_for(original) {
            Some(target) if RASTER_EXTENSIONS.contains(&extension_of(Path::new(original)).as_str()) => {
                target
            }
            _ => return Ok(pass_through(original, DeriveOutcome::PassThrough)),
        };

        let output = self.cache.prepare(&target)?;

        if self.use_cache && self.cache.is_cached(&target) {
            log::debug!("Cached: {}", target);
            return Ok(Derived {
                low_res_src: target,
                outcome: DeriveOutcome::Cached,
            });
        }

        let source = self.cache.disk_path(original);
        match create_low_res(self.backend, &source, &output, &self.config) {
            Ok((width, height)) => {
                log::debug!("Encoded: {} ({}x{})", target, width, height);
                Ok(Derived {
                    low_res_src: target,
                    outcome: DeriveOutcome::Encoded,
                })
            }
            Err(e) => {
                log::warn!("Could not create low-res variant of {}: {}", original, e);
                discard_partial(&output);
                Ok(pass_through(original, DeriveOutcome::Failed))
            }
        }
    }
}

/// Remove whatever a failed encode left at `output`; an existing file would
/// count as a cache hit on the next build.
fn discard_partial(output: &Path) {
    match std::fs::remove_file(output) {
        Ok(()) => log::debug!("Removed partial variant {}", output.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("Could not remove partial variant {}: {}", output.display(), e),
    }
}

fn pass_through(original: &str, outcome: DeriveOutcome) -> Derived {
    Derived {
        low_res_src: original.to_string(),
        outcome,
    }
}
