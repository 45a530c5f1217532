//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::low_res_dimensions;
use super::params::{Quality, ResizeParams};
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get display dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Configuration for low-res variant generation.
#[derive(Debug, Clone, Copy)]
pub struct LowResConfig {
    pub width: u32,
    pub quality: Quality,
}

impl Default for LowResConfig {
    fn default() -> Self {
        Self {
            width: 400,
            quality: Quality::default(),
        }
    }
}

/// Plan a low-res resize without executing it.
pub fn plan_low_res(
    source: &Path,
    output: &Path,
    original_dims: (u32, u32),
    config: &LowResConfig,
) -> ResizeParams {
    let (width, height) = low_res_dimensions(original_dims, config.width);
    ResizeParams {
        source: source.to_path_buf(),
        output: output.to_path_buf(),
        width,
        height,
        quality: config.quality,
    }
}

/// Create a low-res variant of `source` at `output`.
///
/// Returns the output dimensions.
pub fn create_low_res(
    backend: &impl ImageBackend,
    source: &Path,
    output: &Path,
    config: &LowResConfig,
) -> Result<(u32, u32)> {
    let dims = get_dimensions(backend, source)?;
    let params = plan_low_res(source, output, dims, config);
    backend.resize(&params)?;
    Ok((params.width, params.height))
}
