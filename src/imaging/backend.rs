//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations the pipeline
//! needs: identify, read_exif, and resize.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use a mock that
//! records calls, which is how the cache tests prove that a hit never
//! reaches the codec.

use super::params::ResizeParams;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation, orientation already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Raw "date taken" strings found in one EXIF directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureTags {
    pub date_time_original: Option<String>,
    pub date_time_digitized: Option<String>,
}

/// The EXIF fields the pipeline cares about.
///
/// Capture dates can sit in two places: directly in the top-level
/// directory (IFD0, written by some older tools) or in the nested EXIF
/// sub-directory where the standard puts them. Both are kept so the
/// resolver can apply its priority order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExifTags {
    /// EXIF orientation (1 = upright). `None` when absent.
    pub orientation: Option<u32>,
    /// Tags found in the top-level directory.
    pub primary: CaptureTags,
    /// Tags found in the EXIF sub-directory.
    pub exif_ifd: CaptureTags,
}

/// Trait for image processing backends.
pub trait ImageBackend: Sync {
    /// Get display dimensions (EXIF orientation applied).
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Read orientation and capture-date tags.
    fn read_exif(&self, path: &Path) -> Result<ExifTags, BackendError>;

    /// Decode, orientation-normalize, resize and encode to `params.output`.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;
}
