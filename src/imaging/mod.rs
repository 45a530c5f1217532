//! Image processing — pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` + EXIF orientation |
//! | **EXIF tags** | `kamadak-exif` (orientation, capture dates) |
//! | **Low-res variant** | orientation fix + Lanczos3 resize + re-encode |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, CaptureTags, Dimensions, ExifTags, ImageBackend};
pub use calculations::{low_res_dimensions, oriented_dimensions};
pub use operations::{LowResConfig, create_low_res, get_dimensions};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
