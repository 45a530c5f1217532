//! Shared records passed between pipeline steps.
//!
//! [`AssetRef`] replaces managed image strings in the content tree; [`Photo`]
//! is one gallery entry, enriched step by step (paths, timestamp,
//! dimensions, then per-breakpoint layout) before it is handed to the
//! renderer.

use crate::content::ContentNode;
use crate::imaging::Dimensions;
use chrono::NaiveDateTime;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Format used for timestamps handed to the renderer.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A managed image reference: the original and its low-res variant.
///
/// `low_res_src` is always usable; when no variant could be produced it
/// repeats `original_src`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub original_src: String,
    pub low_res_src: String,
}

/// Absolute placement of a photo, in viewport units.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Placement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// What the masonry engine assigned to one photo at one breakpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutSlot {
    Order(usize),
    Geometry(Placement),
}

/// One gallery photo.
///
/// Handed to the renderer through `ContentNode::from(&Photo)`, which
/// flattens dimensions and extra keys into the photo's mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub original_src: String,
    pub low_res_src: String,
    pub timestamp: NaiveDateTime,
    /// Display dimensions; `None` when the file could not be read.
    pub dimensions: Option<Dimensions>,
    /// Breakpoint name → slot, in breakpoint order.
    pub layout: IndexMap<String, LayoutSlot>,
    /// Other keys of a declared photo entry (caption, alt text, ...).
    pub extra: IndexMap<String, ContentNode>,
}

impl Photo {
    pub fn from_asset(asset: AssetRef, timestamp: NaiveDateTime) -> Self {
        Self {
            original_src: asset.original_src,
            low_res_src: asset.low_res_src,
            timestamp,
            dimensions: None,
            layout: IndexMap::new(),
            extra: IndexMap::new(),
        }
    }

    /// `height / width`, or `None` when unknown or degenerate.
    pub fn aspect_ratio(&self) -> Option<f64> {
        let dims = self.dimensions?;
        if dims.width == 0 || dims.height == 0 {
            return None;
        }
        Some(dims.height as f64 / dims.width as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{dt, photo, undecodable_photo};

    #[test]
    fn aspect_ratio_is_height_over_width() {
        assert_eq!(photo("a.jpg", 400, 600).aspect_ratio(), Some(1.5));
    }

    #[test]
    fn aspect_ratio_unknown_without_dimensions() {
        assert_eq!(undecodable_photo("a.jpg").aspect_ratio(), None);
    }

    #[test]
    fn aspect_ratio_unknown_for_zero_width() {
        assert_eq!(photo("a.jpg", 0, 600).aspect_ratio(), None);
    }

    #[test]
    fn from_asset_keeps_both_paths() {
        let p = Photo::from_asset(
            AssetRef {
                original_src: "assets/photo/a.jpg".into(),
                low_res_src: "low_res/photo/a.jpg".into(),
            },
            dt("2024-01-05 12:00:00"),
        );
        assert_eq!(p.original_src, "assets/photo/a.jpg");
        assert_eq!(p.low_res_src, "low_res/photo/a.jpg");
        assert!(p.layout.is_empty());
    }
}
