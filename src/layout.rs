//! Masonry layout.
//!
//! Photos are dealt, in gallery order, into the column that is currently
//! shortest (lowest index on ties). Column heights only ever grow. The
//! engine runs once per breakpoint and attaches one slot per photo, keyed by
//! breakpoint name; slot `i` always describes photo `i`.
//!
//! Two output modes:
//!
//! - **Order** (default): the slot is the photo's position in the list.
//!   Column assignment still runs but only feeds the accumulated heights;
//!   the page reflows columns itself from each photo's aspect ratio.
//! - **Geometry**: the slot is an absolute placement in viewport units:
//!
//! ```text
//! column_width  = (total_width - (columns - 1) * gap) / columns
//! left          = column * (column_width + gap)
//! top           = current height of that column
//! height        = column_width * h / w
//! column height += height + gap
//! total height  = tallest column
//! ```
//!
//! A photo whose dimensions are unknown never aborts the layout: it adds
//! nothing to any column and gets a zero placement (geometry) or its plain
//! position (order).

use crate::config::{LayoutConfig, LayoutMode};
use crate::types::{LayoutSlot, Photo, Placement};

/// Accumulated column heights for one breakpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnState {
    heights: Vec<f64>,
}

impl ColumnState {
    pub fn new(columns: usize) -> Self {
        Self {
            heights: vec![0.0; columns.max(1)],
        }
    }

    /// Index of the shortest column; the lowest index wins ties.
    pub fn shortest(&self) -> usize {
        let mut best = 0;
        for (i, &h) in self.heights.iter().enumerate().skip(1) {
            if h < self.heights[best] {
                best = i;
            }
        }
        best
    }

    pub fn height(&self, column: usize) -> f64 {
        self.heights[column]
    }

    pub fn grow(&mut self, column: usize, by: f64) {
        self.heights[column] += by;
    }

    pub fn tallest(&self) -> f64 {
        self.heights.iter().copied().fold(0.0, f64::max)
    }
}

/// Column each photo lands in, measured in aspect-ratio units.
/// `None` for photos with unknown dimensions.
pub fn assign_columns(photos: &[Photo], columns: usize) -> Vec<Option<usize>> {
    let mut state = ColumnState::new(columns);
    photos
        .iter()
        .map(|photo| {
            let aspect = photo.aspect_ratio()?;
            let column = state.shortest();
            state.grow(column, aspect);
            Some(column)
        })
        .collect()
}

/// Order-mode slots: each photo's position in the input.
pub fn compute_order(photos: &[Photo], columns: usize) -> Vec<usize> {
    assign_columns(photos, columns)
        .iter()
        .enumerate()
        .map(|(position, _)| position)
        .collect()
}

pub fn column_width(columns: usize, total_width: f64, gap: f64) -> f64 {
    let columns = columns.max(1) as f64;
    (total_width - (columns - 1.0) * gap) / columns
}

/// Geometry-mode placements and the resulting gallery height.
pub fn compute_geometry(
    photos: &[Photo],
    columns: usize,
    total_width: f64,
    gap: f64,
) -> (Vec<Placement>, f64) {
    let width = column_width(columns, total_width, gap);
    let mut state = ColumnState::new(columns);

    let placements = photos
        .iter()
        .map(|photo| {
            let Some(aspect) = photo.aspect_ratio() else {
                log::warn!("No dimensions for {}; placing it empty", photo.original_src);
                return Placement::default();
            };
            let column = state.shortest();
            let height = width * aspect;
            let placement = Placement {
                left: column as f64 * (width + gap),
                top: state.height(column),
                width,
                height,
            };
            state.grow(column, height + gap);
            placement
        })
        .collect();

    (placements, state.tallest())
}

/// Per-breakpoint result handed to the renderer in geometry mode.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointSummary {
    pub name: String,
    pub columns: usize,
    pub height: f64,
}

/// Run every configured breakpoint and store the slots on the photos.
///
/// Returns one summary per breakpoint in geometry mode, nothing in order
/// mode.
pub fn apply_layout(photos: &mut [Photo], config: &LayoutConfig) -> Vec<BreakpointSummary> {
    let mut summaries = Vec::new();
    for bp in &config.breakpoints {
        match config.mode {
            LayoutMode::Order => {
                let orders = compute_order(photos, bp.columns);
                for (photo, order) in photos.iter_mut().zip(orders) {
                    photo.layout.insert(bp.name.clone(), LayoutSlot::Order(order));
                }
            }
            LayoutMode::Geometry => {
                let (placements, height) =
                    compute_geometry(photos, bp.columns, bp.total_width, bp.gap);
                for (photo, placement) in photos.iter_mut().zip(placements) {
                    photo
                        .layout
                        .insert(bp.name.clone(), LayoutSlot::Geometry(placement));
                }
                summaries.push(BreakpointSummary {
                    name: bp.name.clone(),
                    columns: bp.columns,
                    height,
                });
            }
        }
    }
    summaries
}
