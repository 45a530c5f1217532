//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Dimensions as displayed once the EXIF orientation is applied.
///
/// Orientations 5–8 involve a quarter turn, so width and height swap.
/// Anything else (including unknown values) leaves them untouched.
pub fn oriented_dimensions(stored: (u32, u32), orientation: Option<u32>) -> (u32, u32) {
    match orientation {
        Some(5..=8) => (stored.1, stored.0),
        _ => stored,
    }
}

/// Size of a low-res variant: fixed width, height following the source aspect.
///
/// `height = round(target_width * orig_height / orig_width)`, never below 1px.
///
/// # Examples
/// ```
/// # use folio::imaging::low_res_dimensions;
/// assert_eq!(low_res_dimensions((4000, 3000), 400), (400, 300));
/// assert_eq!(low_res_dimensions((3000, 4000), 400), (400, 533));
/// ```
pub fn low_res_dimensions(original: (u32, u32), target_width: u32) -> (u32, u32) {
    let (orig_w, orig_h) = original;
    if orig_w == 0 {
        return (target_width, 1);
    }
    let h = (target_width as f64 * orig_h as f64 / orig_w as f64).round() as u32;
    (target_width, h.max(1))
}
