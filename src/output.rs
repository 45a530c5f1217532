//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Photos are listed by gallery position and file name, newest first, with
//! paths and measurements as indented context lines. The same layout is used
//! by `build` and `check` so both read as a content inventory.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Site: Jo Doe
//! Photos (3: 1 declared, 2 discovered)
//! 001 harbour.jpg (2024-06-01 09:00)
//!     Source: assets/photo/harbour.jpg
//!     Low-res: low_res/photo/harbour.jpg
//!     Size: 600x800
//! 002 dunes.jpg (2024-01-05 17:42)
//!     Source: assets/photo/dunes.jpg
//!     Low-res: assets/photo/dunes.jpg (original)
//! Layout
//!     large: 3 columns, 51.3 vw
//! Low-res: 1 cached, 1 encoded (3 total), 1 failed
//! Wrote build/site.json
//! ```
//!
//! ## Check
//!
//! ```text
//! Site: Jo Doe
//! Managed assets (3)
//!     assets/logo.svg
//!     assets/photo/harbour.jpg
//!     assets/gone.jpg (missing)
//! Discoverable photos (1)
//!     assets/photo/dunes.jpg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::process::{CheckReport, ProcessResult};
use crate::types::Photo;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(src: &str) -> &str {
    src.rsplit('/').next().unwrap_or(src)
}

fn site_line(name: Option<&str>) -> String {
    format!("Site: {}", name.unwrap_or("(unnamed)"))
}

/// Header plus context lines for one gallery photo.
///
/// ```text
/// 001 harbour.jpg (2024-06-01 09:00)
///     Source: assets/photo/harbour.jpg
///     Low-res: low_res/photo/harbour.jpg
///     Size: 600x800
/// ```
fn photo_lines(position: usize, photo: &Photo) -> Vec<String> {
    let mut lines = vec![
        format!(
            "{} {} ({})",
            format_index(position),
            file_name(&photo.original_src),
            photo.timestamp.format("%Y-%m-%d %H:%M")
        ),
        format!("{}Source: {}", indent(1), photo.original_src),
    ];
    if photo.low_res_src == photo.original_src {
        lines.push(format!("{}Low-res: {} (original)", indent(1), photo.low_res_src));
    } else {
        lines.push(format!("{}Low-res: {}", indent(1), photo.low_res_src));
    }
    if let Some(dims) = photo.dimensions {
        lines.push(format!("{}Size: {}x{}", indent(1), dims.width, dims.height));
    }
    lines
}

// ============================================================================
// build
// ============================================================================

pub fn format_process_output(result: &ProcessResult, site_file: &Path) -> Vec<String> {
    let mut lines = vec![
        site_line(result.site.name()),
        format!(
            "Photos ({}: {} declared, {} discovered)",
            result.photos.len(),
            result.declared,
            result.discovered
        ),
    ];
    for (i, photo) in result.photos.iter().enumerate() {
        lines.extend(photo_lines(i + 1, photo));
    }

    if !result.layout.is_empty() {
        lines.push("Layout".to_string());
        for bp in &result.layout {
            lines.push(format!(
                "{}{}: {} columns, {:.1} vw",
                indent(1),
                bp.name,
                bp.columns,
                bp.height
            ));
        }
    }

    lines.push(format!("Low-res: {}", result.stats));
    lines.push(format!("Wrote {}", site_file.display()));
    lines
}

pub fn print_process_output(result: &ProcessResult, site_file: &Path) {
    for line in format_process_output(result, site_file) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

pub fn format_check_output(report: &CheckReport, name: Option<&str>) -> Vec<String> {
    let mut lines = vec![
        site_line(name),
        format!("Managed assets ({})", report.managed.len()),
    ];
    for path in &report.managed {
        if report.missing.contains(path) {
            lines.push(format!("{}{} (missing)", indent(1), path));
        } else {
            lines.push(format!("{}{}", indent(1), path));
        }
    }
    lines.push(format!("Discoverable photos ({})", report.discoverable.len()));
    for path in &report.discoverable {
        lines.push(format!("{}{}", indent(1), path));
    }
    lines
}

pub fn print_check_output(report: &CheckReport, name: Option<&str>) {
    for line in format_check_output(report, name) {
        println!("{}", line);
    }
}
