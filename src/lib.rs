//! # Folio
//!
//! The build pipeline of a static personal site with a photography gallery.
//! A content description (`data.json` or `data.toml`) names the site's text
//! and images; folio turns it into the data a template renderer needs:
//! low-res variants for every managed image, a chronologically ordered
//! gallery, and a masonry layout for each display width.
//!
//! # Architecture: One Pass Over the Content Tree
//!
//! ```text
//! data.json ──► rewrite ──► assemble ──► layout ──► site.json
//!                 │            │
//!                 └── derive ◄─┘   (low_res/ cache)
//! ```
//!
//! 1. **Rewrite** every managed image string into `{original_src, low_res_src}`.
//! 2. **Assemble** the gallery: declared photos plus the photo directory,
//!    timestamped from EXIF (or mtime) and sorted newest first.
//! 3. **Layout**: greedy shortest-column masonry per breakpoint.
//! 4. Write the augmented tree for the renderer.
//!
//! Rendering HTML is not part of this crate; `site.json` is the hand-off.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`content`] | Content tree model and `.json`/`.toml` loader |
//! | [`scan`] | Asset locator: managed-path test and photo discovery |
//! | [`cache`] | Path-mirrored low-res cache and hit/encode stats |
//! | [`lowres`] | Low-res derivation with pass-through and failure fallback |
//! | [`metadata`] | Capture timestamp resolution (EXIF tags, then mtime) |
//! | [`rewrite`] | Recursive content tree rewriter |
//! | [`gallery`] | Declared + discovered photo assembly and ordering |
//! | [`layout`] | Masonry engine: order indices or viewport geometry |
//! | [`process`] | Pipeline orchestration, `site.json` writer, `check` report |
//! | [`config`] | `config.toml` loading, merging, and validation |
//! | [`types`] | Records shared between stages (`AssetRef`, `Photo`) |
//! | [`imaging`] | Pure-Rust image operations: identify, EXIF, resize |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Existence-Based Cache
//!
//! A low-res variant is regenerated only when its file is missing. Builds
//! are repeated often and originals rarely change in place, so checking one
//! path per image is all the bookkeeping needed. `--no-cache` forces a full
//! re-encode.
//!
//! ## Failures Stay Local
//!
//! A corrupt image never stops a build: its low-res path falls back to the
//! original, its timestamp to the file's mtime, its layout slot to an empty
//! placement. Only an unwritable cache directory or an unreadable content
//! file aborts.
//!
//! ## Pure-Rust Imaging
//!
//! Decoding, orientation, resizing and EXIF parsing use the `image` and
//! `kamadak-exif` crates. No system libraries are required.

pub mod cache;
pub mod config;
pub mod content;
pub mod gallery;
pub mod imaging;
pub mod layout;
pub mod lowres;
pub mod metadata;
pub mod output;
pub mod process;
pub mod rewrite;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
