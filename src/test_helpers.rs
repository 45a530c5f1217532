//! Shared test utilities for the folio test suite.
//!
//! Synthetic image writers (plain and with an EXIF block), a site-root
//! fixture builder, and small constructors for pipeline records.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteFixture::new();
//! site.jpeg("assets/photo/a.jpg", 800, 600);
//! site.jpeg_with_exif("assets/photo/b.jpg", 800, 600, &ExifFixture::taken("2024:06:01 10:00:00"));
//! ```

use chrono::NaiveDateTime;
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::imaging::Dimensions;
use crate::types::Photo;

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Create a small valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    ensure_parent(path);
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// Create a small valid PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    ensure_parent(path);
    gradient(width, height).save(path).unwrap();
}

fn ensure_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
}

// =========================================================================
// EXIF block writer
// =========================================================================

/// Which EXIF entries to embed. Dates use the `YYYY:MM:DD HH:MM:SS` form
/// but are written verbatim, so malformed values can be tested too.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifFixture<'a> {
    pub orientation: Option<u16>,
    /// DateTimeOriginal placed in the top-level directory (IFD0).
    pub primary_original: Option<&'a str>,
    /// DateTimeDigitized placed in the top-level directory (IFD0).
    pub primary_digitized: Option<&'a str>,
    /// DateTimeOriginal placed in the EXIF sub-directory.
    pub exif_original: Option<&'a str>,
    /// DateTimeDigitized placed in the EXIF sub-directory.
    pub exif_digitized: Option<&'a str>,
}

impl<'a> ExifFixture<'a> {
    /// The common camera case: DateTimeOriginal in the EXIF sub-directory.
    pub fn taken(date: &'a str) -> Self {
        Self {
            exif_original: Some(date),
            ..Self::default()
        }
    }
}

const TAG_ORIENTATION: u16 = 0x0112;
const TAG_EXIF_POINTER: u16 = 0x8769;
const TAG_DATE_ORIGINAL: u16 = 0x9003;
const TAG_DATE_DIGITIZED: u16 = 0x9004;
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;

enum EntryValue<'a> {
    Short(u16),
    Long(u32),
    Ascii(&'a str),
}

/// Serialize a little-endian TIFF structure holding the fixture's entries.
fn tiff_block(fixture: &ExifFixture) -> Vec<u8> {
    let mut ifd0: Vec<(u16, EntryValue)> = Vec::new();
    if let Some(o) = fixture.orientation {
        ifd0.push((TAG_ORIENTATION, EntryValue::Short(o)));
    }
    let mut sub: Vec<(u16, EntryValue)> = Vec::new();
    if let Some(d) = fixture.exif_original {
        sub.push((TAG_DATE_ORIGINAL, EntryValue::Ascii(d)));
    }
    if let Some(d) = fixture.exif_digitized {
        sub.push((TAG_DATE_DIGITIZED, EntryValue::Ascii(d)));
    }
    let ifd_size = |n: usize| 2 + 12 * n + 4;
    let ifd0_len = ifd0.len()
        + usize::from(!sub.is_empty())
        + usize::from(fixture.primary_original.is_some())
        + usize::from(fixture.primary_digitized.is_some());
    let sub_offset = 8 + ifd_size(ifd0_len);
    if !sub.is_empty() {
        ifd0.push((TAG_EXIF_POINTER, EntryValue::Long(sub_offset as u32)));
    }
    if let Some(d) = fixture.primary_original {
        ifd0.push((TAG_DATE_ORIGINAL, EntryValue::Ascii(d)));
    }
    if let Some(d) = fixture.primary_digitized {
        ifd0.push((TAG_DATE_DIGITIZED, EntryValue::Ascii(d)));
    }

    let sub_len = if sub.is_empty() { 0 } else { ifd_size(sub.len()) };
    let mut data_offset = sub_offset + sub_len;
    let mut data: Vec<u8> = Vec::new();

    let mut write_ifd = |out: &mut Vec<u8>, entries: &[(u16, EntryValue)]| {
        out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for (tag, value) in entries {
            out.extend_from_slice(&tag.to_le_bytes());
            match value {
                EntryValue::Short(v) => {
                    out.extend_from_slice(&TYPE_SHORT.to_le_bytes());
                    out.extend_from_slice(&1u32.to_le_bytes());
                    out.extend_from_slice(&v.to_le_bytes());
                    out.extend_from_slice(&[0, 0]);
                }
                EntryValue::Long(v) => {
                    out.extend_from_slice(&TYPE_LONG.to_le_bytes());
                    out.extend_from_slice(&1u32.to_le_bytes());
                    out.extend_from_slice(&v.to_le_bytes());
                }
                EntryValue::Ascii(s) => {
                    let mut bytes = s.as_bytes().to_vec();
                    bytes.push(0);
                    out.extend_from_slice(&TYPE_ASCII.to_le_bytes());
                    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
                    if bytes.len() <= 4 {
                        bytes.resize(4, 0);
                        out.extend_from_slice(&bytes);
                    } else {
                        out.extend_from_slice(&(data_offset as u32).to_le_bytes());
                        data_offset += bytes.len();
                        data.extend_from_slice(&bytes);
                    }
                }
            }
        }
        out.extend_from_slice(&0u32.to_le_bytes());
    };

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"II");
    tiff.extend_from_slice(&42u16.to_le_bytes());
    tiff.extend_from_slice(&8u32.to_le_bytes());
    write_ifd(&mut tiff, &ifd0);
    if !sub.is_empty() {
        write_ifd(&mut tiff, &sub);
    }
    tiff.extend_from_slice(&data);
    tiff
}

/// Write a JPEG carrying an APP1 EXIF segment built from `exif`.
pub fn write_jpeg_with_exif(path: &Path, width: u32, height: u32, exif: &ExifFixture) {
    let jpeg = jpeg_bytes(width, height);
    let tiff = tiff_block(exif);

    let mut segment = vec![0xFF, 0xE1];
    let len = (2 + 6 + tiff.len()) as u16;
    segment.extend_from_slice(&len.to_be_bytes());
    segment.extend_from_slice(b"Exif\0\0");
    segment.extend_from_slice(&tiff);

    // Right after SOI (FF D8)
    let mut out = jpeg[..2].to_vec();
    out.extend_from_slice(&segment);
    out.extend_from_slice(&jpeg[2..]);

    ensure_parent(path);
    std::fs::write(path, out).unwrap();
}

/// Set a file's modification time.
pub fn set_mtime(path: &Path, time: NaiveDateTime) {
    let local = time
        .and_local_timezone(chrono::Local)
        .earliest()
        .expect("unambiguous local time");
    let system: std::time::SystemTime = local.into();
    std::fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(system)
        .unwrap();
}

/// Parse `YYYY-MM-DD HH:MM:SS`.
pub fn dt(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
}

// =========================================================================
// Site fixture
// =========================================================================

/// A temporary site root with helpers for dropping assets into it.
pub struct SiteFixture {
    pub dir: TempDir,
}

impl SiteFixture {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn jpeg(&self, rel: &str, width: u32, height: u32) -> PathBuf {
        let path = self.path(rel);
        create_test_jpeg(&path, width, height);
        path
    }

    pub fn jpeg_with_exif(&self, rel: &str, width: u32, height: u32, exif: &ExifFixture) -> PathBuf {
        let path = self.path(rel);
        write_jpeg_with_exif(&path, width, height, exif);
        path
    }

    /// Write arbitrary bytes (e.g. a corrupt image).
    pub fn file(&self, rel: &str, contents: &[u8]) -> PathBuf {
        let path = self.path(rel);
        ensure_parent(&path);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

// =========================================================================
// Record constructors
// =========================================================================

/// A photo with known dimensions and no layout yet.
pub fn photo(src: &str, width: u32, height: u32) -> Photo {
    Photo {
        original_src: src.to_string(),
        low_res_src: src.to_string(),
        timestamp: dt("2024-01-01 00:00:00"),
        dimensions: Some(Dimensions { width, height }),
        layout: Default::default(),
        extra: Default::default(),
    }
}

/// A photo whose dimensions could not be read.
pub fn undecodable_photo(src: &str) -> Photo {
    Photo {
        dimensions: None,
        ..photo(src, 1, 1)
    }
}
