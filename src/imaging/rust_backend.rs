//! Pure Rust image processing backend.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, GIF) | `image` crate |
//! | EXIF orientation + dates | `kamadak-exif` (`exif::Reader`) |
//! | Orientation fix | `DynamicImage::rotate*` / `flip*` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode | `JpegEncoder` (quality), PNG and GIF via `save_with_format` |

use super::backend::{BackendError, CaptureTags, Dimensions, ExifTags, ImageBackend};
use super::calculations::oriented_dimensions;
use super::params::ResizeParams;
use exif::{Context, In, Reader as ExifReader, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Pure Rust backend using the `image` and `kamadak-exif` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Parse the EXIF block of a file, whatever its container.
fn read_exif_block(path: &Path) -> Result<exif::Exif, BackendError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    ExifReader::new()
        .read_from_container(&mut reader)
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("No EXIF in {}: {}", path.display(), e))
        })
}

/// Orientation tag, or `None` when there is no EXIF or no tag.
fn read_orientation(path: &Path) -> Option<u32> {
    let exif = read_exif_block(path).ok()?;
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
}

/// First ASCII component of a field value, NUL padding stripped.
fn ascii_value(value: &Value) -> Option<String> {
    match value {
        Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim_matches('\0').trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}

/// Rotate/flip pixel data so it matches the intended viewing orientation.
fn apply_orientation(image: DynamicImage, orientation: Option<u32>) -> DynamicImage {
    match orientation {
        Some(2) => image.fliph(),
        Some(3) => image.rotate180(),
        Some(4) => image.flipv(),
        Some(5) => image.rotate90().fliph(),
        Some(6) => image.rotate90(),
        Some(7) => image.rotate270().fliph(),
        Some(8) => image.rotate270(),
        _ => image,
    }
}

/// Save a DynamicImage to the given path, inferring format from extension.
///
/// The image is encoded next to `path` and renamed into place once complete,
/// so `path` either holds a whole image or does not exist.
fn save_image(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let partial = partial_path(path);
    match encode_image(img, path, &partial, quality) {
        Ok(()) => {
            fs::rename(&partial, path)?;
            Ok(())
        }
        Err(e) => {
            // The encode error is the one worth reporting
            let _ = fs::remove_file(&partial);
            Err(e)
        }
    }
}

/// Hidden sibling of `path` used while encoding.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.part"))
}

/// Encode `img` into `dest` in the format named by `path`'s extension.
fn encode_image(
    img: &DynamicImage,
    path: &Path,
    dest: &Path,
    quality: u32,
) -> Result<(), BackendError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let encode_err =
        |e: image::ImageError| BackendError::ProcessingFailed(format!("Encode failed: {}", e));

    match ext.as_str() {
        "jpg" | "jpeg" => {
            let mut writer = BufWriter::new(File::create(dest)?);
            let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100) as u8);
            // JPEG has no alpha channel
            DynamicImage::ImageRgb8(img.to_rgb8())
                .write_with_encoder(encoder)
                .map_err(encode_err)?;
            writer.flush()?;
            Ok(())
        }
        "png" => img.save_with_format(dest, ImageFormat::Png).map_err(encode_err),
        "gif" => DynamicImage::ImageRgba8(img.to_rgba8())
            .save_with_format(dest, ImageFormat::Gif)
            .map_err(encode_err),
        other => Err(BackendError::ProcessingFailed(format!(
            "Unsupported output format: {}",
            other
        ))),
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let stored = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        let (width, height) = oriented_dimensions(stored, read_orientation(path));
        Ok(Dimensions { width, height })
    }

    fn read_exif(&self, path: &Path) -> Result<ExifTags, BackendError> {
        let exif = read_exif_block(path)?;
        let mut tags = ExifTags {
            orientation: exif
                .get_field(Tag::Orientation, In::PRIMARY)
                .and_then(|field| field.value.get_uint(0)),
            ..ExifTags::default()
        };

        for field in exif.fields().filter(|f| f.ifd_num == In::PRIMARY) {
            let slot: &mut CaptureTags = match field.tag.context() {
                Context::Tiff => &mut tags.primary,
                Context::Exif => &mut tags.exif_ifd,
                _ => continue,
            };
            let number = field.tag.number();
            if number == Tag::DateTimeOriginal.number() {
                slot.date_time_original = ascii_value(&field.value);
            } else if number == Tag::DateTimeDigitized.number() {
                slot.date_time_digitized = ascii_value(&field.value);
            }
        }

        Ok(tags)
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.source)?;
        let upright = apply_orientation(img, read_orientation(&params.source));
        let resized = upright.resize_exact(params.width, params.height, FilterType::Lanczos3);
        save_image(&resized, &params.output, params.quality.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use crate::test_helpers::{ExifFixture, create_test_jpeg, create_test_png, write_jpeg_with_exif};

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!((dims.width, dims.height), (200, 150));
    }

    #[test]
    fn identify_swaps_for_rotated_orientation() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("rotated.jpg");
        write_jpeg_with_exif(
            &path,
            200,
            100,
            &ExifFixture {
                orientation: Some(6),
                ..ExifFixture::default()
            },
        );

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!((dims.width, dims.height), (100, 200));
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let result = RustBackend::new().identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn read_exif_without_metadata_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("plain.jpg");
        create_test_jpeg(&path, 32, 32);

        assert!(RustBackend::new().read_exif(&path).is_err());
    }

    #[test]
    fn read_exif_finds_dates_in_exif_sub_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("dated.jpg");
        write_jpeg_with_exif(
            &path,
            64,
            48,
            &ExifFixture {
                orientation: Some(1),
                exif_original: Some("2024:06:01 09:30:00"),
                exif_digitized: Some("2024:06:02 10:00:00"),
                ..ExifFixture::default()
            },
        );

        let tags = RustBackend::new().read_exif(&path).unwrap();
        assert_eq!(tags.orientation, Some(1));
        assert_eq!(tags.primary, CaptureTags::default());
        assert_eq!(
            tags.exif_ifd.date_time_original.as_deref(),
            Some("2024:06:01 09:30:00")
        );
        assert_eq!(
            tags.exif_ifd.date_time_digitized.as_deref(),
            Some("2024:06:02 10:00:00")
        );
    }

    #[test]
    fn read_exif_finds_dates_in_top_level_directory() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("legacy.jpg");
        write_jpeg_with_exif(
            &path,
            64,
            48,
            &ExifFixture {
                primary_original: Some("2019:12:24 18:00:00"),
                ..ExifFixture::default()
            },
        );

        let tags = RustBackend::new().read_exif(&path).unwrap();
        assert_eq!(
            tags.primary.date_time_original.as_deref(),
            Some("2019:12:24 18:00:00")
        );
        assert_eq!(tags.exif_ifd, CaptureTags::default());
    }

    #[test]
    fn resize_jpeg_to_exact_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 800, 600);

        let output = tmp.path().join("low.jpg");
        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 400,
                height: 300,
                quality: Quality::new(85),
            })
            .unwrap();

        assert_eq!(image::image_dimensions(&output).unwrap(), (400, 300));
        assert!(!tmp.path().join(".low.jpg.part").exists());
    }

    #[test]
    fn failed_encode_leaves_no_file_behind() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 80, 60);
        let output = tmp.path().join("low.webp");

        let result = RustBackend::new().resize(&ResizeParams {
            source,
            output: output.clone(),
            width: 40,
            height: 30,
            quality: Quality::new(85),
        });

        assert!(result.is_err());
        assert!(!output.exists());
        assert!(!tmp.path().join(".low.webp.part").exists());
    }

    #[test]
    fn partial_path_is_hidden_sibling() {
        assert_eq!(
            partial_path(Path::new("/site/low_res/photo/a.jpg")),
            PathBuf::from("/site/low_res/photo/.a.jpg.part")
        );
    }

    #[test]
    fn resize_applies_orientation_before_scaling() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("rotated.jpg");
        write_jpeg_with_exif(
            &source,
            200,
            100,
            &ExifFixture {
                orientation: Some(6),
                ..ExifFixture::default()
            },
        );
        let output = tmp.path().join("low.jpg");

        let backend = RustBackend::new();
        let dims = backend.identify(&source).unwrap();
        backend
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 40,
                height: 80,
                quality: Quality::new(85),
            })
            .unwrap();

        assert_eq!((dims.width, dims.height), (100, 200));
        assert_eq!(image::image_dimensions(&output).unwrap(), (40, 80));
    }

    #[test]
    fn resize_png_keeps_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        create_test_png(&source, 100, 50);
        let output = tmp.path().join("low.png");

        RustBackend::new()
            .resize(&ResizeParams {
                source,
                output: output.clone(),
                width: 40,
                height: 20,
                quality: Quality::new(85),
            })
            .unwrap();

        let reader = ImageReader::open(&output).unwrap().with_guessed_format().unwrap();
        assert_eq!(reader.format(), Some(ImageFormat::Png));
    }

    #[test]
    fn resize_corrupt_source_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"definitely not a jpeg").unwrap();

        let result = RustBackend::new().resize(&ResizeParams {
            source,
            output: tmp.path().join("low.jpg"),
            width: 40,
            height: 20,
            quality: Quality::new(85),
        });
        assert!(matches!(result, Err(BackendError::ProcessingFailed(_))));
    }

    #[test]
    fn resize_unsupported_output_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 100, 100);

        let result = RustBackend::new().resize(&ResizeParams {
            source,
            output: tmp.path().join("low.bmp"),
            width: 50,
            height: 50,
            quality: Quality::new(85),
        });
        assert!(result.is_err());
    }

    #[test]
    fn apply_orientation_quarter_turn_swaps_axes() {
        let img = DynamicImage::new_rgb8(20, 10);
        let turned = apply_orientation(img, Some(8));
        assert_eq!((turned.width(), turned.height()), (10, 20));
    }
}
