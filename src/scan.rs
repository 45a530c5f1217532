//! Asset location: which content strings are managed images, and which
//! photos exist on disk without being listed.
//!
//! Paths are handled in the form the content file uses them: relative to the
//! site root, `/`-separated (`assets/photo/a.jpg`). The locator never reads
//! image data; [`AssetLocator::discover`] only lists a directory.
//!
//! ## Rules
//!
//! - **Managed**: the path lies under the asset root (compared by path
//!   component, so `assets-old/x.jpg` is not under `assets`) and its
//!   lowercased extension is one of `jpg`, `jpeg`, `png`, `gif`, `svg`.
//!   Paths with `..`, a leading `.` or an absolute root are never managed.
//! - **Discoverable**: a file directly inside the photo directory with a
//!   raster extension (`svg` is managed but never discovered). Hidden files
//!   are skipped. Results keep the filesystem's enumeration order.

use crate::config::AssetsConfig;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Extensions that make a content string a managed asset.
pub const MANAGED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg"];

/// Extensions picked up when scanning the photo directory.
pub const RASTER_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];

/// Lowercased extension of `path`, empty when there is none.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Whether every component of `path` is a plain name.
///
/// Rejects `..`, a leading `.`, a root and a drive prefix, so a path that
/// passes can only point below the directory it is joined to.
pub fn is_plain_relative(path: &Path) -> bool {
    path.components().all(|c| matches!(c, Component::Normal(_)))
}

#[derive(Debug, Clone)]
pub struct AssetLocator {
    site_root: PathBuf,
    asset_root: PathBuf,
}

impl AssetLocator {
    pub fn new(site_root: &Path, assets: &AssetsConfig) -> Self {
        Self {
            site_root: site_root.to_path_buf(),
            asset_root: assets.root.clone(),
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// True iff `path` is under the asset root and has a managed extension.
    pub fn is_managed_asset(&self, path: &str) -> bool {
        let path = Path::new(path);
        is_plain_relative(path)
            && path.starts_with(&self.asset_root)
            && path != self.asset_root
            && MANAGED_EXTENSIONS.contains(&extension_of(path).as_str())
    }

    /// List raster images directly in `photo_dir` that are not in `known`.
    ///
    /// `photo_dir` is relative to the site root and so are the returned
    /// paths. A missing directory yields nothing.
    pub fn discover(&self, photo_dir: &Path, known: &HashSet<String>) -> Vec<String> {
        let dir = self.site_root.join(photo_dir);
        if !dir.is_dir() {
            log::warn!("Photo directory not found: {}", dir.display());
            return Vec::new();
        }

        WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| !entry.file_name().to_string_lossy().starts_with('.'))
            .filter(|entry| RASTER_EXTENSIONS.contains(&extension_of(entry.path()).as_str()))
            .map(|entry| content_path(&photo_dir.join(entry.file_name())))
            .filter(|rel| !known.contains(rel))
            .collect()
    }
}

/// Render a relative path the way the content file writes it.
pub fn content_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::SiteFixture;

    fn locator(root: &Path) -> AssetLocator {
        AssetLocator::new(root, &AssetsConfig::default())
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    // =========================================================================
    // is_managed_asset
    // =========================================================================

    #[test]
    fn photo_under_asset_root_is_managed() {
        let loc = locator(Path::new("/site"));
        assert!(loc.is_managed_asset("assets/photo/x.jpg"));
        assert!(loc.is_managed_asset("assets/logo.svg"));
        assert!(loc.is_managed_asset("assets/a.gif"));
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let loc = locator(Path::new("/site"));
        assert!(loc.is_managed_asset("assets/photo/IMG_0001.JPG"));
        assert!(loc.is_managed_asset("assets/photo/scan.Jpeg"));
    }

    #[test]
    fn path_outside_asset_root_is_not_managed() {
        let loc = locator(Path::new("/site"));
        assert!(!loc.is_managed_asset("not/a/path"));
        assert!(!loc.is_managed_asset("images/x.jpg"));
        assert!(!loc.is_managed_asset("https://example.com/assets/x.jpg"));
    }

    #[test]
    fn root_prefix_must_match_whole_component() {
        let loc = locator(Path::new("/site"));
        assert!(!loc.is_managed_asset("assets-old/x.jpg"));
    }

    #[test]
    fn escaping_or_absolute_paths_are_not_managed() {
        let loc = locator(Path::new("/site"));
        assert!(!loc.is_managed_asset("assets/../assets/photo/a.jpg"));
        assert!(!loc.is_managed_asset("assets/photo/../../secret.jpg"));
        assert!(!loc.is_managed_asset("./assets/photo/a.jpg"));
        assert!(!loc.is_managed_asset("/assets/photo/a.jpg"));
    }

    #[test]
    fn doubled_separators_are_still_managed() {
        let loc = locator(Path::new("/site"));
        assert!(loc.is_managed_asset("assets//photo/a.jpg"));
        assert!(loc.is_managed_asset("assets/./photo/a.jpg"));
    }

    #[test]
    fn plain_relative_accepts_only_names() {
        assert!(is_plain_relative(Path::new("assets/photo/a.jpg")));
        assert!(!is_plain_relative(Path::new("assets/../a.jpg")));
        assert!(!is_plain_relative(Path::new("/assets/a.jpg")));
        assert!(!is_plain_relative(Path::new("./a.jpg")));
    }

    #[test]
    fn unrecognized_extension_is_not_managed() {
        let loc = locator(Path::new("/site"));
        assert!(!loc.is_managed_asset("assets/cv.pdf"));
        assert!(!loc.is_managed_asset("assets/photo/a.webp"));
        assert!(!loc.is_managed_asset("assets/photo/noext"));
    }

    #[test]
    fn plain_text_is_not_managed() {
        let loc = locator(Path::new("/site"));
        assert!(!loc.is_managed_asset("Jane Doe"));
        assert!(!loc.is_managed_asset(""));
        assert!(!loc.is_managed_asset("assets"));
    }

    // =========================================================================
    // discover
    // =========================================================================

    #[test]
    fn discover_lists_raster_images() {
        let site = SiteFixture::new();
        site.file("assets/photo/a.jpg", b"x");
        site.file("assets/photo/b.PNG", b"x");
        site.file("assets/photo/c.gif", b"x");

        let found = locator(site.root()).discover(Path::new("assets/photo"), &HashSet::new());
        assert_eq!(
            sorted(found),
            vec!["assets/photo/a.jpg", "assets/photo/b.PNG", "assets/photo/c.gif"]
        );
    }

    #[test]
    fn discover_skips_svg_and_other_files() {
        let site = SiteFixture::new();
        site.file("assets/photo/a.jpg", b"x");
        site.file("assets/photo/logo.svg", b"<svg/>");
        site.file("assets/photo/notes.txt", b"x");
        site.file("assets/photo/.hidden.jpg", b"x");

        let found = locator(site.root()).discover(Path::new("assets/photo"), &HashSet::new());
        assert_eq!(found, vec!["assets/photo/a.jpg"]);
    }

    #[test]
    fn discover_is_not_recursive() {
        let site = SiteFixture::new();
        site.file("assets/photo/a.jpg", b"x");
        site.file("assets/photo/nested/b.jpg", b"x");

        let found = locator(site.root()).discover(Path::new("assets/photo"), &HashSet::new());
        assert_eq!(found, vec!["assets/photo/a.jpg"]);
    }

    #[test]
    fn discover_excludes_known_paths() {
        let site = SiteFixture::new();
        site.file("assets/photo/a.jpg", b"x");
        site.file("assets/photo/b.jpg", b"x");

        let known: HashSet<String> = ["assets/photo/a.jpg".to_string()].into();
        let found = locator(site.root()).discover(Path::new("assets/photo"), &known);
        assert_eq!(found, vec!["assets/photo/b.jpg"]);
    }

    #[test]
    fn discover_missing_dir_is_empty() {
        let site = SiteFixture::new();
        let found = locator(site.root()).discover(Path::new("assets/photo"), &HashSet::new());
        assert!(found.is_empty());
    }

    #[test]
    fn content_path_joins_with_slashes() {
        assert_eq!(
            content_path(&Path::new("assets").join("photo").join("a.jpg")),
            "assets/photo/a.jpg"
        );
    }
}
