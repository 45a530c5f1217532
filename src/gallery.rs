//! Gallery assembly.
//!
//! Builds the ordered photo list from two sources:
//!
//! - **Declared** photos: entries of the content file's photo list, already
//!   rewritten, so each is an asset record or a mapping whose `src` is one.
//!   Other keys of a mapping entry (caption, alt text) ride along.
//! - **Discovered** photos: raster files in the photo directory that no
//!   declared entry names. Their low-res variants are derived here.
//!
//! `original_src` is the identity of a photo: a file that is both declared
//! and on disk appears once, as declared. Every photo then gets a capture
//! timestamp and its display dimensions, and the list is sorted newest
//! first. The sort is stable, so photos with equal timestamps keep their
//! declaration/discovery order.
//!
//! Per-photo work (derive, timestamp, identify) is independent and runs on
//! the rayon pool; results are collected in input order before sorting.

use crate::cache::CacheStats;
use crate::content::ContentNode;
use crate::imaging::{Dimensions, ImageBackend};
use crate::lowres::{DeriveOutcome, LowResDeriver};
use crate::metadata::resolve_timestamp;
use crate::scan::AssetLocator;
use crate::types::{AssetRef, Photo};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// A photo entry taken from the content tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Declared {
    pub asset: AssetRef,
    pub extra: IndexMap<String, ContentNode>,
}

impl From<AssetRef> for Declared {
    fn from(asset: AssetRef) -> Self {
        Self {
            asset,
            extra: IndexMap::new(),
        }
    }
}

/// Pull declared photos out of the (rewritten) photo list node.
///
/// Accepts a sequence of entries or a single entry. Entries that are not
/// managed assets are logged and skipped; repeated entries keep the first.
pub fn declared_photos(node: Option<&ContentNode>) -> Vec<Declared> {
    let entries: Vec<&ContentNode> = match node {
        None => return Vec::new(),
        Some(ContentNode::Sequence(items)) => items.iter().collect(),
        Some(single) => vec![single],
    };

    let mut seen = HashSet::new();
    let mut declared = Vec::new();
    for entry in entries {
        let Some(photo) = declared_entry(entry) else {
            log::warn!("Skipping photo entry that is not a managed image: {}", describe(entry));
            continue;
        };
        if !seen.insert(photo.asset.original_src.clone()) {
            log::warn!("Duplicate photo entry: {}", photo.asset.original_src);
            continue;
        }
        declared.push(photo);
    }
    declared
}

fn declared_entry(entry: &ContentNode) -> Option<Declared> {
    match entry {
        ContentNode::Asset(asset) => Some(asset.clone().into()),
        ContentNode::Mapping(map) => match map.get("src")? {
            ContentNode::Asset(asset) => Some(Declared {
                asset: asset.clone(),
                extra: map
                    .iter()
                    .filter(|(key, _)| key.as_str() != "src")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect(),
            }),
            _ => None,
        },
        _ => None,
    }
}

fn describe(node: &ContentNode) -> String {
    serde_json::to_string(node).unwrap_or_else(|_| format!("{:?}", node))
}

/// Result of a gallery assembly.
#[derive(Debug)]
pub struct Assembled {
    /// Newest first.
    pub photos: Vec<Photo>,
    pub declared: usize,
    pub discovered: usize,
    /// Derivation outcomes for discovered photos.
    pub stats: CacheStats,
}

pub struct GalleryAssembler<'a, B: ImageBackend> {
    backend: &'a B,
    locator: &'a AssetLocator,
    deriver: &'a LowResDeriver<'a, B>,
    site_root: PathBuf,
    photo_dir: PathBuf,
}

impl<'a, B: ImageBackend> GalleryAssembler<'a, B> {
    pub fn new(
        backend: &'a B,
        locator: &'a AssetLocator,
        deriver: &'a LowResDeriver<'a, B>,
        site_root: &Path,
        photo_dir: &Path,
    ) -> Self {
        Self {
            backend,
            locator,
            deriver,
            site_root: site_root.to_path_buf(),
            photo_dir: photo_dir.to_path_buf(),
        }
    }

    pub fn assemble(&self, declared: Vec<Declared>) -> io::Result<Assembled> {
        let known: HashSet<String> = declared
            .iter()
            .map(|d| d.asset.original_src.clone())
            .collect();
        let discovered = self.locator.discover(&self.photo_dir, &known);
        let declared_count = declared.len();
        let discovered_count = discovered.len();

        let derived: Vec<(Declared, DeriveOutcome)> = discovered
            .par_iter()
            .map(|original| -> io::Result<(Declared, DeriveOutcome)> {
                let derived = self.deriver.derive(original)?;
                let asset = AssetRef {
                    original_src: original.clone(),
                    low_res_src: derived.low_res_src,
                };
                Ok((asset.into(), derived.outcome))
            })
            .collect::<io::Result<_>>()?;

        let mut stats = CacheStats::default();
        let mut entries = declared;
        for (entry, outcome) in derived {
            outcome.record(&mut stats);
            entries.push(entry);
        }

        let mut photos: Vec<Photo> = entries
            .into_par_iter()
            .map(|entry| self.enrich(entry))
            .collect();

        sort_newest_first(&mut photos);

        Ok(Assembled {
            photos,
            declared: declared_count,
            discovered: discovered_count,
            stats,
        })
    }

    fn enrich(&self, entry: Declared) -> Photo {
        let path = self.site_root.join(&entry.asset.original_src);
        let timestamp = resolve_timestamp(self.backend, &path);
        let dimensions = match self.backend.identify(&path) {
            Ok(dims) => Some(dims),
            Err(e) => {
                log::warn!("Cannot read dimensions of {}: {}", entry.asset.original_src, e);
                None
            }
        };
        let mut photo = Photo::from_asset(entry.asset, timestamp);
        photo.dimensions = dimensions.filter(|d: &Dimensions| d.width > 0 && d.height > 0);
        photo.extra = entry.extra;
        photo
    }
}

/// Stable sort, newest timestamp first.
pub fn sort_newest_first(photos: &mut [Photo]) {
    photos.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
