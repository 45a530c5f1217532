//! Content tree rewriting.
//!
//! Walks the whole content tree and replaces every string that names a
//! managed asset with an [`AssetRef`](crate::types::AssetRef) carrying both
//! the original path and its low-res variant. Everything else is copied
//! as-is: keys, key order, sequence order, and non-matching scalars.
//!
//! ```text
//! {"gallery": ["assets/photo/x.jpg", "not/a/path"]}
//!   ↓
//! {"gallery": [{"original_src": "assets/photo/x.jpg",
//!               "low_res_src": "low_res/photo/x.jpg"}, "not/a/path"]}
//! ```

use crate::cache::CacheStats;
use crate::content::{ContentNode, Scalar};
use crate::imaging::ImageBackend;
use crate::lowres::LowResDeriver;
use crate::scan::AssetLocator;
use crate::types::AssetRef;
use std::io;

pub struct Rewriter<'a, B: ImageBackend> {
    locator: &'a AssetLocator,
    deriver: &'a LowResDeriver<'a, B>,
    stats: CacheStats,
}

impl<'a, B: ImageBackend> Rewriter<'a, B> {
    pub fn new(locator: &'a AssetLocator, deriver: &'a LowResDeriver<'a, B>) -> Self {
        Self {
            locator,
            deriver,
            stats: CacheStats::default(),
        }
    }

    /// Derivation outcomes seen so far.
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn rewrite(&mut self, node: &ContentNode) -> io::Result<ContentNode> {
        Ok(match node {
            ContentNode::Mapping(map) => ContentNode::Mapping(
                map.iter()
                    .map(|(key, value)| Ok((key.clone(), self.rewrite(value)?)))
                    .collect::<io::Result<_>>()?,
            ),
            ContentNode::Sequence(items) => ContentNode::Sequence(
                items
                    .iter()
                    .map(|item| self.rewrite(item))
                    .collect::<io::Result<_>>()?,
            ),
            ContentNode::Scalar(Scalar::String(s)) if self.locator.is_managed_asset(s) => {
                let derived = self.deriver.derive(s)?;
                derived.outcome.record(&mut self.stats);
                ContentNode::Asset(AssetRef {
                    original_src: s.clone(),
                    low_res_src: derived.low_res_src,
                })
            }
            other => other.clone(),
        })
    }
}
