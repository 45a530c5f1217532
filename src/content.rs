//! The content tree: what the site describes, as a plain nested value.
//!
//! The content file (`data.json` or `data.toml`) is loaded into a
//! [`ContentNode`] without interpretation: mappings keep their key order,
//! sequences keep their element order, scalars stay as written. The pipeline
//! then rewrites it (managed image strings become [`AssetRef`] records,
//! the photo list becomes ordered [`Photo`] records) and serializes it back
//! out for the renderer.
//!
//! Because the tree is an owned value built from a parsed file it cannot
//! contain cycles, so recursive walks always terminate.

use crate::types::{AssetRef, LayoutSlot, Photo, Placement, TIMESTAMP_FORMAT};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error reading {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Unsupported content format (expected .json or .toml): {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Content root must be a mapping: {0}")]
    RootNotMapping(PathBuf),
}

/// A leaf value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

/// A node of the content tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContentNode {
    Scalar(Scalar),
    Sequence(Vec<ContentNode>),
    Mapping(IndexMap<String, ContentNode>),
    /// Produced by the rewriter, never read from a content file.
    #[serde(skip_deserializing)]
    Asset(AssetRef),
}

impl ContentNode {
    pub fn string(s: impl Into<String>) -> Self {
        ContentNode::Scalar(Scalar::String(s.into()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContentNode::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, ContentNode>> {
        match self {
            ContentNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mapping_mut(&mut self) -> Option<&mut IndexMap<String, ContentNode>> {
        match self {
            ContentNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&ContentNode> {
        self.as_mapping()?.get(key)
    }

    /// The site's display name (`name` key), if present.
    pub fn name(&self) -> Option<&str> {
        self.get("name")?.as_str()
    }

    /// Every string scalar in the tree, depth first.
    pub fn strings(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_strings(self, &mut out);
        out
    }
}

fn collect_strings<'a>(node: &'a ContentNode, out: &mut Vec<&'a str>) {
    match node {
        ContentNode::Scalar(Scalar::String(s)) => out.push(s),
        ContentNode::Scalar(_) | ContentNode::Asset(_) => {}
        ContentNode::Sequence(items) => items.iter().for_each(|n| collect_strings(n, out)),
        ContentNode::Mapping(map) => map.values().for_each(|n| collect_strings(n, out)),
    }
}

impl From<&Placement> for ContentNode {
    fn from(p: &Placement) -> Self {
        let mut map = IndexMap::new();
        map.insert("left".into(), ContentNode::Scalar(Scalar::Float(p.left)));
        map.insert("top".into(), ContentNode::Scalar(Scalar::Float(p.top)));
        map.insert("width".into(), ContentNode::Scalar(Scalar::Float(p.width)));
        map.insert("height".into(), ContentNode::Scalar(Scalar::Float(p.height)));
        ContentNode::Mapping(map)
    }
}

impl From<&Photo> for ContentNode {
    fn from(photo: &Photo) -> Self {
        let mut map = IndexMap::new();
        map.insert("original_src".into(), ContentNode::string(&photo.original_src));
        map.insert("low_res_src".into(), ContentNode::string(&photo.low_res_src));
        map.insert(
            "timestamp".into(),
            ContentNode::string(photo.timestamp.format(TIMESTAMP_FORMAT).to_string()),
        );
        if let Some(dims) = photo.dimensions {
            map.insert(
                "width".into(),
                ContentNode::Scalar(Scalar::Integer(dims.width.into())),
            );
            map.insert(
                "height".into(),
                ContentNode::Scalar(Scalar::Integer(dims.height.into())),
            );
        }
        if !photo.layout.is_empty() {
            let layout = photo
                .layout
                .iter()
                .map(|(name, slot)| {
                    let value = match slot {
                        LayoutSlot::Order(i) => ContentNode::Scalar(Scalar::Integer(*i as i64)),
                        LayoutSlot::Geometry(p) => ContentNode::from(p),
                    };
                    (name.clone(), value)
                })
                .collect();
            map.insert("layout".into(), ContentNode::Mapping(layout));
        }
        for (key, value) in &photo.extra {
            if !map.contains_key(key) {
                map.insert(key.clone(), value.clone());
            }
        }
        ContentNode::Mapping(map)
    }
}

/// Load a content file, choosing the parser by extension.
///
/// The root must be a mapping; anything else is rejected so later steps can
/// rely on keyed access.
pub fn load_content(path: &Path) -> Result<ContentNode, ContentError> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let text = fs::read_to_string(path).map_err(|e| ContentError::Io(path.to_path_buf(), e))?;

    let node: ContentNode = match ext.as_str() {
        "json" => serde_json::from_str(&text)?,
        "toml" => toml::from_str(&text)?,
        _ => return Err(ContentError::UnsupportedFormat(path.to_path_buf())),
    };

    match node {
        ContentNode::Mapping(_) => Ok(node),
        _ => Err(ContentError::RootNotMapping(path.to_path_buf())),
    }
}
