//! Normalized per-entity records pulled out of a COCO document.
//!
//! Only the fields the flat export needs are retained. Everything else in
//! the source records (licenses, segmentation, area, iscrowd...) is ignored.

use std::collections::BTreeMap;
use std::fmt;

use super::ids::{CategoryId, ImageId};

/// The three top-level COCO collections the extractor reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Images,
    Annotations,
    Categories,
}

impl Collection {
    /// Every required collection, in lookup order.
    pub const ALL: [Collection; 3] = [
        Collection::Images,
        Collection::Annotations,
        Collection::Categories,
    ];

    /// The JSON key holding this collection.
    pub fn key(self) -> &'static str {
        match self {
            Collection::Images => "images",
            Collection::Annotations => "annotations",
            Collection::Categories => "categories",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Which foreign key of an annotation failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReferenceKind {
    Image,
    Category,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Image => f.write_str("image_id"),
            ReferenceKind::Category => f.write_str("category_id"),
        }
    }
}

/// Image metadata carried into every export row of that image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageMeta {
    pub id: ImageId,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub coco_url: String,
}

impl ImageMeta {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
        coco_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
            coco_url: coco_url.into(),
        }
    }
}

/// A category label.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One object annotation, reduced to its two foreign keys and its box.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub image_id: ImageId,
    pub category_id: CategoryId,

    /// COCO bbox: `[x, y, width, height]`, `(x, y)` being the top-left corner.
    pub bbox: [f64; 4],
}

impl Annotation {
    pub fn new(
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: [f64; 4],
    ) -> Self {
        Self {
            image_id: image_id.into(),
            category_id: category_id.into(),
            bbox,
        }
    }
}

/// The three keyed collections produced by the extractor.
///
/// Images and categories are keyed by their unique identifiers. Annotations
/// keep input order; their `image_id` is a non-unique key, so several
/// entries may point at the same image.
#[derive(Clone, Debug, Default)]
pub struct Entities {
    pub images: BTreeMap<ImageId, ImageMeta>,
    pub categories: BTreeMap<CategoryId, Category>,
    pub annotations: Vec<Annotation>,
}
