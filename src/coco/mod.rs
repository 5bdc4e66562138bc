//! COCO input side: identifiers, normalized entity records, and the
//! extractor that builds them from a parsed JSON document.
//!
//! The extractor works on a [`serde_json::Value`] rather than a derived
//! schema so that a missing collection or field can be reported by name.
//!
//! # Example
//!
//! ```
//! use coco2csv::coco::{extract_entities, ImageId};
//!
//! let doc = serde_json::json!({
//!     "images": [{"id": 1, "file_name": "a.jpg", "width": 100, "height": 200,
//!                 "coco_url": "http://x/a.jpg"}],
//!     "annotations": [{"image_id": 1, "category_id": 7, "bbox": [0, 0, 10, 10]}],
//!     "categories": [{"id": 7, "name": "person"}]
//! });
//!
//! let entities = extract_entities(&doc)?;
//! assert_eq!(entities.images[&ImageId::new(1)].file_name, "a.jpg");
//! # Ok::<(), coco2csv::Coco2CsvError>(())
//! ```

mod extract;
mod ids;
mod model;

pub use extract::extract_entities;
pub use ids::{CategoryId, ImageId};
pub use model::{Annotation, Category, Collection, Entities, ImageMeta, ReferenceKind};
