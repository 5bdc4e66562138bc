//! Entity extraction: COCO JSON document -> keyed entity collections.

use std::collections::BTreeMap;

use log::debug;
use serde_json::{Map, Value};

use super::model::{Annotation, Category, Collection, Entities, ImageMeta};
use super::{CategoryId, ImageId};
use crate::error::Coco2CsvError;

/// Builds the keyed [`Entities`] from a parsed COCO document.
///
/// All three of `images`, `annotations` and `categories` must be present
/// as arrays. Each record must carry the fields the export needs:
///
/// - images: `id`, `file_name`, `width`, `height`, `coco_url`
/// - annotations: `image_id`, `category_id`, `bbox` (4 numbers)
/// - categories: `id`, `name`
///
/// Extra fields are ignored.
///
/// # Errors
/// - [`Coco2CsvError::MissingCollection`] / [`Coco2CsvError::InvalidCollection`]
///   when a top-level collection is absent or not an array
/// - [`Coco2CsvError::MissingField`] / [`Coco2CsvError::InvalidField`] when a
///   record lacks a required field or holds the wrong type
/// - [`Coco2CsvError::DuplicateId`] when an image or category id repeats
pub fn extract_entities(doc: &Value) -> Result<Entities, Coco2CsvError> {
    let [images, annotations, categories] = Collection::ALL.map(|c| collection(doc, c));
    let (raw_images, raw_annotations, raw_categories) = (images?, annotations?, categories?);

    let mut images = BTreeMap::new();
    for (index, value) in raw_images.iter().enumerate() {
        let record = Record::new(Collection::Images, index, value)?;
        let image = ImageMeta {
            id: ImageId::new(record.id("id")?),
            file_name: record.string("file_name")?,
            width: record.dimension("width")?,
            height: record.dimension("height")?,
            coco_url: record.string("coco_url")?,
        };
        let id = image.id;
        if images.insert(id, image).is_some() {
            return Err(Coco2CsvError::DuplicateId {
                collection: Collection::Images,
                id: id.as_u64(),
            });
        }
    }

    let mut categories = BTreeMap::new();
    for (index, value) in raw_categories.iter().enumerate() {
        let record = Record::new(Collection::Categories, index, value)?;
        let category = Category {
            id: CategoryId::new(record.id("id")?),
            name: record.string("name")?,
        };
        let id = category.id;
        if categories.insert(id, category).is_some() {
            return Err(Coco2CsvError::DuplicateId {
                collection: Collection::Categories,
                id: id.as_u64(),
            });
        }
    }

    let annotations = raw_annotations
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let record = Record::new(Collection::Annotations, index, value)?;
            Ok(Annotation {
                image_id: ImageId::new(record.id("image_id")?),
                category_id: CategoryId::new(record.id("category_id")?),
                bbox: record.bbox("bbox")?,
            })
        })
        .collect::<Result<Vec<_>, Coco2CsvError>>()?;

    debug!(
        "extracted {} images, {} categories, {} annotations",
        images.len(),
        categories.len(),
        annotations.len()
    );

    Ok(Entities {
        images,
        categories,
        annotations,
    })
}

fn collection(doc: &Value, collection: Collection) -> Result<&[Value], Coco2CsvError> {
    let key = collection.key();
    doc.get(key)
        .ok_or(Coco2CsvError::MissingCollection { key })?
        .as_array()
        .map(Vec::as_slice)
        .ok_or(Coco2CsvError::InvalidCollection { key })
}

/// Typed field access on one JSON record, with errors naming the field.
struct Record<'a> {
    collection: Collection,
    index: usize,
    fields: &'a Map<String, Value>,
}

impl<'a> Record<'a> {
    fn new(collection: Collection, index: usize, value: &'a Value) -> Result<Self, Coco2CsvError> {
        let fields = value.as_object().ok_or(Coco2CsvError::InvalidField {
            collection,
            index,
            field: "(record)",
            expected: "an object",
        })?;
        Ok(Self {
            collection,
            index,
            fields,
        })
    }

    fn get(&self, field: &'static str) -> Result<&'a Value, Coco2CsvError> {
        self.fields.get(field).ok_or(Coco2CsvError::MissingField {
            collection: self.collection,
            index: self.index,
            field,
        })
    }

    fn invalid(&self, field: &'static str, expected: &'static str) -> Coco2CsvError {
        Coco2CsvError::InvalidField {
            collection: self.collection,
            index: self.index,
            field,
            expected,
        }
    }

    fn id(&self, field: &'static str) -> Result<u64, Coco2CsvError> {
        self.get(field)?
            .as_u64()
            .ok_or_else(|| self.invalid(field, "a non-negative integer"))
    }

    fn dimension(&self, field: &'static str) -> Result<u32, Coco2CsvError> {
        self.get(field)?
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .filter(|&v| v > 0)
            .ok_or_else(|| self.invalid(field, "a positive pixel dimension"))
    }

    fn string(&self, field: &'static str) -> Result<String, Coco2CsvError> {
        self.get(field)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.invalid(field, "a string"))
    }

    fn bbox(&self, field: &'static str) -> Result<[f64; 4], Coco2CsvError> {
        let values = self
            .get(field)?
            .as_array()
            .filter(|values| values.len() == 4)
            .ok_or_else(|| self.invalid(field, "an array of 4 numbers"))?;

        let mut bbox = [0.0; 4];
        for (slot, value) in bbox.iter_mut().zip(values) {
            *slot = value
                .as_f64()
                .ok_or_else(|| self.invalid(field, "an array of 4 numbers"))?;
        }
        Ok(bbox)
    }
}
