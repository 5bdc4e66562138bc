//! Relational join: annotation -> category label, annotation -> image metadata.
//!
//! Both lookups are inner joins on a unique key. An annotation whose
//! `category_id` or `image_id` is not present aborts the payload with
//! [`Coco2CsvError::UnresolvedReference`]; nothing is dropped silently.

use crate::coco::{Annotation, Entities, ImageMeta, ReferenceKind};
use crate::error::Coco2CsvError;

/// One annotation with both foreign keys resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinedAnnotation<'a> {
    pub label: &'a str,
    pub image: &'a ImageMeta,

    /// The untouched COCO `[x, y, width, height]` box.
    pub bbox: [f64; 4],
}

/// Resolves every annotation against the category and image tables.
///
/// Returns exactly one row per annotation, in input order. Annotations that
/// share an image each keep their own row.
pub fn join_annotations(entities: &Entities) -> Result<Vec<JoinedAnnotation<'_>>, Coco2CsvError> {
    entities
        .annotations
        .iter()
        .enumerate()
        .map(|(index, ann)| join_one(entities, index, ann))
        .collect()
}

fn join_one<'a>(
    entities: &'a Entities,
    annotation_index: usize,
    ann: &Annotation,
) -> Result<JoinedAnnotation<'a>, Coco2CsvError> {
    let category = entities.categories.get(&ann.category_id).ok_or(
        Coco2CsvError::UnresolvedReference {
            annotation_index,
            reference: ReferenceKind::Category,
            id: ann.category_id.as_u64(),
        },
    )?;

    let image =
        entities
            .images
            .get(&ann.image_id)
            .ok_or(Coco2CsvError::UnresolvedReference {
                annotation_index,
                reference: ReferenceKind::Image,
                id: ann.image_id.as_u64(),
            })?;

    Ok(JoinedAnnotation {
        label: &category.name,
        image,
        bbox: ann.bbox,
    })
}
