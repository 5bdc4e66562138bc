//! Geometry normalization: COCO `[x, y, width, height]` boxes to corner form.

/// A bounding box as four corner coordinates, in the export's column order.
///
/// The corner arithmetic follows the exported layout convention:
///
/// - `x_min = x`
/// - `y_min = y - height`
/// - `x_max = x + width`
/// - `y_max = y`
///
/// Note that `y_min` is `y - height`, not `y + height`. Downstream consumers
/// of the CSV depend on these exact values, so the names are labels for the
/// columns rather than an ordering guarantee. Negative extents are carried
/// through unchanged.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Corners {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Corners {
    /// Converts a COCO `[x, y, width, height]` box.
    #[inline]
    pub fn from_coco_bbox(bbox: [f64; 4]) -> Self {
        let [x, y, width, height] = bbox;
        Self {
            x_min: x,
            y_min: y - height,
            x_max: x + width,
            y_max: y,
        }
    }

    /// Returns the corners as `[x_min, y_min, x_max, y_max]`.
    #[inline]
    pub fn to_array(self) -> [f64; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}
