//! Axis-aligned box conversions between XYXY, XYWH and CXCYWH.
//!
//! Every conversion goes through the canonical XYWH encoding:
//! the source is normalized to `(x, y, w, h)`, checked for a positive
//! width and height, then projected to the destination encoding.

use crate::error::GeometryError;
use crate::types::BoxType;

/// A box in canonical XYWH form. Only constructed through [`Xywh::parse`],
/// so `w` and `h` are always positive and finite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Xywh {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Xywh {
    /// Normalizes `values` interpreted as `box_type` into XYWH.
    pub(crate) fn parse(values: &[f64], box_type: BoxType) -> Result<Self, GeometryError> {
        let [a, b, c, d] = check_arity(values)?;

        let (x, y, w, h) = match box_type {
            BoxType::Xyxy => (a, b, c - a, d - b),
            BoxType::Xywh => (a, b, c, d),
            BoxType::Cxcywh => (a - c / 2.0, b - d / 2.0, c, d),
        };

        if !(w > 0.0 && h > 0.0 && w.is_finite() && h.is_finite()) {
            return Err(GeometryError::DegenerateBox {
                width: w,
                height: h,
            });
        }

        Ok(Self { x, y, w, h })
    }

    /// Projects this box into `box_type`.
    pub(crate) fn project(&self, box_type: BoxType) -> [f64; 4] {
        match box_type {
            BoxType::Xyxy => [self.x, self.y, self.x + self.w, self.y + self.h],
            BoxType::Xywh => [self.x, self.y, self.w, self.h],
            BoxType::Cxcywh => [
                self.x + self.w / 2.0,
                self.y + self.h / 2.0,
                self.w,
                self.h,
            ],
        }
    }

    #[inline]
    pub(crate) fn area(&self) -> f64 {
        self.w * self.h
    }
}

fn check_arity(values: &[f64]) -> Result<[f64; 4], GeometryError> {
    let coords: [f64; 4] = values
        .try_into()
        .map_err(|_| GeometryError::BoxArity { len: values.len() })?;

    if let Some((index, value)) = coords.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        return Err(GeometryError::NonFinite {
            index,
            value: *value,
        });
    }

    Ok(coords)
}

/// Converts a box from `src` encoding to `dst` encoding.
///
/// # Errors
/// Returns [`GeometryError`] if `bbox` does not hold exactly four finite
/// numbers, or if its width or height is not positive.
///
/// # Example
/// ```
/// use waffle_dough::geometry::convert_box;
/// use waffle_dough::types::BoxType;
///
/// let cxcywh = convert_box(&[0.0, 0.0, 100.0, 100.0], BoxType::Xyxy, BoxType::Cxcywh)?;
/// assert_eq!(cxcywh, [50.0, 50.0, 100.0, 100.0]);
/// # Ok::<(), waffle_dough::error::GeometryError>(())
/// ```
pub fn convert_box(bbox: &[f64], src: BoxType, dst: BoxType) -> Result<[f64; 4], GeometryError> {
    let xywh = Xywh::parse(bbox, src)?;
    tracing::trace!(src = %src, dst = %dst, "convert box");
    Ok(xywh.project(dst))
}

/// Returns the area (`w * h`) of a box given in `box_type` encoding.
pub fn get_box_area(bbox: &[f64], box_type: BoxType) -> Result<f64, GeometryError> {
    Ok(Xywh::parse(bbox, box_type)?.area())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE_XYXY: [f64; 4] = [0.0, 0.0, 100.0, 100.0];

    #[test]
    fn test_xyxy_to_every_encoding() {
        assert_eq!(
            convert_box(&SQUARE_XYXY, BoxType::Xyxy, BoxType::Xyxy).unwrap(),
            [0.0, 0.0, 100.0, 100.0]
        );
        assert_eq!(
            convert_box(&SQUARE_XYXY, BoxType::Xyxy, BoxType::Xywh).unwrap(),
            [0.0, 0.0, 100.0, 100.0]
        );
        assert_eq!(
            convert_box(&SQUARE_XYXY, BoxType::Xyxy, BoxType::Cxcywh).unwrap(),
            [50.0, 50.0, 100.0, 100.0]
        );
    }

    #[test]
    fn test_cxcywh_to_xywh() {
        let bbox = [50.0, 50.0, 100.0, 100.0];
        assert_eq!(
            convert_box(&bbox, BoxType::Cxcywh, BoxType::Xywh).unwrap(),
            [0.0, 0.0, 100.0, 100.0]
        );
        assert_eq!(
            convert_box(&bbox, BoxType::Cxcywh, BoxType::Xyxy).unwrap(),
            [0.0, 0.0, 100.0, 100.0]
        );
    }

    #[test]
    fn test_box_dimensions() {
        let bbox = [10.0, 20.0, 100.0, 80.0];
        assert_eq!(
            convert_box(&bbox, BoxType::Xyxy, BoxType::Xywh).unwrap(),
            [10.0, 20.0, 90.0, 60.0]
        );
        assert_eq!(get_box_area(&bbox, BoxType::Xyxy).unwrap(), 5400.0);
    }

    #[test]
    fn test_area_is_independent_of_encoding() {
        assert_eq!(get_box_area(&SQUARE_XYXY, BoxType::Xyxy).unwrap(), 10000.0);
        assert_eq!(get_box_area(&SQUARE_XYXY, BoxType::Xywh).unwrap(), 10000.0);
        assert_eq!(
            get_box_area(&[50.0, 50.0, 100.0, 100.0], BoxType::Cxcywh).unwrap(),
            10000.0
        );
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        assert_eq!(
            convert_box(&[0.0, 0.0, 1.0], BoxType::Xywh, BoxType::Xyxy),
            Err(GeometryError::BoxArity { len: 3 })
        );
        assert_eq!(
            get_box_area(&[0.0, 0.0, 1.0, 1.0, 1.0], BoxType::Xywh),
            Err(GeometryError::BoxArity { len: 5 })
        );
    }

    #[test]
    fn test_degenerate_box_is_rejected() {
        // xmax < xmin
        let err = convert_box(&[100.0, 20.0, 10.0, 200.0], BoxType::Xyxy, BoxType::Xywh);
        assert!(matches!(err, Err(GeometryError::DegenerateBox { .. })));

        let err = get_box_area(&[0.0, 0.0, 0.0, 10.0], BoxType::Xywh);
        assert!(matches!(err, Err(GeometryError::DegenerateBox { .. })));
    }

    #[test]
    fn test_non_finite_is_rejected() {
        let err = convert_box(&[f64::NAN, 0.0, 1.0, 1.0], BoxType::Xywh, BoxType::Xyxy);
        assert!(matches!(err, Err(GeometryError::NonFinite { index: 0, .. })));

        let err = get_box_area(&[0.0, 0.0, f64::INFINITY, 1.0], BoxType::Xywh);
        assert!(matches!(err, Err(GeometryError::NonFinite { index: 2, .. })));
    }

    #[test]
    fn test_xywh_roundtrip() {
        let original = [15.0, 25.0, 50.0, 30.0];
        let xyxy = convert_box(&original, BoxType::Xywh, BoxType::Xyxy).unwrap();
        let restored = convert_box(&xyxy, BoxType::Xyxy, BoxType::Xywh).unwrap();
        assert_eq!(original, restored);
    }
}
