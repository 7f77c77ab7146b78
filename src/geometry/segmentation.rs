//! Conversions between polygon, mask and RLE segmentations, plus the
//! area and bounding box of each.
//!
//! Polygon and RLE convert through a [`Mask`]. Area and box are computed
//! directly on each encoding and agree for the same region: a traced
//! polygon has its vertices on pixel corners, so its shoelace area equals
//! the pixel count of the mask it came from.

use serde_json::Value;

use super::mask::Mask;
use super::polygon;
use super::rle::{self, Rle};
use super::size::ImageSize;
use super::Polygons;
use crate::error::GeometryError;
use crate::types::SegmentationType;

/// A region in one of the three supported encodings.
#[derive(Clone, Debug, PartialEq)]
pub enum Segmentation {
    Polygon(Polygons),
    Mask(Mask),
    Rle(Rle),
}

impl Segmentation {
    /// The encoding this value is in.
    pub fn kind(&self) -> SegmentationType {
        match self {
            Segmentation::Polygon(_) => SegmentationType::Polygon,
            Segmentation::Mask(_) => SegmentationType::Mask,
            Segmentation::Rle(_) => SegmentationType::Rle,
        }
    }

    /// Image size carried by raster encodings.
    pub fn image_size(&self) -> Option<ImageSize> {
        match self {
            Segmentation::Polygon(_) => None,
            Segmentation::Mask(mask) => Some(mask.size()),
            Segmentation::Rle(rle) => Some(rle.image_size()),
        }
    }

    pub fn as_polygons(&self) -> Option<&Polygons> {
        match self {
            Segmentation::Polygon(rings) => Some(rings),
            _ => None,
        }
    }

    /// Checks ring shapes or the RLE run total.
    pub fn validate(&self) -> Result<(), GeometryError> {
        match self {
            Segmentation::Polygon(rings) => polygon::validate(rings),
            Segmentation::Mask(_) => Ok(()),
            Segmentation::Rle(rle) => rle.validate(),
        }
    }

    /// Validates and returns polygon rings, tracing raster encodings.
    pub fn into_polygons(self) -> Result<Polygons, GeometryError> {
        match self {
            Segmentation::Polygon(rings) => {
                polygon::validate(&rings)?;
                Ok(rings)
            }
            Segmentation::Mask(mask) => Ok(mask.to_polygons()),
            Segmentation::Rle(rle) => Ok(rle.decode()?.to_polygons()),
        }
    }

    /// Parses the JSON form: an array of rings, or an RLE mapping.
    pub fn from_value(value: &Value) -> Result<Self, GeometryError> {
        match value {
            Value::Object(_) => Rle::from_value(value).map(Segmentation::Rle),
            Value::Array(rings) => {
                let rings = rings
                    .iter()
                    .enumerate()
                    .map(|(ring_idx, ring)| parse_ring(ring_idx, ring))
                    .collect::<Result<Polygons, _>>()?;
                polygon::validate(&rings)?;
                Ok(Segmentation::Polygon(rings))
            }
            other => Err(GeometryError::SegmentationShape {
                found: rle::json_kind(other),
            }),
        }
    }

    /// JSON form. Masks have no JSON form of their own and are written as RLE.
    pub fn to_value(&self) -> Value {
        match self {
            Segmentation::Polygon(rings) => serde_json::json!(rings),
            Segmentation::Mask(mask) => Rle::encode(mask).to_value(),
            Segmentation::Rle(rle) => rle.to_value(),
        }
    }
}

impl From<Polygons> for Segmentation {
    fn from(rings: Polygons) -> Self {
        Segmentation::Polygon(rings)
    }
}

impl From<Mask> for Segmentation {
    fn from(mask: Mask) -> Self {
        Segmentation::Mask(mask)
    }
}

impl From<Rle> for Segmentation {
    fn from(rle: Rle) -> Self {
        Segmentation::Rle(rle)
    }
}

fn parse_ring(ring_idx: usize, ring: &Value) -> Result<Vec<f64>, GeometryError> {
    let values = ring.as_array().ok_or_else(|| GeometryError::RingMalformed {
        ring: ring_idx,
        message: format!("expected an array of numbers, got {}", rle::json_kind(ring)),
    })?;
    values
        .iter()
        .enumerate()
        .map(|(index, v)| {
            v.as_f64().ok_or_else(|| GeometryError::RingMalformed {
                ring: ring_idx,
                message: format!("value {index} is {}, not a number", rle::json_kind(v)),
            })
        })
        .collect()
}

/// Picks the raster size for a conversion: the one carried by `seg`, checked
/// against `given` when both exist.
fn resolve_size(
    seg: &Segmentation,
    given: Option<ImageSize>,
) -> Result<Option<ImageSize>, GeometryError> {
    match (seg.image_size(), given) {
        (Some(own), Some(given)) if own != given => Err(GeometryError::SizeMismatch {
            given_height: given.height,
            given_width: given.width,
            height: own.height,
            width: own.width,
        }),
        (Some(own), _) => Ok(Some(own)),
        (None, given) => Ok(given),
    }
}

fn rasterize(seg: &Segmentation, size: Option<ImageSize>) -> Result<Mask, GeometryError> {
    match seg {
        Segmentation::Polygon(rings) => {
            let size = size.ok_or(GeometryError::MissingImageSize)?;
            Ok(polygon::to_mask(rings, size))
        }
        Segmentation::Mask(mask) => Ok(mask.clone()),
        Segmentation::Rle(rle) => rle.decode(),
    }
}

/// Converts `seg` into the `dst` encoding.
///
/// `image_size` is needed to rasterize a polygon. Masks and RLEs carry
/// their own size; if `image_size` is also given it must match.
///
/// # Errors
/// Malformed rings, an RLE whose runs do not cover `H * W` pixels, a missing
/// or conflicting image size.
///
/// # Example
/// ```
/// use waffle_dough::geometry::{convert_segmentation, ImageSize, Segmentation};
/// use waffle_dough::types::SegmentationType;
///
/// let square = Segmentation::Polygon(vec![vec![0., 0., 100., 0., 100., 100., 0., 100.]]);
/// let rle = convert_segmentation(&square, SegmentationType::Rle, Some(ImageSize::new(100, 100)))?;
/// let Segmentation::Rle(rle) = rle else { unreachable!() };
/// assert_eq!(rle.counts, vec![0, 10000]);
/// # Ok::<(), waffle_dough::error::GeometryError>(())
/// ```
pub fn convert_segmentation(
    seg: &Segmentation,
    dst: SegmentationType,
    image_size: Option<ImageSize>,
) -> Result<Segmentation, GeometryError> {
    seg.validate()?;
    let size = resolve_size(seg, image_size)?;
    tracing::trace!(src = %seg.kind(), dst = %dst, size = ?size, "convert segmentation");

    let converted = match (seg, dst) {
        (Segmentation::Polygon(_), SegmentationType::Polygon)
        | (Segmentation::Mask(_), SegmentationType::Mask)
        | (Segmentation::Rle(_), SegmentationType::Rle) => seg.clone(),

        (_, SegmentationType::Mask) => Segmentation::Mask(rasterize(seg, size)?),
        (_, SegmentationType::Rle) => Segmentation::Rle(Rle::encode(&rasterize(seg, size)?)),
        (_, SegmentationType::Polygon) => Segmentation::Polygon(seg.clone().into_polygons()?),
    };
    Ok(converted)
}

/// Area of the region: shoelace sum over polygon rings, or the foreground
/// pixel count of a mask or RLE.
pub fn get_segmentation_area(seg: &Segmentation) -> Result<f64, GeometryError> {
    seg.validate()?;
    Ok(match seg {
        Segmentation::Polygon(rings) => polygon::area(rings),
        Segmentation::Mask(mask) => mask.area() as f64,
        Segmentation::Rle(rle) => rle.area() as f64,
    })
}

/// Minimal XYWH box covering every polygon vertex or foreground pixel.
///
/// # Errors
/// [`GeometryError::EmptyRegion`] when there is nothing to cover.
pub fn get_segmentation_box(seg: &Segmentation) -> Result<[f64; 4], GeometryError> {
    seg.validate()?;
    let bounds = match seg {
        Segmentation::Polygon(rings) => polygon::bounds(rings),
        Segmentation::Mask(mask) => mask.bounds(),
        Segmentation::Rle(rle) => rle.bounds(),
    };
    bounds.ok_or(GeometryError::EmptyRegion)
}
