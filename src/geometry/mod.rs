//! Geometry engine: box encodings and segmentation encodings.
//!
//! Everything here is a pure function over plain numeric data. Boxes are
//! `&[f64]` slices interpreted per [`BoxType`](crate::types::BoxType);
//! regions are a [`Segmentation`] in polygon, mask or RLE form.

mod bbox;
mod mask;
pub(crate) mod polygon;
mod rle;
mod segmentation;
mod size;

pub(crate) use bbox::Xywh;
pub use bbox::{convert_box, get_box_area};
pub use mask::Mask;
pub use rle::Rle;
pub use segmentation::{
    convert_segmentation, get_segmentation_area, get_segmentation_box, Segmentation,
};
pub use size::ImageSize;

/// Polygon rings, each a flat `[x0, y0, x1, y1, ...]` list.
pub type Polygons = Vec<Vec<f64>>;
