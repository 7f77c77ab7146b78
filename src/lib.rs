//! Waffle Dough: annotation records and interchangeable region geometry.
//!
//! The crate has two layers. The geometry layer converts axis-aligned
//! boxes between XYXY, XYWH and CXCYWH, and regions between polygon,
//! raster-mask and run-length encodings, deriving area and bounding box
//! from any of them. The field layer builds validated, task-aware
//! annotation, category and image records on top of it and fills in
//! whatever can be derived (box from segmentation, area from geometry,
//! prediction flag from score, extension from file name).
//!
//! # Modules
//!
//! - [`geometry`]: box and segmentation conversions
//! - [`field`]: annotation, category and image records
//! - [`types`]: task, split, box and segmentation enumerations
//! - [`error`]: error types
//!
//! # Example
//!
//! ```
//! use waffle_dough::field::AnnotationInfo;
//!
//! let ann = AnnotationInfo::object_detection("img-1", "cat-1", &[0.0, 0.0, 1.0, 1.0])?;
//! assert_eq!(ann.area(), Some(1.0));
//! assert_eq!(ann.iscrowd(), Some(0));
//! assert!(!ann.is_prediction());
//! # Ok::<(), waffle_dough::error::FieldError>(())
//! ```
//!
//! Nothing here performs I/O. Records serialize to a flat
//! `serde_json::Map` through `to_dict`/`from_dict`, which persistence and
//! import/export layers build on.

pub mod error;
pub mod field;
pub mod geometry;
pub mod types;

pub use error::{DoughError, FieldError, GeometryError};
