//! Validated annotation, category and image records.
//!
//! Records are built in one step from an input struct
//! ([`AnnotationFields`], [`CategoryFields`], [`ImageFields`]): required
//! attributes for the task are checked, constraints validated, derivable
//! attributes filled in, and an immutable record comes out. Changing a
//! record means calling `update`, which returns a new validated record with
//! the same id.
//!
//! Every record converts to and from a flat [`Dict`]. Equality compares all
//! attributes except the id.

mod annotation;
mod category;
mod dict;
mod ids;
mod image;

pub use annotation::{AnnotationFields, AnnotationInfo};
pub use category::{CategoryFields, CategoryInfo, DEFAULT_SUPERCATEGORY};
pub use dict::Dict;
pub use ids::RecordId;
pub use image::{ImageFields, ImageInfo};

use std::fmt;

use crate::error::FieldError;

/// Which kind of record an error or operation refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Annotation,
    Category,
    Image,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Annotation => "annotation",
            RecordKind::Category => "category",
            RecordKind::Image => "image",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejects an empty string supplied for `field`.
pub(crate) fn require_non_empty(
    field: &'static str,
    value: Option<&str>,
) -> Result<(), FieldError> {
    match value {
        Some(v) if v.trim().is_empty() => Err(FieldError::invalid(field, "must not be empty")),
        _ => Ok(()),
    }
}

/// Rejects NaN and infinities supplied for `field`.
pub(crate) fn require_finite(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), FieldError> {
    match value {
        Some(v) if !v.is_finite() => {
            Err(FieldError::invalid(field, format!("must be finite, got {v}")))
        }
        _ => Ok(()),
    }
}
