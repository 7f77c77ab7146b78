use thiserror::Error;

use crate::field::RecordKind;

/// Malformed or degenerate geometric input.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("A box needs exactly 4 numbers, got {len}")]
    BoxArity { len: usize },

    #[error("Degenerate box: width {width} and height {height} must both be positive and finite")]
    DegenerateBox { width: f64, height: f64 },

    #[error("Non-finite coordinate {value} at index {index}")]
    NonFinite { index: usize, value: f64 },

    #[error("Polygon ring {ring} has odd length {len}")]
    OddRingLength { ring: usize, len: usize },

    #[error("Polygon ring {ring} has {len} numbers (at least 6 are required)")]
    RingTooShort { ring: usize, len: usize },

    #[error("Polygon ring {ring} is malformed: {message}")]
    RingMalformed { ring: usize, message: String },

    #[error("A segmentation must be a list of rings or an RLE mapping, got {found}")]
    SegmentationShape { found: &'static str },

    #[error("RLE mapping is missing '{0}'")]
    RleMissingKey(&'static str),

    #[error("Malformed RLE '{key}': {message}")]
    RleMalformed { key: &'static str, message: String },

    #[error("RLE runs sum to {total}, expected {expected} ({height}x{width})")]
    RleRunTotal {
        total: u64,
        expected: u64,
        height: u32,
        width: u32,
    },

    #[error("Mask buffer holds {len} pixels, expected {height}x{width}")]
    MaskSize { len: usize, height: u32, width: u32 },

    #[error("Image size is required to rasterize a polygon")]
    MissingImageSize,

    #[error("Image size {given_height}x{given_width} does not match segmentation size {height}x{width}")]
    SizeMismatch {
        given_height: u32,
        given_width: u32,
        height: u32,
        width: u32,
    },

    #[error("Segmentation has no foreground")]
    EmptyRegion,
}

/// A task-required attribute was not supplied to a record factory.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Missing required field '{field}' for {task} {kind}")]
pub struct MissingFieldError {
    pub kind: RecordKind,
    pub task: String,
    pub field: &'static str,
}

/// A supplied attribute violates its value constraint.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Invalid '{field}': {reason}")]
pub struct FieldValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Errors produced while building a field record.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),

    #[error(transparent)]
    FieldValidation(#[from] FieldValidationError),
}

impl FieldError {
    pub(crate) fn missing(kind: RecordKind, task: &str, field: &'static str) -> Self {
        FieldError::MissingField(MissingFieldError {
            kind,
            task: task.to_string(),
            field,
        })
    }

    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        FieldError::FieldValidation(FieldValidationError::new(field, reason))
    }

    /// Wraps a geometry failure raised while normalizing or deriving `field`.
    pub(crate) fn geometry(field: &'static str, source: GeometryError) -> Self {
        Self::invalid(field, source.to_string())
    }

    /// Returns the name of the attribute this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::MissingField(e) => e.field,
            FieldError::FieldValidation(e) => e.field,
        }
    }
}

/// The main error type for waffle-dough operations.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DoughError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Field error: {0}")]
    Field(#[from] FieldError),
}
