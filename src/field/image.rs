//! Image records. Images are shared by every task and always use the
//! `agnostic` task name.

use std::path::Path;

use tracing::debug;

use super::dict::{Dict, DictReader, DictWriter};
use super::ids::RecordId;
use super::{require_non_empty, RecordKind};
use crate::error::FieldError;
use crate::types::{SplitType, AGNOSTIC_TASK};

/// Raw inputs for an image.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImageFields {
    pub file_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Name the file had before any renaming. Defaults to `file_name`.
    pub original_file_name: Option<String>,
    pub date_captured: Option<String>,
    pub split: Option<SplitType>,
    pub labeled: Option<bool>,
}

/// A validated image.
#[derive(Clone, Debug)]
pub struct ImageInfo {
    id: RecordId,
    file_name: String,
    width: u32,
    height: u32,
    original_file_name: String,
    ext: Option<String>,
    date_captured: Option<String>,
    split: SplitType,
    labeled: bool,
}

impl ImageInfo {
    pub const REQUIRED_FIELDS: &'static [&'static str] = &["file_name", "width", "height"];

    /// Builds an image record.
    ///
    /// # Errors
    /// [`FieldError::MissingField`] without `file_name`, `width` or `height`;
    /// [`FieldError::FieldValidation`] for an empty file name or a zero
    /// dimension.
    pub fn new(fields: ImageFields) -> Result<Self, FieldError> {
        Self::build(RecordId::generate(), fields)
    }

    pub fn agnostic(
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Result<Self, FieldError> {
        Self::new(ImageFields {
            file_name: Some(file_name.into()),
            width: Some(width),
            height: Some(height),
            ..Default::default()
        })
    }

    fn build(id: RecordId, fields: ImageFields) -> Result<Self, FieldError> {
        let missing = |field| FieldError::missing(RecordKind::Image, AGNOSTIC_TASK, field);
        let file_name = fields.file_name.ok_or_else(|| missing("file_name"))?;
        let width = fields.width.ok_or_else(|| missing("width"))?;
        let height = fields.height.ok_or_else(|| missing("height"))?;

        require_non_empty("file_name", Some(&file_name))?;
        require_non_empty("original_file_name", fields.original_file_name.as_deref())?;
        if width == 0 {
            return Err(FieldError::invalid("width", "must be positive"));
        }
        if height == 0 {
            return Err(FieldError::invalid("height", "must be positive"));
        }

        let original_file_name = fields
            .original_file_name
            .unwrap_or_else(|| file_name.clone());
        let ext = extension(&original_file_name);
        debug!(file_name = %file_name, ext = ?ext, "derived image extension");

        Ok(Self {
            id,
            file_name,
            width,
            height,
            original_file_name,
            ext,
            date_captured: fields.date_captured,
            split: fields.split.unwrap_or_default(),
            labeled: fields.labeled.unwrap_or(false),
        })
    }

    /// Returns a new image with every `Some` attribute of `overrides`
    /// replacing the current one. The id is kept and `ext` follows
    /// `original_file_name`.
    pub fn update(&self, overrides: ImageFields) -> Result<Self, FieldError> {
        let current = self.to_fields();
        let merged = ImageFields {
            file_name: overrides.file_name.or(current.file_name),
            width: overrides.width.or(current.width),
            height: overrides.height.or(current.height),
            original_file_name: overrides.original_file_name.or(current.original_file_name),
            date_captured: overrides.date_captured.or(current.date_captured),
            split: overrides.split.or(current.split),
            labeled: overrides.labeled.or(current.labeled),
        };
        Self::build(self.id.clone(), merged)
    }

    pub fn to_fields(&self) -> ImageFields {
        ImageFields {
            file_name: Some(self.file_name.clone()),
            width: Some(self.width),
            height: Some(self.height),
            original_file_name: Some(self.original_file_name.clone()),
            date_captured: self.date_captured.clone(),
            split: Some(self.split),
            labeled: Some(self.labeled),
        }
    }

    pub fn to_dict(&self) -> Dict {
        let mut dict = DictWriter::new(&self.id, AGNOSTIC_TASK);
        dict.put("file_name", self.file_name.as_str());
        dict.put("width", self.width);
        dict.put("height", self.height);
        dict.put("original_file_name", self.original_file_name.as_str());
        dict.put_opt("ext", self.ext.as_deref());
        dict.put_opt("date_captured", self.date_captured.as_deref());
        dict.put("split", self.split.as_str());
        dict.put("labeled", self.labeled);
        dict.finish()
    }

    /// Rebuilds an image from its dict form. A `task` key, if present, must
    /// be `agnostic`; `ext` is recomputed.
    pub fn from_dict(dict: &Dict) -> Result<Self, FieldError> {
        let reader = DictReader::new(dict);
        if let Some(task) = reader.string("task")? {
            if !task.trim().eq_ignore_ascii_case(AGNOSTIC_TASK) {
                return Err(FieldError::invalid(
                    "task",
                    format!("image records use '{AGNOSTIC_TASK}', got '{task}'"),
                ));
            }
        }

        let fields = ImageFields {
            file_name: reader.string("file_name")?,
            width: reader.u32("width")?,
            height: reader.u32("height")?,
            original_file_name: reader.string("original_file_name")?,
            date_captured: reader.string("date_captured")?,
            split: reader.parsed("split")?,
            labeled: reader.bool("labeled")?,
        };
        Self::build(reader.id()?, fields)
    }

    #[inline]
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Always [`AGNOSTIC_TASK`].
    pub fn task(&self) -> &'static str {
        AGNOSTIC_TASK
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn original_file_name(&self) -> &str {
        &self.original_file_name
    }

    /// Extension of `original_file_name` with its leading dot, e.g. `".jpg"`.
    pub fn ext(&self) -> Option<&str> {
        self.ext.as_deref()
    }

    pub fn date_captured(&self) -> Option<&str> {
        self.date_captured.as_deref()
    }

    pub fn split(&self) -> SplitType {
        self.split
    }

    pub fn labeled(&self) -> bool {
        self.labeled
    }
}

impl PartialEq for ImageInfo {
    fn eq(&self, other: &Self) -> bool {
        self.file_name == other.file_name
            && self.width == other.width
            && self.height == other.height
            && self.original_file_name == other.original_file_name
            && self.ext == other.ext
            && self.date_captured == other.date_captured
            && self.split == other.split
            && self.labeled == other.labeled
    }
}

impl Eq for ImageInfo {}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
}
