//! Annotation records.
//!
//! Which attributes an annotation must carry depends on its task; see
//! [`AnnotationInfo::required_fields`]. Segmentations are always stored as
//! polygon rings and boxes always as XYWH.

use tracing::debug;

use super::dict::{Dict, DictReader, DictWriter};
use super::ids::RecordId;
use super::{require_finite, require_non_empty, RecordKind};
use crate::error::{FieldError, GeometryError};
use crate::geometry::{self, polygon, Polygons, Segmentation, Xywh};
use crate::types::{BoxType, TaskType};

/// Raw inputs for an annotation. Every attribute is optional here; which
/// ones must be set is decided by the task.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnnotationFields {
    pub image_id: Option<String>,
    pub category_id: Option<String>,
    pub bbox: Option<Vec<f64>>,
    /// Encoding of `bbox`. XYWH when unset.
    pub bbox_type: Option<BoxType>,
    /// Polygon, mask or RLE. Non-polygon input is traced into rings.
    pub segmentation: Option<Segmentation>,
    pub area: Option<f64>,
    /// Flat `(x, y, visibility)` triples.
    pub keypoints: Option<Vec<f64>>,
    pub num_keypoints: Option<u32>,
    pub caption: Option<String>,
    pub value: Option<f64>,
    pub iscrowd: Option<u8>,
    pub score: Option<f64>,
}

impl AnnotationFields {
    fn is_set(&self, field: &str) -> bool {
        match field {
            "image_id" => self.image_id.is_some(),
            "category_id" => self.category_id.is_some(),
            "bbox" => self.bbox.is_some(),
            "segmentation" => self.segmentation.is_some(),
            "keypoints" => self.keypoints.is_some(),
            "caption" => self.caption.is_some(),
            "value" => self.value.is_some(),
            _ => false,
        }
    }
}

/// A validated annotation.
#[derive(Clone, Debug)]
pub struct AnnotationInfo {
    id: RecordId,
    task: TaskType,
    image_id: String,
    category_id: Option<String>,
    bbox: Option<[f64; 4]>,
    segmentation: Option<Polygons>,
    area: Option<f64>,
    keypoints: Option<Vec<f64>>,
    num_keypoints: Option<u32>,
    caption: Option<String>,
    value: Option<f64>,
    iscrowd: Option<u8>,
    score: Option<f64>,
    is_prediction: bool,
}

impl AnnotationInfo {
    /// Attributes that must be supplied for `task`.
    pub fn required_fields(task: TaskType) -> &'static [&'static str] {
        match task {
            TaskType::Classification => &["image_id", "category_id"],
            TaskType::ObjectDetection => &["image_id", "category_id", "bbox"],
            TaskType::SemanticSegmentation | TaskType::InstanceSegmentation => {
                &["image_id", "category_id", "segmentation"]
            }
            TaskType::KeypointDetection => &["image_id", "category_id", "keypoints"],
            TaskType::TextRecognition => &["image_id", "caption"],
            TaskType::Regression => &["image_id", "category_id", "value"],
        }
    }

    /// Builds an annotation for any task, checking the required attributes
    /// at run time.
    ///
    /// # Errors
    /// [`FieldError::MissingField`] if a required attribute is absent,
    /// [`FieldError::FieldValidation`] if any supplied attribute is invalid.
    pub fn new(task: TaskType, fields: AnnotationFields) -> Result<Self, FieldError> {
        Self::build(RecordId::generate(), task, fields)
    }

    pub fn classification(
        image_id: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Result<Self, FieldError> {
        Self::new(
            TaskType::Classification,
            AnnotationFields {
                image_id: Some(image_id.into()),
                category_id: Some(category_id.into()),
                ..Default::default()
            },
        )
    }

    /// `bbox` is XYWH.
    pub fn object_detection(
        image_id: impl Into<String>,
        category_id: impl Into<String>,
        bbox: &[f64],
    ) -> Result<Self, FieldError> {
        Self::new(
            TaskType::ObjectDetection,
            AnnotationFields {
                image_id: Some(image_id.into()),
                category_id: Some(category_id.into()),
                bbox: Some(bbox.to_vec()),
                ..Default::default()
            },
        )
    }

    pub fn semantic_segmentation(
        image_id: impl Into<String>,
        category_id: impl Into<String>,
        segmentation: impl Into<Segmentation>,
    ) -> Result<Self, FieldError> {
        Self::segmentation_task(
            TaskType::SemanticSegmentation,
            image_id.into(),
            category_id.into(),
            segmentation.into(),
        )
    }

    pub fn instance_segmentation(
        image_id: impl Into<String>,
        category_id: impl Into<String>,
        segmentation: impl Into<Segmentation>,
    ) -> Result<Self, FieldError> {
        Self::segmentation_task(
            TaskType::InstanceSegmentation,
            image_id.into(),
            category_id.into(),
            segmentation.into(),
        )
    }

    fn segmentation_task(
        task: TaskType,
        image_id: String,
        category_id: String,
        segmentation: Segmentation,
    ) -> Result<Self, FieldError> {
        Self::new(
            task,
            AnnotationFields {
                image_id: Some(image_id),
                category_id: Some(category_id),
                segmentation: Some(segmentation),
                ..Default::default()
            },
        )
    }

    pub fn keypoint_detection(
        image_id: impl Into<String>,
        category_id: impl Into<String>,
        keypoints: Vec<f64>,
    ) -> Result<Self, FieldError> {
        Self::new(
            TaskType::KeypointDetection,
            AnnotationFields {
                image_id: Some(image_id.into()),
                category_id: Some(category_id.into()),
                keypoints: Some(keypoints),
                ..Default::default()
            },
        )
    }

    pub fn text_recognition(
        image_id: impl Into<String>,
        caption: impl Into<String>,
    ) -> Result<Self, FieldError> {
        Self::new(
            TaskType::TextRecognition,
            AnnotationFields {
                image_id: Some(image_id.into()),
                caption: Some(caption.into()),
                ..Default::default()
            },
        )
    }

    pub fn regression(
        image_id: impl Into<String>,
        category_id: impl Into<String>,
        value: f64,
    ) -> Result<Self, FieldError> {
        Self::new(
            TaskType::Regression,
            AnnotationFields {
                image_id: Some(image_id.into()),
                category_id: Some(category_id.into()),
                value: Some(value),
                ..Default::default()
            },
        )
    }

    fn build(id: RecordId, task: TaskType, fields: AnnotationFields) -> Result<Self, FieldError> {
        if let Some(&field) = Self::required_fields(task)
            .iter()
            .find(|field| !fields.is_set(field))
        {
            return Err(FieldError::missing(
                RecordKind::Annotation,
                task.as_str(),
                field,
            ));
        }

        let AnnotationFields {
            image_id,
            category_id,
            bbox,
            bbox_type,
            segmentation,
            area,
            keypoints,
            num_keypoints,
            caption,
            value,
            iscrowd,
            score,
        } = fields;

        let image_id = image_id
            .ok_or_else(|| FieldError::missing(RecordKind::Annotation, task.as_str(), "image_id"))?;
        require_non_empty("image_id", Some(&image_id))?;
        require_non_empty("category_id", category_id.as_deref())?;

        let bbox = bbox
            .map(|values| {
                geometry::convert_box(&values, bbox_type.unwrap_or(BoxType::Xywh), BoxType::Xywh)
                    .map_err(|e| FieldError::geometry("bbox", e))
            })
            .transpose()?;

        let segmentation = segmentation.map(normalize_segmentation).transpose()?;

        if let Some(points) = &keypoints {
            if points.len() % 3 != 0 {
                return Err(FieldError::invalid(
                    "keypoints",
                    format!("length {} is not a multiple of 3", points.len()),
                ));
            }
            if let Some(v) = points.iter().find(|v| !v.is_finite()) {
                return Err(FieldError::invalid(
                    "keypoints",
                    format!("must be finite, got {v}"),
                ));
            }
        }

        require_finite("area", area)?;
        if let Some(a) = area.filter(|a| *a < 0.0) {
            return Err(FieldError::invalid(
                "area",
                format!("must be non-negative, got {a}"),
            ));
        }
        require_finite("value", value)?;
        require_finite("score", score)?;
        if let Some(s) = score.filter(|s| !(0.0..=1.0).contains(s)) {
            return Err(FieldError::invalid(
                "score",
                format!("must be within [0, 1], got {s}"),
            ));
        }
        if let Some(c) = iscrowd.filter(|c| *c > 1) {
            return Err(FieldError::invalid(
                "iscrowd",
                format!("must be 0 or 1, got {c}"),
            ));
        }

        let bbox = match (bbox, &segmentation) {
            (Some(bbox), _) => Some(bbox),
            (None, Some(rings)) => {
                debug!(task = %task, "deriving bbox from segmentation");
                Some(segmentation_box(rings)?)
            }
            (None, None) => None,
        };

        let area = area.or_else(|| {
            let derived = match &segmentation {
                Some(rings) => polygon::area(rings),
                None => {
                    let [_, _, w, h] = bbox?;
                    w * h
                }
            };
            debug!(task = %task, area = derived, "derived area");
            Some(derived)
        });

        if let Some(a) = area.filter(|a| !a.is_finite()) {
            return Err(FieldError::invalid(
                "area",
                format!("derived area overflows: {a}"),
            ));
        }

        let iscrowd = iscrowd.or(bbox.map(|_| 0));
        let num_keypoints = num_keypoints.or_else(|| {
            keypoints
                .as_ref()
                .and_then(|points| u32::try_from(points.len() / 3).ok())
        });

        Ok(Self {
            id,
            task,
            image_id,
            category_id,
            bbox,
            segmentation,
            area,
            keypoints,
            num_keypoints,
            caption,
            value,
            iscrowd,
            is_prediction: score.is_some(),
            score,
        })
    }

    /// Returns a new annotation with every `Some` attribute of `overrides`
    /// replacing the current one. Id and task are kept.
    ///
    /// Attributes derived from an overridden source are derived again unless
    /// they are overridden too: bbox and area follow a new segmentation, area
    /// follows a new bbox, and num_keypoints follows new keypoints.
    pub fn update(&self, overrides: AnnotationFields) -> Result<Self, FieldError> {
        let mut merged = self.to_fields();

        if overrides.segmentation.is_some() {
            if overrides.bbox.is_none() {
                merged.bbox = None;
            }
            if overrides.area.is_none() {
                merged.area = None;
            }
        }
        if overrides.bbox.is_some() && overrides.area.is_none() {
            merged.area = None;
        }
        if overrides.keypoints.is_some() && overrides.num_keypoints.is_none() {
            merged.num_keypoints = None;
        }
        if overrides.bbox.is_some() {
            merged.bbox_type = overrides.bbox_type;
        }

        let AnnotationFields {
            image_id,
            category_id,
            bbox,
            bbox_type: _,
            segmentation,
            area,
            keypoints,
            num_keypoints,
            caption,
            value,
            iscrowd,
            score,
        } = overrides;

        merged.image_id = image_id.or(merged.image_id);
        merged.category_id = category_id.or(merged.category_id);
        merged.bbox = bbox.or(merged.bbox);
        merged.segmentation = segmentation.or(merged.segmentation);
        merged.area = area.or(merged.area);
        merged.keypoints = keypoints.or(merged.keypoints);
        merged.num_keypoints = num_keypoints.or(merged.num_keypoints);
        merged.caption = caption.or(merged.caption);
        merged.value = value.or(merged.value);
        merged.iscrowd = iscrowd.or(merged.iscrowd);
        merged.score = score.or(merged.score);

        debug!(id = %self.id, task = %self.task, "updating annotation");
        Self::build(self.id.clone(), self.task, merged)
    }

    /// The current attributes as raw inputs.
    pub fn to_fields(&self) -> AnnotationFields {
        AnnotationFields {
            image_id: Some(self.image_id.clone()),
            category_id: self.category_id.clone(),
            bbox: self.bbox.map(|b| b.to_vec()),
            bbox_type: None,
            segmentation: self.segmentation.clone().map(Segmentation::Polygon),
            area: self.area,
            keypoints: self.keypoints.clone(),
            num_keypoints: self.num_keypoints,
            caption: self.caption.clone(),
            value: self.value,
            iscrowd: self.iscrowd,
            score: self.score,
        }
    }

    /// Flat dict form. Absent attributes are left out.
    pub fn to_dict(&self) -> Dict {
        let mut dict = DictWriter::new(&self.id, self.task.as_str());
        dict.put("image_id", self.image_id.as_str());
        dict.put_opt("category_id", self.category_id.as_deref());
        dict.put_opt("bbox", self.bbox.map(|b| b.to_vec()));
        dict.put_opt("segmentation", self.segmentation.clone());
        dict.put_opt("area", self.area);
        dict.put_opt("keypoints", self.keypoints.clone());
        dict.put_opt("num_keypoints", self.num_keypoints);
        dict.put_opt("caption", self.caption.as_deref());
        dict.put_opt("value", self.value);
        dict.put_opt("iscrowd", self.iscrowd);
        dict.put_opt("score", self.score);
        dict.put("is_prediction", self.is_prediction);
        dict.finish()
    }

    /// Rebuilds an annotation from its dict form. The `id` is kept when
    /// present; `is_prediction` is recomputed from `score`.
    pub fn from_dict(dict: &Dict) -> Result<Self, FieldError> {
        let reader = DictReader::new(dict);
        let task: TaskType = reader
            .parsed("task")?
            .ok_or_else(|| FieldError::missing(RecordKind::Annotation, "unknown", "task"))?;

        let fields = AnnotationFields {
            image_id: reader.string("image_id")?,
            category_id: reader.string("category_id")?,
            bbox: reader.numbers("bbox")?,
            bbox_type: None,
            segmentation: reader.segmentation("segmentation")?,
            area: reader.f64("area")?,
            keypoints: reader.numbers("keypoints")?,
            num_keypoints: reader.u32("num_keypoints")?,
            caption: reader.string("caption")?,
            value: reader.f64("value")?,
            iscrowd: reader.u8("iscrowd")?,
            score: reader.f64("score")?,
        };
        Self::build(reader.id()?, task, fields)
    }

    #[inline]
    pub fn id(&self) -> &RecordId {
        &self.id
    }

    #[inline]
    pub fn task(&self) -> TaskType {
        self.task
    }

    pub fn image_id(&self) -> &str {
        &self.image_id
    }

    pub fn category_id(&self) -> Option<&str> {
        self.category_id.as_deref()
    }

    /// XYWH box, given or derived from the segmentation.
    pub fn bbox(&self) -> Option<[f64; 4]> {
        self.bbox
    }

    pub fn segmentation(&self) -> Option<&Polygons> {
        self.segmentation.as_ref()
    }

    pub fn area(&self) -> Option<f64> {
        self.area
    }

    pub fn keypoints(&self) -> Option<&[f64]> {
        self.keypoints.as_deref()
    }

    pub fn num_keypoints(&self) -> Option<u32> {
        self.num_keypoints
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn iscrowd(&self) -> Option<u8> {
        self.iscrowd
    }

    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// True when the annotation carries a score.
    pub fn is_prediction(&self) -> bool {
        self.is_prediction
    }
}

impl PartialEq for AnnotationInfo {
    fn eq(&self, other: &Self) -> bool {
        let Self {
            id: _,
            task,
            image_id,
            category_id,
            bbox,
            segmentation,
            area,
            keypoints,
            num_keypoints,
            caption,
            value,
            iscrowd,
            score,
            is_prediction,
        } = self;

        *task == other.task
            && *image_id == other.image_id
            && *category_id == other.category_id
            && *bbox == other.bbox
            && *segmentation == other.segmentation
            && *area == other.area
            && *keypoints == other.keypoints
            && *num_keypoints == other.num_keypoints
            && *caption == other.caption
            && *value == other.value
            && *iscrowd == other.iscrowd
            && *score == other.score
            && *is_prediction == other.is_prediction
    }
}

/// Brings any segmentation input to non-empty polygon rings.
fn normalize_segmentation(segmentation: Segmentation) -> Result<Polygons, FieldError> {
    let kind = segmentation.kind();
    if segmentation.as_polygons().is_none() {
        debug!(src = %kind, "normalizing segmentation to polygons");
    }

    let rings = segmentation
        .into_polygons()
        .map_err(|e| FieldError::geometry("segmentation", e))?;
    if rings.is_empty() {
        return Err(FieldError::geometry("segmentation", GeometryError::EmptyRegion));
    }
    Ok(rings)
}

/// XYWH box of the rings; a zero-width or zero-height region is rejected.
fn segmentation_box(rings: &Polygons) -> Result<[f64; 4], FieldError> {
    let bounds = polygon::bounds(rings)
        .ok_or_else(|| FieldError::geometry("segmentation", GeometryError::EmptyRegion))?;
    let xywh = Xywh::parse(&bounds, BoxType::Xywh)
        .map_err(|e| FieldError::geometry("segmentation", e))?;
    Ok(xywh.project(BoxType::Xywh))
}
