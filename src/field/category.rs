//! Category records.

use tracing::debug;

use super::dict::{Dict, DictReader, DictWriter};
use super::ids::RecordId;
use super::{require_non_empty, RecordKind};
use crate::error::FieldError;
use crate::types::TaskType;

/// Supercategory assigned when none is given.
pub const DEFAULT_SUPERCATEGORY: &str = "object";

/// Raw inputs for a category.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryFields {
    pub name: Option<String>,
    pub supercategory: Option<String>,
    /// Keypoint names, for keypoint detection.
    pub keypoints: Option<Vec<String>>,
    /// Edges between keypoints as 0-based index pairs into `keypoints`.
    pub skeleton: Option<Vec<[usize; 2]>>,
}

/// A validated category.
#[derive(Clone, Debug)]
pub struct CategoryInfo {
    id: RecordId,
    task: TaskType,
    name: String,
    supercategory: String,
    keypoints: Option<Vec<String>>,
    skeleton: Option<Vec<[usize; 2]>>,
}

impl CategoryInfo {
    /// Attributes that must be supplied for `task`.
    pub fn required_fields(task: TaskType) -> &'static [&'static str] {
        match task {
            TaskType::KeypointDetection => &["name", "keypoints", "skeleton"],
            TaskType::Classification
            | TaskType::ObjectDetection
            | TaskType::SemanticSegmentation
            | TaskType::InstanceSegmentation
            | TaskType::TextRecognition
            | TaskType::Regression => &["name"],
        }
    }

    pub fn new(task: TaskType, fields: CategoryFields) -> Result<Self, FieldError> {
        Self::build(RecordId::generate(), task, fields)
    }

    fn named(task: TaskType, name: String) -> Result<Self, FieldError> {
        Self::new(
            task,
            CategoryFields {
                name: Some(name),
                ..Default::default()
            },
        )
    }

    pub fn classification(name: impl Into<String>) -> Result<Self, FieldError> {
        Self::named(TaskType::Classification, name.into())
    }

    pub fn object_detection(name: impl Into<String>) -> Result<Self, FieldError> {
        Self::named(TaskType::ObjectDetection, name.into())
    }

    pub fn semantic_segmentation(name: impl Into<String>) -> Result<Self, FieldError> {
        Self::named(TaskType::SemanticSegmentation, name.into())
    }

    pub fn instance_segmentation(name: impl Into<String>) -> Result<Self, FieldError> {
        Self::named(TaskType::InstanceSegmentation, name.into())
    }

    pub fn text_recognition(name: impl Into<String>) -> Result<Self, FieldError> {
        Self::named(TaskType::TextRecognition, name.into())
    }

    pub fn regression(name: impl Into<String>) -> Result<Self, FieldError> {
        Self::named(TaskType::Regression, name.into())
    }

    /// A keypoint category. Every skeleton index must point into
    /// `keypoints`.
    pub fn keypoint_detection(
        name: impl Into<String>,
        keypoints: Vec<String>,
        skeleton: Vec<[usize; 2]>,
    ) -> Result<Self, FieldError> {
        Self::new(
            TaskType::KeypointDetection,
            CategoryFields {
                name: Some(name.into()),
                supercategory: None,
                keypoints: Some(keypoints),
                skeleton: Some(skeleton),
            },
        )
    }

    fn build(id: RecordId, task: TaskType, fields: CategoryFields) -> Result<Self, FieldError> {
        let CategoryFields {
            name,
            supercategory,
            keypoints,
            skeleton,
        } = fields;

        for &field in Self::required_fields(task) {
            let present = match field {
                "name" => name.is_some(),
                "keypoints" => keypoints.is_some(),
                "skeleton" => skeleton.is_some(),
                _ => false,
            };
            if !present {
                return Err(FieldError::missing(RecordKind::Category, task.as_str(), field));
            }
        }

        let name =
            name.ok_or_else(|| FieldError::missing(RecordKind::Category, task.as_str(), "name"))?;
        require_non_empty("name", Some(&name))?;

        if let Some(edges) = &skeleton {
            let count = keypoints.as_ref().map_or(0, Vec::len);
            if let Some((i, edge)) = edges
                .iter()
                .enumerate()
                .find(|(_, edge)| edge.iter().any(|&idx| idx >= count))
            {
                return Err(FieldError::invalid(
                    "skeleton",
                    format!("edge {i} {edge:?} refers past the {count} keypoints"),
                ));
            }
        }

        let supercategory = supercategory.unwrap_or_else(|| {
            debug!(task = %task, "defaulting supercategory");
            DEFAULT_SUPERCATEGORY.to_string()
        });

        Ok(Self {
            id,
            task,
            name,
            supercategory,
            keypoints,
            skeleton,
        })
    }

    /// Returns a new category with every `Some` attribute of `overrides`
    /// replacing the current one. Id and task are kept.
    pub fn update(&self, overrides: CategoryFields) -> Result<Self, FieldError> {
        let current = self.to_fields();
        let merged = CategoryFields {
            name: overrides.name.or(current.name),
            supercategory: overrides.supercategory.or(current.supercategory),
            keypoints: overrides.keypoints.or(current.keypoints),
            skeleton: overrides.skeleton.or(current.skeleton),
        };
        Self::build(self.id.clone(), self.task, merged)
    }

    pub fn to_fields(&self) -> CategoryFields {
        CategoryFields {
            name: Some(self.name.clone()),
            supercategory: Some(self.supercategory.clone()),
            keypoints: self.keypoints.clone(),
            skeleton: self.skeleton.clone(),
        }
    }

    pub fn to_dict(&self) -> Dict {
        let mut dict = DictWriter::new(&self.id, self.task.as_str());
        dict.put("name", self.name.as_str());
        dict.put("supercategory", self.supercategory.as_str());
        dict.put_opt("keypoints", self.keypoints.clone());
        dict.put_opt(
            "skeleton",
            self.skeleton
                .as_ref()
                .map(|edges| edges.iter().map(|&[a, b]| vec![a, b]).collect::<Vec<_>>()),
        );
        dict.finish()
    }

    pub fn from_dict(dict: &Dict) -> Result<Self, FieldError> {
        let reader = DictReader::new(dict);
        let task: TaskType = reader
            .parsed("task")?
            .ok_or_else(|| FieldError::missing(RecordKind::Category, "unknown", "task"))?;

        let fields = CategoryFields {
            name: reader.string("name")?,
            supercategory: reader.string("supercategory")?,
            keypoints: reader.strings("keypoints")?,
            skeleton: reader.pairs("skeleton")?,
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

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn supercategory(&self) -> &str {
        &self.supercategory
    }

    pub fn keypoints(&self) -> Option<&[String]> {
        self.keypoints.as_deref()
    }

    pub fn skeleton(&self) -> Option<&[[usize; 2]]> {
        self.skeleton.as_deref()
    }
}

impl PartialEq for CategoryInfo {
    fn eq(&self, other: &Self) -> bool {
        self.task == other.task
            && self.name == other.name
            && self.supercategory == other.supercategory
            && self.keypoints == other.keypoints
            && self.skeleton == other.skeleton
    }
}

impl Eq for CategoryInfo {}
