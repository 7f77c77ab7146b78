//! Closed enumerations shared by the geometry and field modules.
//!
//! Every enum has a canonical lower-case spelling returned by `as_str()`.
//! Parsing is case-insensitive (`"CLASSIFICATION"`, `"Classification"` and
//! `"classification"` all parse to [`TaskType::Classification`]), and
//! [`matches`](TaskType::matches) compares against a string the same way.
//! Serde uses the canonical spelling when writing and accepts any casing
//! when reading.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// A string did not name any member of an enumeration.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Invalid {type_name} '{value}' (expected one of: {expected})")]
pub struct ParseTypeError {
    pub type_name: &'static str,
    pub value: String,
    pub expected: String,
}

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $type_name:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Returns the canonical lower-case name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Case-insensitive comparison against a string.
            pub fn matches(&self, value: &str) -> bool {
                self.as_str().eq_ignore_ascii_case(value.trim())
            }
        }

        impl FromStr for $name {
            type Err = ParseTypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|member| member.matches(s))
                    .ok_or_else(|| ParseTypeError {
                        type_name: $type_name,
                        value: s.to_string(),
                        expected: $name::ALL
                            .iter()
                            .map(|m| m.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

string_enum! {
    /// The annotation modality governing which fields a record requires.
    TaskType, "task" {
        Classification => "classification",
        ObjectDetection => "object_detection",
        SemanticSegmentation => "semantic_segmentation",
        InstanceSegmentation => "instance_segmentation",
        KeypointDetection => "keypoint_detection",
        TextRecognition => "text_recognition",
        Regression => "regression",
    }
}

string_enum! {
    /// Dataset split an image is assigned to.
    #[derive(Default)]
    SplitType, "split" {
        Train => "train",
        Validation => "validation",
        Test => "test",
        Background => "background",
        Unlabeled => "unlabeled",
        Prediction => "prediction",
        /// Not assigned yet.
        #[default]
        Unset => "unset",
    }
}

string_enum! {
    /// Coordinate encoding of an axis-aligned box.
    BoxType, "box type" {
        /// `(x1, y1, x2, y2)`: top-left and bottom-right corners.
        Xyxy => "xyxy",
        /// `(x, y, w, h)`: top-left corner plus size. Canonical.
        Xywh => "xywh",
        /// `(cx, cy, w, h)`: centre plus size.
        Cxcywh => "cxcywh",
    }
}

string_enum! {
    /// Encoding of a segmentation region.
    SegmentationType, "segmentation type" {
        Polygon => "polygon",
        Mask => "mask",
        Rle => "rle",
    }
}

/// Task name used by image records, which are shared by every task.
pub const AGNOSTIC_TASK: &str = "agnostic";
