//! Typed access to the flat dict form of a record.
//!
//! Readers treat a `null` value like a missing key and turn type mismatches
//! into [`FieldError::FieldValidation`] naming the key.

use std::str::FromStr;

use serde_json::{Map, Value};

use super::ids::RecordId;
use crate::error::FieldError;
use crate::geometry::Segmentation;

pub type Dict = Map<String, Value>;

/// Read-only view over a dict.
pub(crate) struct DictReader<'a> {
    map: &'a Dict,
}

impl<'a> DictReader<'a> {
    pub(crate) fn new(map: &'a Dict) -> Self {
        Self { map }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    pub(crate) fn string(&self, key: &'static str) -> Result<Option<String>, FieldError> {
        self.get(key)
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| type_error(key, "a string", v))
            })
            .transpose()
    }

    pub(crate) fn f64(&self, key: &'static str) -> Result<Option<f64>, FieldError> {
        self.get(key)
            .map(|v| v.as_f64().ok_or_else(|| type_error(key, "a number", v)))
            .transpose()
    }

    pub(crate) fn u32(&self, key: &'static str) -> Result<Option<u32>, FieldError> {
        self.get(key)
            .map(|v| {
                as_index(v)
                    .and_then(|n| u32::try_from(n).ok())
                    .ok_or_else(|| type_error(key, "a non-negative integer", v))
            })
            .transpose()
    }

    pub(crate) fn u8(&self, key: &'static str) -> Result<Option<u8>, FieldError> {
        self.get(key)
            .map(|v| {
                as_index(v)
                    .and_then(|n| u8::try_from(n).ok())
                    .ok_or_else(|| type_error(key, "a small non-negative integer", v))
            })
            .transpose()
    }

    pub(crate) fn bool(&self, key: &'static str) -> Result<Option<bool>, FieldError> {
        self.get(key)
            .map(|v| v.as_bool().ok_or_else(|| type_error(key, "a boolean", v)))
            .transpose()
    }

    pub(crate) fn numbers(&self, key: &'static str) -> Result<Option<Vec<f64>>, FieldError> {
        self.array(key)?
            .map(|items| {
                items
                    .iter()
                    .map(|v| v.as_f64().ok_or_else(|| type_error(key, "a list of numbers", v)))
                    .collect()
            })
            .transpose()
    }

    pub(crate) fn strings(&self, key: &'static str) -> Result<Option<Vec<String>>, FieldError> {
        self.array(key)?
            .map(|items| {
                items
                    .iter()
                    .map(|v| {
                        v.as_str()
                            .map(str::to_string)
                            .ok_or_else(|| type_error(key, "a list of strings", v))
                    })
                    .collect()
            })
            .transpose()
    }

    /// A list of `[a, b]` index pairs.
    pub(crate) fn pairs(&self, key: &'static str) -> Result<Option<Vec<[usize; 2]>>, FieldError> {
        self.array(key)?
            .map(|items| {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let pair = match item.as_array().map(Vec::as_slice) {
                            Some([a, b]) => as_index(a).zip(as_index(b)),
                            Some(other) => {
                                return Err(FieldError::invalid(
                                    key,
                                    format!("entry {i} has {} elements, expected 2", other.len()),
                                ))
                            }
                            None => None,
                        };
                        pair.and_then(|(a, b)| {
                            Some([usize::try_from(a).ok()?, usize::try_from(b).ok()?])
                        })
                        .ok_or_else(|| type_error(key, "a pair of non-negative integers", item))
                    })
                    .collect()
            })
            .transpose()
    }

    pub(crate) fn parsed<T>(&self, key: &'static str) -> Result<Option<T>, FieldError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.string(key)?
            .map(|raw| raw.parse().map_err(|e: T::Err| FieldError::invalid(key, e.to_string())))
            .transpose()
    }

    pub(crate) fn segmentation(&self, key: &'static str) -> Result<Option<Segmentation>, FieldError> {
        self.get(key)
            .map(|v| Segmentation::from_value(v).map_err(|e| FieldError::geometry(key, e)))
            .transpose()
    }

    /// The stored id, or a fresh one when the dict has none.
    pub(crate) fn id(&self) -> Result<RecordId, FieldError> {
        Ok(self
            .string("id")?
            .map(RecordId::from)
            .unwrap_or_else(RecordId::generate))
    }

    fn array(&self, key: &'static str) -> Result<Option<&'a Vec<Value>>, FieldError> {
        self.get(key)
            .map(|v| v.as_array().ok_or_else(|| type_error(key, "a list", v)))
            .transpose()
    }
}

/// Accepts integers and integral floats (`2.0`), as JSON producers differ.
fn as_index(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64)
            .map(|f| f as u64)
    })
}

fn type_error(key: &'static str, expected: &str, got: &Value) -> FieldError {
    FieldError::invalid(key, format!("expected {expected}, got {got}"))
}

/// Builds a dict, skipping absent values.
#[derive(Default)]
pub(crate) struct DictWriter {
    map: Dict,
}

impl DictWriter {
    pub(crate) fn new(id: &RecordId, task: &str) -> Self {
        let mut writer = Self::default();
        writer.put("id", id.as_str());
        writer.put("task", task);
        writer
    }

    pub(crate) fn put(&mut self, key: &str, value: impl Into<Value>) {
        self.map.insert(key.to_string(), value.into());
    }

    pub(crate) fn put_opt(&mut self, key: &str, value: Option<impl Into<Value>>) {
        if let Some(value) = value {
            self.put(key, value);
        }
    }

    pub(crate) fn finish(self) -> Dict {
        self.map
    }
}
