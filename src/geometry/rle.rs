//! COCO-style uncompressed run-length encoding.
//!
//! Pixels are scanned column-major (index `col * H + row`). `counts`
//! alternates background and foreground runs, always starting with a
//! background run that may be zero-length.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::mask::Mask;
use super::size::ImageSize;
use crate::error::GeometryError;

/// Run-length encoded mask: `{"counts": [...], "size": [H, W]}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rle {
    pub counts: Vec<u64>,
    /// `[height, width]`.
    pub size: [u32; 2],
}

impl Rle {
    pub fn new(counts: Vec<u64>, size: ImageSize) -> Self {
        Self {
            counts,
            size: size.into(),
        }
    }

    #[inline]
    pub fn image_size(&self) -> ImageSize {
        ImageSize::from(self.size)
    }

    /// Reads an RLE from its JSON mapping, reporting the missing or
    /// malformed key by name.
    pub fn from_value(value: &Value) -> Result<Self, GeometryError> {
        let object = value.as_object().ok_or_else(|| GeometryError::RleMalformed {
            key: "segmentation",
            message: format!("expected a mapping, got {}", json_kind(value)),
        })?;

        let counts = object
            .get("counts")
            .ok_or(GeometryError::RleMissingKey("counts"))?;
        let size = object
            .get("size")
            .ok_or(GeometryError::RleMissingKey("size"))?;

        let counts = counts
            .as_array()
            .ok_or_else(|| malformed("counts", "expected an array of non-negative integers"))?
            .iter()
            .map(|run| {
                run.as_u64()
                    .ok_or_else(|| malformed("counts", format!("invalid run length {run}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let size = match size.as_array().map(Vec::as_slice) {
            Some([h, w]) => [as_dimension(h)?, as_dimension(w)?],
            _ => return Err(malformed("size", "expected [height, width]")),
        };

        let rle = Self { counts, size };
        rle.validate()?;
        Ok(rle)
    }

    /// JSON mapping with `counts` and `size` keys.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "counts": self.counts,
            "size": self.size,
        })
    }

    /// Checks that the runs cover exactly `H * W` pixels.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let size = self.image_size();
        let expected = size.pixel_count();
        let total = self
            .counts
            .iter()
            .try_fold(0u64, |acc, &run| acc.checked_add(run))
            .unwrap_or(u64::MAX);

        if total != expected {
            return Err(GeometryError::RleRunTotal {
                total,
                expected,
                height: size.height,
                width: size.width,
            });
        }
        Ok(())
    }

    /// Encodes a mask.
    pub fn encode(mask: &Mask) -> Self {
        let (height, width) = (mask.height(), mask.width());
        let mut counts = Vec::new();
        let mut current = false;
        let mut run = 0u64;

        for col in 0..width {
            for row in 0..height {
                let pixel = mask.get(row, col);
                if pixel != current {
                    counts.push(run);
                    run = 0;
                    current = pixel;
                }
                run += 1;
            }
        }
        counts.push(run);

        tracing::trace!(runs = counts.len(), height, width, "encoded rle");
        Self::new(counts, mask.size())
    }

    /// Decodes into a mask after checking the run total.
    pub fn decode(&self) -> Result<Mask, GeometryError> {
        self.validate()?;
        let size = self.image_size();
        let height = u64::from(size.height);
        let mut mask = Mask::new(size);

        let mut start = 0u64;
        for (i, &run) in self.counts.iter().enumerate() {
            if i % 2 == 1 {
                for idx in start..start + run {
                    mask.set((idx % height) as u32, (idx / height) as u32, true);
                }
            }
            start += run;
        }
        Ok(mask)
    }

    /// Foreground pixel count: the sum of the odd-indexed runs.
    pub fn area(&self) -> u64 {
        self.counts
            .iter()
            .skip(1)
            .step_by(2)
            .fold(0u64, |acc, &run| acc.saturating_add(run))
    }

    /// Minimal XYWH box covering every foreground run, or `None` when
    /// there is no foreground. Assumes a validated run total.
    pub fn bounds(&self) -> Option<[f64; 4]> {
        let height = u64::from(self.size[0]);
        if height == 0 {
            return None;
        }

        let (mut min_x, mut min_y) = (u64::MAX, u64::MAX);
        let (mut max_x, mut max_y) = (0u64, 0u64);
        let mut any = false;
        let mut start = 0u64;

        for (i, &run) in self.counts.iter().enumerate() {
            if i % 2 == 1 && run > 0 {
                any = true;
                let end = start.saturating_add(run - 1);
                let (x0, y0) = (start / height, start % height);
                let (x1, y1) = (end / height, end % height);

                min_x = min_x.min(x0);
                max_x = max_x.max(x1);
                if x0 == x1 {
                    min_y = min_y.min(y0);
                    max_y = max_y.max(y1);
                } else {
                    // Wraps past a column end, so every row is touched.
                    min_y = 0;
                    max_y = height - 1;
                }
            }
            start = start.saturating_add(run);
        }

        any.then(|| {
            [
                min_x as f64,
                min_y as f64,
                (max_x - min_x + 1) as f64,
                (max_y - min_y + 1) as f64,
            ]
        })
    }
}

fn malformed(key: &'static str, message: impl Into<String>) -> GeometryError {
    GeometryError::RleMalformed {
        key,
        message: message.into(),
    }
}

fn as_dimension(value: &Value) -> Result<u32, GeometryError> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| malformed("size", format!("invalid dimension {value}")))
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn column_mask() -> Mask {
        // 3x3, foreground on column 1 rows 0..=1 and column 2 row 2.
        Mask::from_fn(ImageSize::new(3, 3), |r, c| (c == 1 && r < 2) || (c == 2 && r == 2))
    }

    #[test]
    fn test_full_mask_starts_with_empty_background_run() {
        let rle = Rle::encode(&Mask::full(ImageSize::new(100, 100)));
        assert_eq!(rle.counts, vec![0, 10000]);
        assert_eq!(rle.size, [100, 100]);
        assert_eq!(
            rle.to_value(),
            json!({"counts": [0, 10000], "size": [100, 100]})
        );
    }

    #[test]
    fn test_empty_mask_is_one_background_run() {
        let rle = Rle::encode(&Mask::new(ImageSize::new(4, 5)));
        assert_eq!(rle.counts, vec![20]);
        assert_eq!(rle.area(), 0);
        assert_eq!(rle.bounds(), None);
    }

    #[test]
    fn test_encode_scans_column_major() {
        let rle = Rle::encode(&column_mask());
        // col 0: 3 bg; col 1: 2 fg, 1 bg; col 2: 2 bg, 1 fg
        assert_eq!(rle.counts, vec![3, 2, 3, 1]);
        assert_eq!(rle.decode().unwrap(), column_mask());
    }

    #[test]
    fn test_area_and_bounds_match_mask() {
        let mask = column_mask();
        let rle = Rle::encode(&mask);
        assert_eq!(rle.area(), mask.area());
        assert_eq!(rle.bounds(), mask.bounds());
        assert_eq!(rle.bounds(), Some([1.0, 0.0, 2.0, 3.0]));
    }

    #[test]
    fn test_run_crossing_columns_spans_all_rows() {
        // 4x3: run from (col 0,row 3) through (col 1,row 0).
        let rle = Rle::new(vec![3, 2, 7], ImageSize::new(4, 3));
        assert_eq!(rle.bounds(), Some([0.0, 0.0, 2.0, 4.0]));
        assert_eq!(rle.bounds(), rle.decode().unwrap().bounds());
    }

    #[test]
    fn test_zero_length_foreground_runs_are_ignored() {
        let rle = Rle::new(vec![2, 0, 2, 1, 1], ImageSize::new(3, 2));
        assert_eq!(rle.area(), 1);
        assert_eq!(rle.bounds(), Some([1.0, 1.0, 1.0, 1.0]));
    }

    #[test]
    fn test_run_total_must_match_size() {
        let rle = Rle::new(vec![0, 9999], ImageSize::new(100, 100));
        assert_eq!(
            rle.decode(),
            Err(GeometryError::RleRunTotal {
                total: 9999,
                expected: 10000,
                height: 100,
                width: 100
            })
        );
    }

    #[test]
    fn test_overflowing_runs_are_rejected() {
        let rle = Rle::new(vec![u64::MAX, 1], ImageSize::new(1, 1));
        assert!(matches!(rle.validate(), Err(GeometryError::RleRunTotal { .. })));
    }

    #[test]
    fn test_from_value_reports_missing_keys() {
        assert_eq!(
            Rle::from_value(&json!({"size": [1, 1]})),
            Err(GeometryError::RleMissingKey("counts"))
        );
        assert_eq!(
            Rle::from_value(&json!({"counts": [1]})),
            Err(GeometryError::RleMissingKey("size"))
        );
    }

    #[test]
    fn test_from_value_rejects_bad_shapes() {
        let err = Rle::from_value(&json!({"counts": [1, -2], "size": [1, 1]})).unwrap_err();
        assert!(matches!(err, GeometryError::RleMalformed { key: "counts", .. }));

        let err = Rle::from_value(&json!({"counts": [1], "size": [1]})).unwrap_err();
        assert!(matches!(err, GeometryError::RleMalformed { key: "size", .. }));

        let err = Rle::from_value(&json!([0, 1])).unwrap_err();
        assert!(matches!(err, GeometryError::RleMalformed { .. }));
    }

    #[test]
    fn test_from_value_accepts_wire_format() {
        let rle = Rle::from_value(&json!({"counts": [0, 10000], "size": [100, 100]})).unwrap();
        assert_eq!(rle.area(), 10000);
        assert_eq!(rle.bounds(), Some([0.0, 0.0, 100.0, 100.0]));
    }

    #[test]
    fn test_serde_uses_wire_keys() {
        let rle: Rle = serde_json::from_str(r#"{"counts":[2,2],"size":[2,2]}"#).unwrap();
        assert_eq!(rle, Rle::new(vec![2, 2], ImageSize::new(2, 2)));
        assert_eq!(
            serde_json::to_string(&rle).unwrap(),
            r#"{"counts":[2,2],"size":[2,2]}"#
        );
    }
}
