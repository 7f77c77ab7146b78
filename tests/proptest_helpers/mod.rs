#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use waffle_dough::field::{AnnotationFields, Dict};
use waffle_dough::geometry::{ImageSize, Mask, Polygons};
use waffle_dough::types::{BoxType, SplitType, TaskType};

pub const EPS_BOX: f64 = 1e-6;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

pub fn approx_box(left: &[f64], right: &[f64], eps: f64) -> bool {
    left.len() == right.len()
        && left
            .iter()
            .zip(right)
            .all(|(l, r)| (l - r).abs() <= eps * (1.0 + l.abs().max(r.abs())))
}

pub fn arb_box_type() -> BoxedStrategy<BoxType> {
    proptest::sample::select(BoxType::ALL.to_vec()).boxed()
}

pub fn arb_task() -> BoxedStrategy<TaskType> {
    proptest::sample::select(TaskType::ALL.to_vec()).boxed()
}

pub fn arb_split() -> BoxedStrategy<SplitType> {
    proptest::sample::select(SplitType::ALL.to_vec()).boxed()
}

/// A box with positive size as `(x, y, w, h)`.
pub fn arb_xywh() -> BoxedStrategy<[f64; 4]> {
    (-1e4..1e4f64, -1e4..1e4f64, 0.5..1e3f64, 0.5..1e3f64)
        .prop_map(|(x, y, w, h)| [x, y, w, h])
        .boxed()
}

/// Writes an XYWH box in `box_type` encoding without going through the
/// crate's conversion code.
pub fn encode_box([x, y, w, h]: [f64; 4], box_type: BoxType) -> [f64; 4] {
    match box_type {
        BoxType::Xyxy => [x, y, x + w, y + h],
        BoxType::Xywh => [x, y, w, h],
        BoxType::Cxcywh => [x + w / 2.0, y + h / 2.0, w, h],
    }
}

pub fn arb_image_size(max: u32) -> BoxedStrategy<ImageSize> {
    (1..=max, 1..=max)
        .prop_map(|(h, w)| ImageSize::new(h, w))
        .boxed()
}

pub fn arb_mask(max: u32) -> BoxedStrategy<Mask> {
    arb_image_size(max)
        .prop_flat_map(|size| {
            proptest::collection::vec(any::<bool>(), size.pixel_count() as usize)
                .prop_map(move |pixels| Mask::from_vec(size, pixels).expect("sized buffer"))
        })
        .boxed()
}

/// An axis-aligned rectangle with integer corners inside `size`, as
/// `(ring, [x, y, w, h])`.
pub fn arb_pixel_rect(size: ImageSize) -> BoxedStrategy<(Polygons, [f64; 4])> {
    (0..size.width, 0..size.height)
        .prop_flat_map(move |(x, y)| (Just(x), Just(y), 1..=size.width - x, 1..=size.height - y))
        .prop_map(|(x, y, w, h)| {
            let (x0, y0) = (x as f64, y as f64);
            let (x1, y1) = ((x + w) as f64, (y + h) as f64);
            (
                vec![vec![x0, y0, x1, y0, x1, y1, x0, y1]],
                [x0, y0, w as f64, h as f64],
            )
        })
        .boxed()
}

pub fn name_strategy() -> BoxedStrategy<String> {
    proptest::string::string_regex("[a-z][a-z0-9_]{0,15}")
        .expect("valid name regex")
        .boxed()
}

pub fn file_name_strategy() -> BoxedStrategy<String> {
    proptest::string::string_regex("[a-z0-9_]{1,12}\\.(jpg|png|bmp)")
        .expect("valid filename regex")
        .boxed()
}

/// Minimal valid fields for an annotation of `task`, with every required
/// attribute present.
pub fn arb_annotation_fields(task: TaskType) -> BoxedStrategy<AnnotationFields> {
    let ids = (name_strategy(), name_strategy());
    let optional = (
        proptest::option::of(0.0..=1.0f64),
        proptest::option::of(0u8..=1),
    );

    (ids, arb_xywh(), optional, 1usize..6, -1e3..1e3f64)
        .prop_map(move |((image_id, category_id), bbox, (score, iscrowd), n, value)| {
            let mut fields = AnnotationFields {
                image_id: Some(image_id),
                category_id: Some(category_id),
                score,
                iscrowd,
                ..Default::default()
            };
            match task {
                TaskType::Classification => {}
                TaskType::ObjectDetection => fields.bbox = Some(bbox.to_vec()),
                TaskType::SemanticSegmentation | TaskType::InstanceSegmentation => {
                    let [x, y, w, h] = bbox;
                    fields.segmentation =
                        Some(vec![vec![x, y, x + w, y, x + w, y + h, x, y + h]].into());
                }
                TaskType::KeypointDetection => {
                    fields.keypoints = Some((0..n * 3).map(|i| i as f64).collect());
                }
                TaskType::TextRecognition => {
                    fields.category_id = None;
                    fields.caption = Some(format!("text {n}"));
                }
                TaskType::Regression => fields.value = Some(value),
            }
            fields
        })
        .boxed()
}

pub fn as_dict(value: serde_json::Value) -> Dict {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
