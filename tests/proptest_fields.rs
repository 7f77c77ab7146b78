use proptest::prelude::*;

use waffle_dough::error::FieldError;
use waffle_dough::field::{
    AnnotationFields, AnnotationInfo, CategoryFields, CategoryInfo, ImageFields, ImageInfo,
};
use waffle_dough::types::TaskType;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn annotation_dict_roundtrip_for_every_task(
        (task, fields) in proptest_helpers::arb_task()
            .prop_flat_map(|task| (Just(task), proptest_helpers::arb_annotation_fields(task)))
    ) {
        let ann = AnnotationInfo::new(task, fields).expect("valid annotation");
        let restored = AnnotationInfo::from_dict(&ann.to_dict()).expect("parse dict");

        prop_assert_eq!(&restored, &ann);
        prop_assert_eq!(restored.id(), ann.id());
        prop_assert_eq!(restored.is_prediction(), ann.score().is_some());
    }

    #[test]
    fn object_detection_derives_area_from_bbox(xywh in proptest_helpers::arb_xywh()) {
        let ann = AnnotationInfo::object_detection("img", "cat", &xywh).expect("valid bbox");
        prop_assert_eq!(ann.bbox(), Some(xywh));
        prop_assert_eq!(ann.area(), Some(xywh[2] * xywh[3]));
        prop_assert_eq!(ann.iscrowd(), Some(0));
        prop_assert!(!ann.is_prediction());
    }

    #[test]
    fn wrong_bbox_arity_is_a_validation_error(len in 0usize..10) {
        prop_assume!(len != 4);
        let bbox = vec![1.0; len];
        let err = AnnotationInfo::object_detection("img", "cat", &bbox).unwrap_err();
        prop_assert!(matches!(err, FieldError::FieldValidation(_)));
        prop_assert_eq!(err.field(), "bbox");
    }

    #[test]
    fn equality_ignores_generated_ids(
        (task, fields) in proptest_helpers::arb_task()
            .prop_flat_map(|task| (Just(task), proptest_helpers::arb_annotation_fields(task)))
    ) {
        let a = AnnotationInfo::new(task, fields.clone()).expect("first");
        let b = AnnotationInfo::new(task, fields).expect("second");
        prop_assert_ne!(a.id(), b.id());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn update_without_overrides_is_identity(
        (task, fields) in proptest_helpers::arb_task()
            .prop_flat_map(|task| (Just(task), proptest_helpers::arb_annotation_fields(task)))
    ) {
        let ann = AnnotationInfo::new(task, fields).expect("valid annotation");
        let same = ann.update(AnnotationFields::default()).expect("update");
        prop_assert_eq!(same.id(), ann.id());
        prop_assert_eq!(same, ann);
    }

    #[test]
    fn skeleton_indices_must_point_into_keypoints(
        names in proptest::collection::vec(proptest_helpers::name_strategy(), 1..8),
        a in 0usize..10,
        b in 0usize..10,
    ) {
        let in_range = a < names.len() && b < names.len();
        let result = CategoryInfo::keypoint_detection("person", names, vec![[a, b]]);
        if in_range {
            let cat = result.expect("valid skeleton");
            let restored = CategoryInfo::from_dict(&cat.to_dict()).expect("parse dict");
            prop_assert_eq!(restored, cat);
        } else {
            prop_assert_eq!(result.unwrap_err().field(), "skeleton");
        }
    }

    #[test]
    fn category_dict_roundtrip(
        task in proptest_helpers::arb_task(),
        name in proptest_helpers::name_strategy(),
        supercategory in proptest::option::of(proptest_helpers::name_strategy()),
    ) {
        prop_assume!(task != TaskType::KeypointDetection);
        let cat = CategoryInfo::new(
            task,
            CategoryFields { name: Some(name), supercategory, ..Default::default() },
        )
        .expect("valid category");
        let restored = CategoryInfo::from_dict(&cat.to_dict()).expect("parse dict");
        prop_assert_eq!(restored.id(), cat.id());
        prop_assert_eq!(restored, cat);
    }

    #[test]
    fn image_dict_roundtrip(
        file_name in proptest_helpers::file_name_strategy(),
        original in proptest::option::of(proptest_helpers::file_name_strategy()),
        width in 1u32..10_000,
        height in 1u32..10_000,
        split in proptest::option::of(proptest_helpers::arb_split()),
        labeled in proptest::option::of(any::<bool>()),
    ) {
        let img = ImageInfo::new(ImageFields {
            file_name: Some(file_name.clone()),
            width: Some(width),
            height: Some(height),
            original_file_name: original.clone(),
            split,
            labeled,
            ..Default::default()
        })
        .expect("valid image");

        let source = original.unwrap_or(file_name);
        prop_assert_eq!(img.original_file_name(), source.as_str());
        prop_assert!(img.ext().is_some_and(|ext| source.ends_with(ext)));

        let restored = ImageInfo::from_dict(&img.to_dict()).expect("parse dict");
        prop_assert_eq!(restored.id(), img.id());
        prop_assert_eq!(restored, img);
    }
}
