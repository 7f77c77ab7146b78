//! Fuzz target for annotation dict parsing.
//!
//! Anything that parses must survive a `to_dict`/`from_dict` round trip.
//!
//! Run with:
//!   cargo +nightly fuzz run annotation_dict_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use waffle_dough::field::AnnotationInfo;

/// RLE segmentations are decoded during construction; skip huge images.
const MAX_PIXELS: u64 = 1 << 20;

fn rle_pixels(dict: &serde_json::Map<String, Value>) -> u64 {
    dict.get("segmentation")
        .and_then(|seg| seg.get("size"))
        .and_then(Value::as_array)
        .map(|dims| {
            dims.iter()
                .filter_map(Value::as_u64)
                .fold(1u64, u64::saturating_mul)
        })
        .unwrap_or(0)
}

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let Ok(Value::Object(dict)) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    if rle_pixels(&dict) > MAX_PIXELS {
        return;
    }

    if let Ok(ann) = AnnotationInfo::from_dict(&dict) {
        let again = AnnotationInfo::from_dict(&ann.to_dict()).expect("round trip parses");
        assert_eq!(again, ann);
    }
});
