//! Fuzz target for image dict parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run image_dict_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use waffle_dough::field::ImageInfo;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let Ok(Value::Object(dict)) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    if let Ok(img) = ImageInfo::from_dict(&dict) {
        let again = ImageInfo::from_dict(&img.to_dict()).expect("round trip parses");
        assert_eq!(again, img);
    }
});
