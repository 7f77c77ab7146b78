//! Fuzz target for category dict parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run category_dict_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use serde_json::Value;
use waffle_dough::field::CategoryInfo;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }
    let Ok(Value::Object(dict)) = serde_json::from_slice::<Value>(data) else {
        return;
    };

    if let Ok(cat) = CategoryInfo::from_dict(&dict) {
        let again = CategoryInfo::from_dict(&cat.to_dict()).expect("round trip parses");
        assert_eq!(again, cat);
    }
});
