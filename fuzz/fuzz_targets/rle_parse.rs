//! Fuzz target for RLE wire parsing.
//!
//! Feeds arbitrary bytes through JSON parsing into `Rle::from_value` and, for
//! small images, decodes the result and checks it agrees with the runs.
//!
//! Run with:
//!   cargo +nightly fuzz run rle_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use waffle_dough::geometry::Rle;

/// Largest mask the target will decode.
const MAX_PIXELS: u64 = 1 << 20;

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(rle) = Rle::from_value(&value) else {
        return;
    };

    if rle.image_size().pixel_count() <= MAX_PIXELS {
        let mask = rle.decode().expect("validated rle decodes");
        assert_eq!(mask.area(), rle.area());
        assert_eq!(mask.bounds(), rle.bounds());
        assert_eq!(Rle::encode(&mask).decode().expect("re-encoded rle"), mask);
    }
});
