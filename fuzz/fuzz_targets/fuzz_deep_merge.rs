#![no_main]

use doc_transform::merge::{add_merge, update_merge};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    let split = data.len() / 2;
    let (data1, data2) = data.split_at(split);

    if let (Ok(v1), Ok(v2)) = (
        serde_json::from_slice::<Value>(data1),
        serde_json::from_slice::<Value>(data2),
    ) {
        // Update must be idempotent
        let once = update_merge(v1.clone(), v2.clone());
        let twice = update_merge(once.clone(), v2.clone());
        assert_eq!(once, twice, "update merge is not idempotent");

        // Add may fail on kind conflicts but must not panic
        let both_objects = v1.is_object() && v2.is_object();
        if let Ok(merged) = add_merge(v1, v2) {
            if both_objects {
                assert!(merged.is_object(), "mapping merge produced a non-mapping");
            }
        }
    }
});
