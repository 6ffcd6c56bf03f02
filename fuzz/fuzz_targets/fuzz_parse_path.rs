#![no_main]

use doc_transform::path::{parse_path, PathSegment};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(path) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must never panic, only return errors
    let Ok(segments) = parse_path(path) else {
        return;
    };

    // Every selector follows a sequence key, every sequence key is followed by a selector
    for (idx, segment) in segments.iter().enumerate() {
        let next = segments.get(idx + 1);
        match segment {
            PathSegment::Sequence(_) => {
                assert!(next.is_some_and(PathSegment::is_selector), "dangling sequence key");
            }
            PathSegment::Filter(_) | PathSegment::Index(_) => {
                assert!(
                    idx > 0 && matches!(segments[idx - 1], PathSegment::Sequence(_)),
                    "selector without sequence key"
                );
            }
            PathSegment::Map(_) => {
                assert!(next.is_some_and(|s| !s.is_selector()), "map key not followed by key");
            }
            PathSegment::Scalar(_) => {
                assert!(next.is_none(), "scalar key before end of path");
            }
        }
    }
});
