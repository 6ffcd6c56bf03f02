#![no_main]

use doc_transform::{ChangeKind, TransformSession};
use libfuzzer_sys::fuzz_target;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    // First line is the path, the rest a JSON document
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Some((path, body)) = text.split_once('\n') else {
        return;
    };
    let Ok(Value::Object(doc)) = serde_json::from_str::<Value>(body) else {
        return;
    };

    let values = doc.clone();
    let mut session = TransformSession::new(doc);

    for kind in [ChangeKind::Add, ChangeKind::Update, ChangeKind::Delete] {
        let before = session.document().clone();
        let subtree = (kind != ChangeKind::Delete).then_some(&values);
        if session.execute_transform(path, kind, None, subtree).is_err() {
            // Failed transforms must not leak partial mutations
            assert_eq!(&before, session.document(), "document changed by failed transform");
        }
    }
});
