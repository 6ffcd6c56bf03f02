// Property-based tests for the transform session
#[cfg(test)]
#[allow(clippy::module_inception)] // Test module structure
mod property_tests {
    use quickcheck::{Arbitrary, Gen, TestResult};
    use quickcheck_macros::quickcheck;
    use serde_json::{Map, Value};

    use crate::change::ChangeKind;
    use crate::path::{parse_path, PathSegment};
    use crate::session::TransformSession;

    // Wrapper for a mapping-rooted document
    #[derive(Clone, Debug)]
    struct ArbDoc(Map<String, Value>);

    impl Arbitrary for ArbDoc {
        fn arbitrary(g: &mut Gen) -> Self {
            ArbDoc(arbitrary_map(g, 0))
        }
    }

    #[derive(Clone, Debug)]
    struct ArbValue(Value);

    impl Arbitrary for ArbValue {
        fn arbitrary(g: &mut Gen) -> Self {
            ArbValue(arbitrary_value(g, 0))
        }
    }

    fn arbitrary_map(g: &mut Gen, depth: usize) -> Map<String, Value> {
        let len = usize::arbitrary(g) % 5;
        let mut obj = Map::new();
        for _ in 0..len {
            let key = format!("key{}", u8::arbitrary(g) % 16);
            obj.insert(key, arbitrary_value(g, depth + 1));
        }
        obj
    }

    // Helper function to generate arbitrary JSON values with depth limit
    fn arbitrary_value(g: &mut Gen, depth: usize) -> Value {
        let choices = if depth > 4 { 4 } else { 6 };
        match u8::arbitrary(g) % choices {
            0 => Value::Null,
            1 => Value::Bool(bool::arbitrary(g)),
            2 => Value::Number(serde_json::Number::from(i32::arbitrary(g))),
            3 => Value::String(String::arbitrary(g)),
            4 => {
                let len = usize::arbitrary(g) % 5;
                Value::Array((0..len).map(|_| arbitrary_value(g, depth + 1)).collect())
            }
            _ => Value::Object(arbitrary_map(g, depth)),
        }
    }

    #[quickcheck]
    fn prop_update_is_idempotent_at_root(doc: ArbDoc, values: ArbDoc) -> bool {
        let mut session = TransformSession::new(doc.0);
        let Ok(once) = session
            .execute_transform("", ChangeKind::Update, None, Some(&values.0))
            .cloned()
        else {
            return false;
        };
        let Ok(twice) = session.execute_transform("", ChangeKind::Update, None, Some(&values.0))
        else {
            return false;
        };
        once == *twice
    }

    #[quickcheck]
    fn prop_update_is_idempotent_at_field(doc: ArbDoc, values: ArbDoc) -> bool {
        let mut session = TransformSession::new(doc.0);
        let once = session
            .execute_transform("target.inner", ChangeKind::Update, None, Some(&values.0))
            .cloned();
        let twice = session
            .execute_transform("target.inner", ChangeKind::Update, None, Some(&values.0))
            .cloned();
        matches!((once, twice), (Ok(a), Ok(b)) if a == b)
    }

    #[quickcheck]
    fn prop_add_twice_doubles_appended_elements(
        doc: ArbDoc,
        existing: Vec<ArbValue>,
        added: Vec<ArbValue>,
    ) -> bool {
        let mut doc = doc.0;
        doc.insert(
            "items".to_string(),
            Value::Array(existing.iter().map(|v| v.0.clone()).collect()),
        );
        let mut values = Map::new();
        values.insert(
            "items".to_string(),
            Value::Array(added.iter().map(|v| v.0.clone()).collect()),
        );

        let mut session = TransformSession::new(doc);
        for _ in 0..2 {
            if session
                .execute_transform("", ChangeKind::Add, None, Some(&values))
                .is_err()
            {
                return false;
            }
        }
        session.document()["items"].as_array().map(Vec::len)
            == Some(existing.len() + 2 * added.len())
    }

    #[quickcheck]
    fn prop_transform_keeps_siblings(doc: ArbDoc, sibling: ArbValue, value: String) -> bool {
        let mut doc = doc.0;
        doc.insert("sibling".to_string(), sibling.0.clone());
        let mut session = TransformSession::new(doc);
        session
            .execute_transform("target.name", ChangeKind::Update, Some(&value), None)
            .is_ok()
            && session.document()["sibling"] == sibling.0
            && session.document()["target"]["name"] == Value::String(value)
    }

    #[quickcheck]
    fn prop_delete_absent_is_noop(doc: ArbDoc) -> bool {
        let before = doc.0.clone();
        let mut session = TransformSession::new(doc.0);
        session
            .execute_transform("absent", ChangeKind::Delete, None, None)
            .is_ok()
            && *session.document() == before
    }

    #[quickcheck]
    fn prop_delete_root_or_element_rejected(doc: ArbDoc, idx: usize) -> bool {
        let before = doc.0.clone();
        let mut session = TransformSession::new(doc.0);
        let element_path = format!("key0[{idx}]");
        ["", ".", element_path.as_str(), "key0.[-]", "key0[a=b]"]
            .iter()
            .all(|path| {
                session
                    .execute_transform(path, ChangeKind::Delete, None, None)
                    .is_err()
            })
            && *session.document() == before
    }

    #[quickcheck]
    fn prop_parse_path_never_panics(path: String) -> bool {
        let _ = parse_path(&path);
        true
    }

    #[quickcheck]
    fn prop_dotted_keys_parse_as_mapping_chain(ids: Vec<u8>) -> TestResult {
        if ids.is_empty() {
            return TestResult::discard();
        }
        let keys: Vec<String> = ids.iter().map(|id| format!("k{id}")).collect();
        let Ok(segments) = parse_path(&keys.join(".")) else {
            return TestResult::failed();
        };

        let (last, init) = match segments.split_last() {
            Some(split) => split,
            None => return TestResult::failed(),
        };
        let chain_ok = init
            .iter()
            .zip(&keys)
            .all(|(segment, key)| *segment == PathSegment::Map(key.clone()));
        let last_ok = keys.last().map(|key| PathSegment::Scalar(key.clone())).as_ref() == Some(last);
        TestResult::from_bool(segments.len() == keys.len() && chain_ok && last_ok)
    }

    #[quickcheck]
    fn prop_depth_validation_rejects_deep_documents(val: ArbValue) -> bool {
        let mut deep = val.0;
        for _ in 0..1010 {
            deep = Value::Object(Map::from_iter([("nested".to_string(), deep)]));
        }
        crate::validate_depth(&deep, crate::MAX_DOCUMENT_DEPTH).is_err()
    }

    #[quickcheck]
    fn prop_depth_validation_accepts_generated_documents(doc: ArbDoc) -> bool {
        crate::validate_depth(&Value::Object(doc.0), crate::MAX_DOCUMENT_DEPTH).is_ok()
    }
}
