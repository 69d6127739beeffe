//! Snapshot round-trip properties

use curljson_io::SnapshotStore;
use proptest::prelude::*;
use serde_json::{Map, Value};
use tempfile::TempDir;

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        any::<u64>().prop_map(Value::from),
        (-1.0e12f64..1.0e12).prop_map(Value::from),
        "\\PC{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec(("\\PC{0,6}", inner), 0..6).prop_map(|entries| {
                let mut map = Map::new();
                for (k, v) in entries {
                    map.insert(k, v);
                }
                Value::Object(map)
            }),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn snapshot_roundtrip_preserves_document(doc in arb_json()) {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("snap.json"));
        store.save(&doc).unwrap();
        let loaded = store.load().unwrap();

        prop_assert_eq!(&loaded, &doc);
        if let (Value::Object(a), Value::Object(b)) = (&loaded, &doc) {
            let ka: Vec<_> = a.keys().collect();
            let kb: Vec<_> = b.keys().collect();
            prop_assert_eq!(ka, kb);
        }
    }
}
