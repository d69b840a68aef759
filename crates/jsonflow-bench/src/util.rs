use serde_json::{Map, Value, json};

/// A document shaped like a typical API dump: `record_count` records, each
/// an object with a few scalars, a nested object and a small array.
pub fn generate_records(record_count: usize) -> Value {
    let records = (0..record_count)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("record_{i}"),
                "active": i % 3 == 0,
                "score": i as f64 * 0.5,
                "owner": {"login": format!("user_{}", i % 97), "email": null},
                "tags": ["alpha", "beta", {"weight": i % 7}],
            })
        })
        .collect();
    Value::Array(records)
}

/// One flat object with `key_count` scalar keys.
pub fn generate_flat_object(key_count: usize) -> Value {
    let mut map = Map::new();
    for i in 0..key_count {
        map.insert(format!("key_{i}"), Value::from(i));
    }
    Value::Object(map)
}
