use serde_json::Value;

/// Merges `overrides` into `base`, recursing into mappings present on both
/// sides. Everything else, sequences included, is replaced by the override.
pub fn deep_merge(base: &mut Value, overrides: Value) {
    match (base, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, incoming) in overrides {
                deep_merge(base.entry(key).or_insert(Value::Null), incoming);
            }
        }
        (base, overrides) => *base = overrides,
    }
}
