//! # Type Name Resolution
//!
//! In-process, the reserved `_type` key holds a type identifier. The remote database
//! identifies types by name, so every query is rewritten before it is encoded.
//!
//! The rewrite descends into nested objects and into objects found inside arrays, at any
//! depth. Identifiers that cannot be resolved are left untouched, which also makes the
//! rewrite idempotent: a resolved name no longer parses as an identifier.
use crate::{
    registry::TypeLookup,
    state::{FieldMap, TYPE_KEY, parse_uuid},
};
use serde_json::Value;

/// Replaces, in place, every resolvable type identifier under [`TYPE_KEY`] with its type name.
pub fn resolve_type_names(map: &mut FieldMap, types: &impl TypeLookup) {
    for (key, value) in map.iter_mut() {
        if key == TYPE_KEY {
            if let Some(object_type) = parse_uuid(value).and_then(|id| types.by_id(&id)) {
                *value = Value::String(object_type.internal_name.clone());
            }
            continue;
        }

        match value {
            Value::Object(nested) => resolve_type_names(nested, types),
            Value::Array(items) => {
                for item in items {
                    if let Value::Object(nested) = item {
                        resolve_type_names(nested, types);
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ObjectType, TypeRegistry};
    use serde_json::json;
    use uuid::Uuid;

    fn as_map(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            other => panic!("Expected an object, got {other}"),
        }
    }

    fn registry(id: Uuid) -> TypeRegistry {
        [ObjectType::new(id, "demo.Author")].into_iter().collect()
    }

    #[test]
    fn test_resolves_top_level_and_nested_identifiers() {
        let id = Uuid::new_v4();
        let mut map = as_map(json!({
            "_type": id.to_string(),
            "predicate": "author = ?",
            "parameters": {
                "author": { "_type": id.to_string(), "_id": "abc" }
            }
        }));

        resolve_type_names(&mut map, &registry(id));

        assert_eq!(
            Value::Object(map),
            json!({
                "_type": "demo.Author",
                "predicate": "author = ?",
                "parameters": {
                    "author": { "_type": "demo.Author", "_id": "abc" }
                }
            })
        );
    }

    #[test]
    fn test_resolves_objects_inside_arrays_and_skips_scalars() {
        let id = Uuid::new_v4();
        let mut map = as_map(json!({
            "values": [
                { "_type": id.to_string() },
                id.to_string(),
                7,
                [{ "_type": id.to_string() }]
            ]
        }));

        resolve_type_names(&mut map, &registry(id));

        // Arrays nested directly in arrays are not descended into.
        assert_eq!(
            Value::Object(map),
            json!({
                "values": [
                    { "_type": "demo.Author" },
                    id.to_string(),
                    7,
                    [{ "_type": id.to_string() }]
                ]
            })
        );
    }

    #[test]
    fn test_unresolved_identifiers_are_left_unchanged() {
        let unknown = Uuid::new_v4().to_string();
        let original = json!({
            "_type": unknown,
            "nested": { "_type": "already.AName" },
            "other": { "_type": 12 }
        });
        let mut map = as_map(original.clone());

        resolve_type_names(&mut map, &registry(Uuid::new_v4()));

        assert_eq!(Value::Object(map), original);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let id = Uuid::new_v4();
        let types = registry(id);
        let mut once = as_map(json!({
            "_type": id.to_string(),
            "list": [{ "inner": { "_type": id.to_string() } }]
        }));

        resolve_type_names(&mut once, &types);
        let mut twice = once.clone();
        resolve_type_names(&mut twice, &types);

        assert_eq!(once, twice);
    }
}
