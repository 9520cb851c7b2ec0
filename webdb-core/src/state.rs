//! # Object and Query State
//!
//! Both persisted objects and queries travel over the wire as flat JSON field maps.
//! This module defines the two in-process models and their reduction to such maps.
//!
//! Two keys are reserved in every field map:
//!
//! * [`TYPE_KEY`] holds a type identifier in-process and a type name on the wire.
//! * [`ID_KEY`] holds the object identifier.
use serde_json::Value;
use uuid::Uuid;

/// Reserved key holding the type of an object.
pub const TYPE_KEY: &str = "_type";

/// Reserved key holding the identifier of an object.
pub const ID_KEY: &str = "_id";

/// A flat or nested JSON representation of an object's fields.
pub type FieldMap = serde_json::Map<String, Value>;

/// The mutable field map of a persisted object.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    id: Uuid,
    type_id: Option<Uuid>,
    values: FieldMap,
}

impl State {
    /// Creates an empty state with a fresh identifier.
    pub fn new(type_id: Option<Uuid>) -> Self {
        Self::with_id(Uuid::new_v4(), type_id)
    }

    pub fn with_id(id: Uuid, type_id: Option<Uuid>) -> Self {
        Self {
            id,
            type_id,
            values: FieldMap::new(),
        }
    }

    /// Builds a state from a field map, honoring the reserved keys.
    ///
    /// A missing or malformed `_id` gets a fresh identifier.
    pub fn from_simple_values(values: FieldMap) -> Self {
        let id = values.get(ID_KEY).and_then(parse_uuid).unwrap_or_else(Uuid::new_v4);
        let mut state = Self::with_id(id, None);
        state.put_all(values);
        state
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn type_id(&self) -> Option<Uuid> {
        self.type_id
    }

    pub fn set_type_id(&mut self, type_id: Option<Uuid>) {
        self.type_id = type_id;
    }

    /// Returns the non-reserved fields.
    pub fn values(&self) -> &FieldMap {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Sets a field, returning the previous value.
    ///
    /// The reserved keys update the identifier and the type instead of the field map,
    /// and are ignored when their value is not a UUID.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();

        match key.as_str() {
            ID_KEY => {
                if let Some(id) = parse_uuid(&value) {
                    self.id = id;
                }
                None
            }
            TYPE_KEY => {
                if let Some(type_id) = parse_uuid(&value) {
                    self.type_id = Some(type_id);
                }
                None
            }
            _ => self.values.insert(key, value),
        }
    }

    /// Copies every entry of `values` into this state, overwriting existing fields.
    pub fn put_all(&mut self, values: FieldMap) {
        for (key, value) in values {
            self.put(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Reduces this state to the field map sent over the wire.
    pub fn simple_values(&self) -> FieldMap {
        let mut map = self.values.clone();
        map.insert(ID_KEY.to_string(), Value::String(self.id.to_string()));
        if let Some(type_id) = self.type_id {
            map.insert(TYPE_KEY.to_string(), Value::String(type_id.to_string()));
        }
        map
    }
}

impl From<FieldMap> for State {
    fn from(values: FieldMap) -> Self {
        State::from_simple_values(values)
    }
}

/// A description of the objects to read.
///
/// The query model itself is evaluated remotely; in-process it only needs to be reducible
/// to a field map through [`Query::simple_values`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    object_type: Option<Uuid>,
    values: FieldMap,
}

impl Query {
    /// A query over objects of every type.
    pub fn from_all() -> Self {
        Self::default()
    }

    /// A query over objects of the given type.
    pub fn from_type(type_id: Uuid) -> Self {
        Self {
            object_type: Some(type_id),
            values: FieldMap::new(),
        }
    }

    /// The type of objects this query expects, if any.
    pub fn object_type(&self) -> Option<Uuid> {
        self.object_type
    }

    /// Sets an arbitrary query field.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn predicate(self, predicate: impl Into<String>) -> Self {
        self.with("predicate", predicate.into())
    }

    pub fn sort_ascending(self, field: impl Into<String>) -> Self {
        self.sort("ascending", field.into())
    }

    pub fn sort_descending(self, field: impl Into<String>) -> Self {
        self.sort("descending", field.into())
    }

    fn sort(mut self, order: &str, field: String) -> Self {
        let sorter = serde_json::json!([order, field]);
        match self.values.get_mut("sorters") {
            Some(Value::Array(sorters)) => sorters.push(sorter),
            _ => {
                self.values
                    .insert("sorters".to_string(), Value::Array(vec![sorter]));
            }
        }
        self
    }

    /// Reduces this query to a field map. The expected type, if any, is stored under
    /// [`TYPE_KEY`] as a type identifier.
    pub fn simple_values(&self) -> FieldMap {
        let mut map = self.values.clone();
        if let Some(type_id) = self.object_type {
            map.insert(TYPE_KEY.to_string(), Value::String(type_id.to_string()));
        }
        map
    }
}

/// Interprets a JSON value as a UUID, if it is a string holding one.
pub(crate) fn parse_uuid(value: &Value) -> Option<Uuid> {
    value.as_str().and_then(|s| Uuid::parse_str(s.trim()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_values_include_reserved_keys() {
        let type_id = Uuid::new_v4();
        let mut state = State::new(Some(type_id));
        state.put("name", "Ada");

        let map = state.simple_values();
        assert_eq!(map[ID_KEY], json!(state.id().to_string()));
        assert_eq!(map[TYPE_KEY], json!(type_id.to_string()));
        assert_eq!(map["name"], json!("Ada"));
    }

    #[test]
    fn test_put_all_overwrites_and_routes_reserved_keys() {
        let id = Uuid::new_v4();
        let mut state = State::new(None);
        state.put("name", "old");

        let mut incoming = FieldMap::new();
        incoming.insert(ID_KEY.into(), json!(id.to_string()));
        incoming.insert(TYPE_KEY.into(), json!("not-a-uuid"));
        incoming.insert("name".into(), json!("new"));
        state.put_all(incoming);

        assert_eq!(state.id(), id);
        assert_eq!(state.type_id(), None);
        assert_eq!(state.get("name"), Some(&json!("new")));
        assert!(state.get(TYPE_KEY).is_none());
    }

    #[test]
    fn test_query_sorters_accumulate() {
        let query = Query::from_all()
            .sort_ascending("name")
            .sort_descending("age");

        assert_eq!(
            query.simple_values()["sorters"],
            json!([["ascending", "name"], ["descending", "age"]])
        );
        assert!(query.simple_values().get(TYPE_KEY).is_none());
    }
}
