//! # Result Materialization
//!
//! Converts the untyped payload of a response into the result expected by each action.
//!
//! Objects are rebuilt from their field maps: the `_type` entry (a type identifier or a type
//! name) is resolved through the endpoint's [`DatabaseEnvironment`], the `_id` entry becomes the
//! object identifier and every other entry is copied into the object's [`State`].
use crate::{
    client::{Page, Record},
    environment::DatabaseEnvironment,
    error::DatabaseError,
    registry::TypeLookup,
    state::{FieldMap, ID_KEY, Query, State, TYPE_KEY, parse_uuid},
};
use chrono::{DateTime, Utc};
use serde_json::Value;

const ITEMS_KEY: &str = "items";
const COUNT_KEY: &str = "count";

/// Builds typed results for one query against one environment.
#[derive(Debug, Clone, Copy)]
pub struct Materializer<'a> {
    environment: &'a DatabaseEnvironment,
    query: Option<&'a Query>,
}

impl<'a> Materializer<'a> {
    pub fn new(environment: &'a DatabaseEnvironment, query: Option<&'a Query>) -> Self {
        Self { environment, query }
    }

    /// Materializes a single field map. `null` yields `None`.
    pub fn record(&self, payload: Value) -> Result<Option<Record>, DatabaseError> {
        match payload {
            Value::Null => Ok(None),
            Value::Object(map) => Ok(Some(self.object(map))),
            other => Err(DatabaseError::UnexpectedPayload {
                expected: "an object",
                value: other,
            }),
        }
    }

    /// Materializes a list of field maps, preserving their order.
    pub fn records(&self, payload: Value) -> Result<Vec<Record>, DatabaseError> {
        let items = match payload {
            Value::Array(items) => items,
            other => {
                return Err(DatabaseError::UnexpectedPayload {
                    expected: "an array of objects",
                    value: other,
                });
            }
        };

        items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => Ok(self.object(map)),
                other => Err(DatabaseError::UnexpectedPayload {
                    expected: "an object",
                    value: other,
                }),
            })
            .collect()
    }

    fn object(&self, map: FieldMap) -> Record {
        let object_type = map.get(TYPE_KEY).and_then(|t| self.environment.resolve(t));
        let mut state = match map.get(ID_KEY) {
            Some(raw) => match parse_uuid(raw) {
                Some(id) => State::with_id(id, None),
                None => {
                    let state = State::new(None);
                    tracing::debug!(
                        remote_id = %raw,
                        id = %state.id(),
                        "record id is not a UUID, using a fresh id"
                    );
                    state
                }
            },
            None => State::new(None),
        };
        state.put_all(map);
        // Unresolved types fall back to an untyped record.
        state.set_type_id(object_type.as_ref().map(|t| t.id));

        if let Some(expected) = self.query.and_then(Query::object_type)
            && object_type.as_ref().map(|t| t.id) != Some(expected)
        {
            tracing::debug!(
                id = %state.id(),
                %expected,
                actual = ?object_type.as_ref().map(|t| t.internal_name.as_str()),
                "record type differs from the query type"
            );
        }

        Record::new(object_type, state)
    }

    /// Materializes an `{items, count}` payload into a page of records.
    pub fn page(&self, payload: Value, offset: u64, limit: u32) -> Result<Page<Record>, DatabaseError> {
        let (items, count) = page_parts(payload)?;
        Ok(Page::new(offset, limit, count, self.records(items)?))
    }
}

/// Splits an `{items, count}` payload, keeping the items untouched.
pub fn page_parts(payload: Value) -> Result<(Value, u64), DatabaseError> {
    let mut map = match payload {
        Value::Object(map) => map,
        other => {
            return Err(DatabaseError::UnexpectedPayload {
                expected: "an object with 'items' and 'count'",
                value: other,
            });
        }
    };

    let count_value = map.remove(COUNT_KEY).unwrap_or(Value::Null);
    let total = u64::try_from(count(count_value.clone())?).map_err(|_| DatabaseError::Coercion {
        expected: "a non-negative count",
        value: count_value,
    })?;

    let items = match map.remove(ITEMS_KEY) {
        Some(Value::Null) | None => Value::Array(Vec::new()),
        Some(items) => items,
    };

    Ok((items, total))
}

/// Interprets a scalar as a 64-bit count.
///
/// Integers are taken as is, floats are truncated, strings are parsed and `null` counts as zero.
pub fn count(payload: Value) -> Result<i64, DatabaseError> {
    let parsed = match &payload {
        Value::Null => Some(0),
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f.trunc() as i64)
            })
        }
        _ => None,
    };

    parsed.ok_or(DatabaseError::Coercion {
        expected: "a 64-bit integer",
        value: payload,
    })
}

/// Interprets a scalar as a timestamp.
///
/// Numbers are milliseconds since the Unix epoch; strings are RFC 3339 dates or numeric
/// milliseconds; `null` means there is no timestamp.
pub fn timestamp(payload: Value) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    let parsed = match &payload {
        Value::Null => return Ok(None),
        Value::Number(_) => count(payload.clone())
            .ok()
            .and_then(DateTime::from_timestamp_millis),
        Value::String(s) => DateTime::parse_from_rfc3339(s.trim())
            .map(|date| date.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                s.trim()
                    .parse::<i64>()
                    .ok()
                    .and_then(DateTime::from_timestamp_millis)
            }),
        _ => None,
    };

    parsed.map(Some).ok_or(DatabaseError::Coercion {
        expected: "a timestamp",
        value: payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::RemoteEndpoint,
        registry::{ObjectType, TypeRegistry},
    };
    use serde_json::json;
    use uuid::Uuid;

    fn environment(types: TypeRegistry) -> DatabaseEnvironment {
        DatabaseEnvironment::new(RemoteEndpoint::new("http://db.local/api"), types)
    }

    #[test]
    fn test_record_resolves_type_by_name_and_id() {
        let type_id = Uuid::new_v4();
        let object_id = Uuid::new_v4();
        let env = environment([ObjectType::new(type_id, "demo.Article")].into_iter().collect());
        let materializer = Materializer::new(&env, None);

        for type_value in [json!("demo.Article"), json!(type_id.to_string())] {
            let record = materializer
                .record(json!({ "_type": type_value, "_id": object_id.to_string(), "title": "Hi" }))
                .unwrap()
                .unwrap();

            assert_eq!(record.id(), object_id);
            assert_eq!(record.object_type().unwrap().internal_name, "demo.Article");
            assert_eq!(record.state().type_id(), Some(type_id));
            assert_eq!(record.get("title"), Some(&json!("Hi")));
            assert!(record.get("_type").is_none());
        }
    }

    #[test]
    fn test_unresolved_type_falls_back_to_untyped_record() {
        let env = environment(TypeRegistry::new());
        let record = Materializer::new(&env, None)
            .record(json!({ "_type": "demo.Unknown", "body": [1, 2] }))
            .unwrap()
            .unwrap();

        assert!(!record.is_typed());
        assert_eq!(record.state().type_id(), None);
        assert_eq!(record.get("body"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_malformed_id_gets_a_fresh_id() {
        let env = environment(TypeRegistry::new());
        let materializer = Materializer::new(&env, None);
        let payload = json!({ "_id": "legacy-7", "title": "Old" });

        let first = materializer.record(payload.clone()).unwrap().unwrap();
        let second = materializer.record(payload).unwrap().unwrap();

        assert!(!first.id().is_nil());
        assert_ne!(first.id(), second.id());
        assert_eq!(first.get("title"), Some(&json!("Old")));
        assert!(first.get("_id").is_none());
    }

    #[test]
    fn test_expected_type_is_not_a_filter() {
        let article = Uuid::new_v4();
        let author = Uuid::new_v4();
        let env = environment(
            [
                ObjectType::new(article, "demo.Article"),
                ObjectType::new(author, "demo.Author"),
            ]
            .into_iter()
            .collect(),
        );
        let query = Query::from_type(article);

        let records = Materializer::new(&env, Some(&query))
            .records(json!([{ "_type": "demo.Author" }, { "_type": "demo.Article" }]))
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].object_type().unwrap().id, author);
        assert_eq!(records[1].object_type().unwrap().id, article);
    }

    #[test]
    fn test_first_record_may_be_absent() {
        let env = environment(TypeRegistry::new());
        let materializer = Materializer::new(&env, None);

        assert!(materializer.record(Value::Null).unwrap().is_none());
        assert!(matches!(
            materializer.record(json!([1])),
            Err(DatabaseError::UnexpectedPayload { .. })
        ));
        assert!(matches!(
            materializer.records(json!([{}, null])),
            Err(DatabaseError::UnexpectedPayload { .. })
        ));
    }

    #[test]
    fn test_page_keeps_caller_bounds() {
        let env = environment(TypeRegistry::new());
        let page = Materializer::new(&env, None)
            .page(
                json!({ "items": [{ "n": "A" }, { "n": "B" }, { "n": "C" }], "count": 42 }),
                10,
                5,
            )
            .unwrap();

        assert_eq!((page.offset, page.limit, page.count), (10, 5, 42));
        let names: Vec<_> = page.items.iter().map(|r| r.get("n").unwrap().clone()).collect();
        assert_eq!(names, [json!("A"), json!("B"), json!("C")]);

        assert!(matches!(
            page_parts(json!({ "items": [], "count": -1 })),
            Err(DatabaseError::Coercion { .. })
        ));
    }

    #[test]
    fn test_count_coercion() {
        assert_eq!(count(json!(17)).unwrap(), 17);
        assert_eq!(count(json!(17.9)).unwrap(), 17);
        assert_eq!(count(json!(" 42 ")).unwrap(), 42);
        assert_eq!(count(Value::Null).unwrap(), 0);
        assert!(matches!(
            count(json!("many")),
            Err(DatabaseError::Coercion { .. })
        ));
        assert!(count(json!({ "count": 1 })).is_err());
    }

    #[test]
    fn test_timestamp_coercion() {
        let expected = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();

        assert_eq!(timestamp(json!(1_700_000_000_123_i64)).unwrap(), Some(expected));
        assert_eq!(timestamp(json!("1700000000123")).unwrap(), Some(expected));
        assert_eq!(
            timestamp(json!("2023-11-14T22:13:20.123Z")).unwrap(),
            Some(expected)
        );
        assert_eq!(timestamp(Value::Null).unwrap(), None);
        assert!(timestamp(json!("yesterday")).is_err());
    }
}
