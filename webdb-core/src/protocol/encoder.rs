//! # Request Encoder
//!
//! Builds the ordered form parameters of a request.
//!
//! Every request starts with the `action`, followed by the remote `database` name when one is
//! configured and the JSON-encoded `query` when one is supplied. Paginated reads then append
//! `offset` and `limit`; writes append one parameter per written object under the repeated
//! names `saves`, `indexes` and `deletes`.
use super::{Action, params};
use crate::{
    error::DatabaseError,
    protocol::resolver::resolve_type_names,
    registry::TypeLookup,
    state::{Query, State},
};

/// An ordered list of form parameters. Names may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(Vec<(String, String)>);

impl RequestParams {
    /// Starts the parameters of a request.
    ///
    /// The query, if any, has its type identifiers resolved to type names through `types`
    /// before being encoded.
    pub fn new(
        action: Action,
        database: Option<&str>,
        query: Option<&Query>,
        types: &impl TypeLookup,
    ) -> Result<Self, DatabaseError> {
        let mut params = Self::default();
        params.push(params::ACTION, action.as_str());

        if let Some(database) = database.filter(|db| !db.is_empty()) {
            params.push(params::DATABASE, database);
        }

        if let Some(query) = query {
            let mut values = query.simple_values();
            resolve_type_names(&mut values, types);

            let json = serde_json::to_string(&values).map_err(|source| DatabaseError::Encode {
                name: params::QUERY,
                source,
            })?;
            params.push(params::QUERY, json);
        }

        Ok(params)
    }

    /// Appends the pagination bounds of a partial read.
    pub fn with_pagination(mut self, offset: u64, limit: u32) -> Self {
        self.push(params::OFFSET, offset.to_string());
        self.push(params::LIMIT, limit.to_string());
        self
    }

    /// Appends one JSON-encoded field map per state under the repeated parameter `name`.
    pub fn with_states(mut self, name: &'static str, states: &[State]) -> Result<Self, DatabaseError> {
        for state in states {
            let json = serde_json::to_string(&state.simple_values())
                .map_err(|source| DatabaseError::Encode { name, source })?;
            self.push(name, json);
        }
        Ok(self)
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Returns every value sent under `name`, in order.
    pub fn get_all<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a str> + use<'a, 'n> {
        self.0
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the first value sent under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next()
    }

    pub fn as_slice(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<(String, String)> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ObjectType, TypeRegistry};
    use serde_json::{Value, json};
    use uuid::Uuid;

    fn names(params: &RequestParams) -> Vec<&str> {
        params.as_slice().iter().map(|(k, _)| k.as_str()).collect()
    }

    #[test]
    fn test_read_parameters_are_ordered() {
        let id = Uuid::new_v4();
        let types: TypeRegistry = [ObjectType::new(id, "demo.Article")].into_iter().collect();
        let query = Query::from_type(id).predicate("title = 'x'");

        let params = RequestParams::new(Action::ReadPartial, Some("main"), Some(&query), &types)
            .unwrap()
            .with_pagination(10, 5);

        assert_eq!(
            names(&params),
            ["action", "database", "query", "offset", "limit"]
        );
        assert_eq!(params.get("action"), Some("readPartial"));
        assert_eq!(params.get("database"), Some("main"));
        assert_eq!(params.get("offset"), Some("10"));
        assert_eq!(params.get("limit"), Some("5"));

        let query: Value = serde_json::from_str(params.get("query").unwrap()).unwrap();
        assert_eq!(
            query,
            json!({ "_type": "demo.Article", "predicate": "title = 'x'" })
        );
    }

    #[test]
    fn test_lookup_outlives_the_key() {
        let params =
            RequestParams::new(Action::ReadAll, Some("main"), None, &TypeRegistry::new()).unwrap();

        let database = {
            let key = String::from("database");
            params.get(&key)
        };
        let saves: Vec<&str> = {
            let key = String::from("saves");
            params.get_all(&key).collect()
        };

        assert_eq!(database, Some("main"));
        assert!(saves.is_empty());
    }

    #[test]
    fn test_database_is_omitted_when_missing_or_empty() {
        let types = TypeRegistry::new();

        let without = RequestParams::new(Action::ReadCount, None, None, &types).unwrap();
        let empty = RequestParams::new(Action::ReadCount, Some(""), None, &types).unwrap();

        assert_eq!(names(&without), ["action"]);
        assert_eq!(without, empty);
    }

    #[test]
    fn test_write_parameters_repeat_in_order() {
        let types = TypeRegistry::new();
        let mut first = State::new(None);
        first.put("n", 1);
        let mut second = State::new(None);
        second.put("n", 2);
        let deleted = State::new(None);

        let params = RequestParams::new(Action::Write, None, None, &types)
            .unwrap()
            .with_states(params::SAVES, &[first.clone(), second.clone()])
            .unwrap()
            .with_states(params::INDEXES, &[])
            .unwrap()
            .with_states(params::DELETES, &[deleted.clone()])
            .unwrap();

        assert_eq!(names(&params), ["action", "saves", "saves", "deletes"]);
        assert!(params.get("query").is_none());

        let saves: Vec<Value> = params
            .get_all("saves")
            .map(|raw| serde_json::from_str(raw).unwrap())
            .collect();
        assert_eq!(saves[0]["n"], json!(1));
        assert_eq!(saves[1]["n"], json!(2));
        assert_eq!(saves[1]["_id"], json!(second.id().to_string()));
        assert_eq!(params.get_all("indexes").count(), 0);
        assert_eq!(params.get_all("deletes").count(), 1);
    }
}
