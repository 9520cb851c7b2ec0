use crate::{registry::ObjectType, state::State};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// An object read from the remote database.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// The resolved type, `None` when the type could not be resolved.
    object_type: Option<Arc<ObjectType>>,
    state: State,
}

impl Record {
    pub fn new(object_type: Option<Arc<ObjectType>>, state: State) -> Self {
        Self { object_type, state }
    }

    pub fn id(&self) -> Uuid {
        self.state.id()
    }

    pub fn object_type(&self) -> Option<&Arc<ObjectType>> {
        self.object_type.as_ref()
    }

    /// Whether the record's type was resolved.
    pub fn is_typed(&self) -> bool {
        self.object_type.is_some()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut self.state
    }

    pub fn into_state(self) -> State {
        self.state
    }

    /// Converts the record's fields, including `_id` and `_type`, into a domain struct.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.state.simple_values()))
    }
}

/// One page of a paginated read.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub offset: u64,
    pub limit: u32,
    /// The total number of items matching the query, across all pages.
    pub count: u64,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(offset: u64, limit: u32, count: u64, items: Vec<T>) -> Self {
        Self {
            offset,
            limit,
            count,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.next_offset() < self.count
    }

    pub fn next_offset(&self) -> u64 {
        self.offset.saturating_add(u64::from(self.limit))
    }

    pub fn has_previous(&self) -> bool {
        self.offset > 0
    }

    pub fn previous_offset(&self) -> u64 {
        self.offset.saturating_sub(u64::from(self.limit))
    }

    /// One-based index of the first item on this page.
    pub fn first_item_index(&self) -> u64 {
        self.offset.saturating_add(1)
    }

    /// One-based index of the last item on this page.
    pub fn last_item_index(&self) -> u64 {
        self.offset.saturating_add(self.items.len() as u64)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            offset: self.offset,
            limit: self.limit,
            count: self.count,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// The objects written by a single `write` request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    pub saves: Vec<State>,
    pub indexes: Vec<State>,
    pub deletes: Vec<State>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(mut self, state: State) -> Self {
        self.saves.push(state);
        self
    }

    pub fn index(mut self, state: State) -> Self {
        self.indexes.push(state);
        self
    }

    pub fn delete(mut self, state: State) -> Self {
        self.deletes.push(state);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.saves.is_empty() && self.indexes.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.saves.len() + self.indexes.len() + self.deletes.len()
    }
}
