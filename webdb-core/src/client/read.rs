//! # Read Actions
//!
//! Each read sends the query under its action and materializes the payload into the shape
//! that action returns.
use super::{Page, Record, WebDatabase};
use crate::{
    error::DatabaseError,
    materialize::{self, Materializer},
    protocol::Action,
    state::Query,
    transport::Transport,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

impl<T: Transport> WebDatabase<T> {
    /// Reads every object matching `query`, in the order returned by the server.
    pub fn read_all(&self, query: &Query) -> Result<Vec<Record>, DatabaseError> {
        let params = self.params(Action::ReadAll, Some(query))?;
        let payload = self.send(&params)?;

        let environment = self.environment();
        Materializer::new(&environment, Some(query)).records(payload)
    }

    /// Reads the grouped results of `query`. The payload shape is defined by the server and
    /// is returned as is.
    pub fn read_all_grouped(&self, query: &Query) -> Result<Value, DatabaseError> {
        let params = self.params(Action::ReadAllGrouped, Some(query))?;
        self.send(&params)
    }

    /// Counts the objects matching `query`.
    pub fn read_count(&self, query: &Query) -> Result<i64, DatabaseError> {
        let params = self.params(Action::ReadCount, Some(query))?;
        materialize::count(self.send(&params)?)
    }

    /// Reads the first object matching `query`, if any.
    pub fn read_first(&self, query: &Query) -> Result<Option<Record>, DatabaseError> {
        let params = self.params(Action::ReadFirst, Some(query))?;
        let payload = self.send(&params)?;

        let environment = self.environment();
        Materializer::new(&environment, Some(query)).record(payload)
    }

    /// Reads when the objects matching `query` were last updated.
    pub fn read_last_update(&self, query: &Query) -> Result<Option<DateTime<Utc>>, DatabaseError> {
        let params = self.params(Action::ReadLastUpdate, Some(query))?;
        materialize::timestamp(self.send(&params)?)
    }

    /// Reads one page of the objects matching `query`.
    ///
    /// The returned page carries the given `offset` and `limit` along with the total count
    /// reported by the server.
    pub fn read_partial(
        &self,
        query: &Query,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Record>, DatabaseError> {
        let params = self
            .params(Action::ReadPartial, Some(query))?
            .with_pagination(offset, limit);
        let payload = self.send(&params)?;

        let environment = self.environment();
        Materializer::new(&environment, Some(query)).page(payload, offset, limit)
    }

    /// Reads one page of the grouped results of `query`. Groups are returned as is.
    pub fn read_partial_grouped(
        &self,
        query: &Query,
        offset: u64,
        limit: u32,
    ) -> Result<Page<Value>, DatabaseError> {
        let params = self
            .params(Action::ReadPartialGrouped, Some(query))?
            .with_pagination(offset, limit);
        let (items, count) = materialize::page_parts(self.send(&params)?)?;

        let groups = match items {
            Value::Array(groups) => groups,
            other => {
                return Err(DatabaseError::UnexpectedPayload {
                    expected: "an array of groups",
                    value: other,
                });
            }
        };

        Ok(Page::new(offset, limit, count, groups))
    }
}
