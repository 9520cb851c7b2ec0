//! # Write Actions
//!
//! All writes go through a single `write` request carrying the saved, indexed and deleted
//! objects as repeated parameters.
use super::{WebDatabase, WriteBatch};
use crate::{
    error::DatabaseError,
    protocol::{Action, params},
    state::State,
    transport::Transport,
};

impl<T: Transport> WebDatabase<T> {
    /// Sends a batch of writes in one request.
    ///
    /// The payload of the response is ignored: the batch succeeded unless an error is returned.
    pub fn write(&self, batch: &WriteBatch) -> Result<(), DatabaseError> {
        let request = self
            .params(Action::Write, None)?
            .with_states(params::SAVES, &batch.saves)?
            .with_states(params::INDEXES, &batch.indexes)?
            .with_states(params::DELETES, &batch.deletes)?;

        self.send(&request)?;
        Ok(())
    }

    /// Saves a single object.
    pub fn save(&self, state: &State) -> Result<(), DatabaseError> {
        self.write(&WriteBatch::new().save(state.clone()))
    }

    /// Re-indexes a single object without changing its fields.
    pub fn index(&self, state: &State) -> Result<(), DatabaseError> {
        self.write(&WriteBatch::new().index(state.clone()))
    }

    /// Deletes a single object.
    pub fn delete(&self, state: &State) -> Result<(), DatabaseError> {
        self.write(&WriteBatch::new().delete(state.clone()))
    }
}
