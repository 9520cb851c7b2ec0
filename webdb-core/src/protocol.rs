//! # Web Database Protocol
//!
//! This module contains the building blocks of the request/response protocol spoken with
//! the remote database.
//!
//! Requests are form-encoded parameter lists whose `action` selects the server-side
//! behavior. Responses are JSON envelopes of the shape `{"status": "ok"|"error", "result": ...}`.
pub mod encoder;
pub mod envelope;
pub mod resolver;

/// Names of the form parameters sent to the remote database.
pub mod params {
    pub const ACTION: &str = "action";
    pub const DATABASE: &str = "database";
    pub const QUERY: &str = "query";
    pub const OFFSET: &str = "offset";
    pub const LIMIT: &str = "limit";
    pub const SAVES: &str = "saves";
    pub const INDEXES: &str = "indexes";
    pub const DELETES: &str = "deletes";
}

pub const STATUS_KEY: &str = "status";
pub const RESULT_KEY: &str = "result";

pub const OK_STATUS: &str = "ok";

/// The remote operations understood by the database endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ReadAll,
    ReadAllGrouped,
    ReadCount,
    ReadFirst,
    ReadLastUpdate,
    ReadPartial,
    ReadPartialGrouped,
    Write,
}

impl Action {
    /// Returns the wire name of the action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ReadAll => "readAll",
            Action::ReadAllGrouped => "readAllGrouped",
            Action::ReadCount => "readCount",
            Action::ReadFirst => "readFirst",
            Action::ReadLastUpdate => "readLastUpdate",
            Action::ReadPartial => "readPartial",
            Action::ReadPartialGrouped => "readPartialGrouped",
            Action::Write => "write",
        }
    }
}
