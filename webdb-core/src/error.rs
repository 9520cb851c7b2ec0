//! # Errors
//!
//! Every failing database operation surfaces a single [`DatabaseError`], whatever stage of
//! the exchange failed. Remote messages are displayed verbatim.
use crate::transport::TransportError;
use serde_json::Value;

/// Errors that can occur while executing an action against a remote database.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Transport failure: '{0}'")]
    Transport(#[from] TransportError),

    /// The response body was not a JSON object.
    #[error("Server didn't return a valid response! ({raw})")]
    InvalidResponse { raw: String },

    /// The server reported an error with a message.
    #[error("{0}")]
    Remote(String),

    /// The server reported an error without a usable message.
    #[error("Unknown error! ({raw})")]
    UnknownRemote { raw: String },

    #[error("Cannot convert '{value}' to {expected}")]
    Coercion { expected: &'static str, value: Value },

    #[error("Expected {expected} in the response payload but got '{value}'")]
    UnexpectedPayload { expected: &'static str, value: Value },

    #[error("Failed to encode request parameter '{name}': '{source}'")]
    Encode {
        name: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
