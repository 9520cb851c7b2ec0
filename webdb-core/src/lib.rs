//! # Webdb Core
//!
//! `webdb-core` is the library powering the Webdb CLI. It provides a typed client for object
//! databases that are exposed through a web API: queries and writes are turned into form-encoded
//! HTTP requests, and the generic JSON replies are turned back into typed records.
//!
//! ## Key Components
//!
//! * **[`WebDatabase`](client::WebDatabase):** The main entry point. It encodes each action,
//!   dispatches it through a [`Transport`](transport::Transport) and materializes the result.
//! * **[`Query`](state::Query) & [`State`](state::State):** The in-process query and object
//!   models, both reducible to a flat JSON field map.
//! * **[`TypeRegistry`](registry::TypeRegistry):** Maps type identifiers to type names and back.
//!
//! ## Protocol layer
//!
//! * **[`protocol::resolver`]:** Rewrites type identifiers into type names before encoding,
//!   because the remote side identifies types by name.
//! * **[`protocol::encoder`]:** Builds the ordered list of wire parameters for each action.
//! * **[`protocol::envelope`]:** Decodes the `{"status", "result"}` envelope into a payload or
//!   a [`DatabaseError`](error::DatabaseError).
//!
//! ## Environments
//!
//! Type metadata is computed once per remote endpoint and shared process-wide through the
//! [`EnvironmentCache`](environment::EnvironmentCache).
//!
//! ## Re-exports
//!
//! This crate re-exports `chrono`, `serde_json` and `uuid` so that consumers use compatible
//! versions of the types found in its public API.
//!
//! See the README.md for more details about usage.
pub mod client;
pub mod environment;
pub mod error;
pub mod materialize;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod transport;

// Re-exports
pub use chrono;
pub use serde_json;
pub use uuid;

/// Type alias for the standard boxed error used to carry opaque transport causes.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
