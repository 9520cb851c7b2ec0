//! # Web Database Client
//!
//! This module implements the high-level logic for executing actions against a remote
//! database.
//!
//! A [`WebDatabase`] is generic over its [`Transport`]. By default it uses the pooled
//! [`HttpTransport`], but any transport can be plugged in with [`WebDatabase::with_transport`],
//! which is how the integration tests talk to an in-process database.
//!
//! Every call is independent: it builds its own parameters, performs one exchange and
//! materializes the payload. The only state shared between calls is the endpoint's
//! [`DatabaseEnvironment`], computed once through the global [`EnvironmentCache`]. Each
//! client adds its types to that environment on first use, and both the encoding of queries
//! and the materialization of results resolve types through it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use webdb_core::client::{RemoteEndpoint, WebDatabase};
//! use webdb_core::registry::{ObjectType, TypeRegistry};
//! use webdb_core::state::Query;
//! use webdb_core::uuid::Uuid;
//!
//! # fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let article = Uuid::new_v4();
//! let types: TypeRegistry = [ObjectType::new(article, "demo.Article")].into_iter().collect();
//!
//! let endpoint = RemoteEndpoint::new("http://localhost:8080/_db").with_database("main");
//! let database = WebDatabase::new(endpoint, types)?;
//!
//! let query = Query::from_type(article).sort_descending("publishDate");
//! let page = database.read_partial(&query, 0, 10)?;
//! println!("{} of {} articles", page.items.len(), page.count);
//! # Ok(())
//! # }
//! ```
mod read;
mod settings;
mod types;
mod write;

pub use settings::*;
pub use types::*;

use crate::{
    environment::{DatabaseEnvironment, EnvironmentCache},
    error::DatabaseError,
    protocol::{Action, encoder::RequestParams, envelope::decode_response, params},
    registry::TypeRegistry,
    state::Query,
    transport::{Credentials, HttpTransport, Transport},
};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Identity of a configured remote database.
///
/// Two endpoints are equal when their URL and remote database name match; credentials
/// are not part of the identity.
#[derive(Debug, Clone)]
pub struct RemoteEndpoint {
    url: String,
    database: Option<String>,
    credentials: Option<Credentials>,
}

impl RemoteEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: None,
            credentials: None,
        }
    }

    /// Sets the remote database name. A blank name selects the default database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        let database = database.into();
        self.database = (!database.trim().is_empty()).then_some(database);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

impl PartialEq for RemoteEndpoint {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.database == other.database
    }
}

impl Eq for RemoteEndpoint {}

impl Hash for RemoteEndpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.url.hash(state);
        self.database.hash(state);
    }
}

/// A database backed by a remote web API.
#[derive(Debug, Clone)]
pub struct WebDatabase<T = HttpTransport> {
    endpoint: RemoteEndpoint,
    types: TypeRegistry,
    environment: OnceCell<Arc<DatabaseEnvironment>>,
    transport: T,
}

impl WebDatabase<HttpTransport> {
    /// Creates a database client using a pooled HTTP transport.
    ///
    /// # Arguments
    ///
    /// * `endpoint` - The remote URL, database name and credentials.
    /// * `types` - The types that objects read from this endpoint can be resolved to.
    pub fn new(endpoint: RemoteEndpoint, types: TypeRegistry) -> Result<Self, DatabaseError> {
        Ok(Self::with_transport(endpoint, types, HttpTransport::new()?))
    }

    /// Creates a database client from its settings.
    pub fn from_settings(
        settings: WebDatabaseSettings,
        types: TypeRegistry,
    ) -> Result<Self, SettingsError> {
        let endpoint = settings.into_endpoint()?;
        Ok(Self::new(endpoint, types)?)
    }
}

impl<T: Transport> WebDatabase<T> {
    pub fn with_transport(endpoint: RemoteEndpoint, types: TypeRegistry, transport: T) -> Self {
        Self {
            endpoint,
            types,
            environment: OnceCell::new(),
            transport,
        }
    }

    pub fn endpoint(&self) -> &RemoteEndpoint {
        &self.endpoint
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the environment of this database's endpoint.
    ///
    /// The environment is shared with every client configured for the same endpoint. On first
    /// access this client registers its own types into it.
    pub fn environment(&self) -> Arc<DatabaseEnvironment> {
        self.environment
            .get_or_init(|| {
                let environment = EnvironmentCache::global().get_or_init(&self.endpoint, || {
                    DatabaseEnvironment::new(self.endpoint.clone(), TypeRegistry::new())
                });
                environment.register_all(&self.types);
                environment
            })
            .clone()
    }

    /// Starts the parameters of a request for `action`.
    fn params(&self, action: Action, query: Option<&Query>) -> Result<RequestParams, DatabaseError> {
        let environment = self.environment();
        RequestParams::new(action, self.endpoint.database(), query, &*environment)
    }

    /// Performs one exchange and returns the payload of a successful response.
    fn send(&self, request: &RequestParams) -> Result<Value, DatabaseError> {
        tracing::debug!(
            action = request.get(params::ACTION),
            url = self.endpoint.url(),
            params = request.len(),
            "sending database request"
        );

        let raw = self
            .transport
            .post_form(self.endpoint.url(), request, self.endpoint.credentials())?;

        decode_response(&raw).inspect_err(|err| {
            tracing::warn!(url = self.endpoint.url(), error = %err, "database request failed");
        })
    }
}
