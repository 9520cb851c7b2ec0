//! # Transport
//!
//! The transport performs exactly one request/response exchange per call: it posts the form
//! parameters to the remote URL and hands back the raw response body.
//!
//! Interpreting the body is left to [`crate::protocol::envelope`], so a [`Transport`] only
//! reports failures that prevent a body from being received at all.
pub mod http;

pub use self::http::{HttpTransport, HttpTransportBuilder};

use crate::{BoxError, protocol::encoder::RequestParams};
use std::{fmt, sync::Arc};

/// Errors raised before a response body could be obtained.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to build the HTTP client: '{0}'")]
    ClientBuild(#[source] BoxError),
    #[error("Request to '{url}' failed: '{source}'")]
    Request {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error("Server at '{url}' responded with HTTP status {status}")]
    HttpStatus {
        url: String,
        status: u16,
        body: String,
    },
}

/// Username and password sent with every request, for any authentication realm.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A blocking request/response exchange with a remote database.
pub trait Transport: Send + Sync {
    /// Posts `params` as a UTF-8 form to `url` and returns the response body.
    fn post_form(
        &self,
        url: &str,
        params: &RequestParams,
        credentials: Option<&Credentials>,
    ) -> Result<String, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn post_form(
        &self,
        url: &str,
        params: &RequestParams,
        credentials: Option<&Credentials>,
    ) -> Result<String, TransportError> {
        (**self).post_form(url, params, credentials)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post_form(
        &self,
        url: &str,
        params: &RequestParams,
        credentials: Option<&Credentials>,
    ) -> Result<String, TransportError> {
        (**self).post_form(url, params, credentials)
    }
}
