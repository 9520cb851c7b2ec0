//! # HTTP Transport
//!
//! This module wraps a blocking `reqwest` client to post form-encoded requests.
//!
//! ## Connection handling
//!
//! The [`HttpTransport`] owns a connection pool. Each call checks a connection out of the
//! pool for the duration of the exchange; the connection goes back to the pool once the
//! response body has been read, or is discarded when the exchange fails. No other state
//! survives between calls, so one transport can serve any number of threads.
use super::{Credentials, Transport, TransportError};
use crate::protocol::encoder::RequestParams;
use reqwest::blocking::Client;
use std::time::Duration;

/// A pooled HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the default client settings.
    pub fn new() -> Result<Self, TransportError> {
        Self::builder().build()
    }

    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::default()
    }
}

/// Configures the pooled client behind an [`HttpTransport`].
#[derive(Debug, Clone, Default)]
pub struct HttpTransportBuilder {
    timeout: Option<Duration>,
}

impl HttpTransportBuilder {
    /// Sets a total timeout for each exchange. Without it the client default applies.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HttpTransport, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::ClientBuild(e.into()))?;

        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn post_form(
        &self,
        url: &str,
        params: &RequestParams,
        credentials: Option<&Credentials>,
    ) -> Result<String, TransportError> {
        let request_failed = |source: reqwest::Error| TransportError::Request {
            url: url.to_string(),
            source: source.into(),
        };

        let mut request = self.client.post(url).form(params.as_slice());
        if let Some(credentials) = credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let response = request.send().map_err(request_failed)?;
        let status = response.status();
        let body = response.text().map_err(request_failed)?;

        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}
