use mock_database::MockDatabase;
use std::sync::Arc;
use webdb_core::{
    protocol::encoder::RequestParams,
    transport::{Credentials, Transport, TransportError},
};

// A transport that hands requests straight to an in-memory database.
#[allow(dead_code)]
pub struct InProcessTransport {
    pub database: Arc<MockDatabase>,
}

#[allow(dead_code)]
impl InProcessTransport {
    pub fn new(database: Arc<MockDatabase>) -> Self {
        Self { database }
    }
}

impl Transport for InProcessTransport {
    fn post_form(
        &self,
        url: &str,
        params: &RequestParams,
        credentials: Option<&Credentials>,
    ) -> Result<String, TransportError> {
        let credentials = credentials.map(|c| (c.username.as_str(), c.password.as_str()));
        let response = self.database.handle(params.as_slice(), credentials);

        if response.status != 200 {
            return Err(TransportError::HttpStatus {
                url: url.to_string(),
                status: response.status,
                body: response.body,
            });
        }

        Ok(response.body)
    }
}
