use super::RemoteEndpoint;
use crate::{error::DatabaseError, transport::Credentials};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Errors that can occur while configuring a [`WebDatabase`](super::WebDatabase).
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid database settings: '{0}'")]
    Malformed(#[from] serde_json::Error),
    #[error("The 'remoteUrl' setting is required")]
    MissingRemoteUrl,
    #[error("Both 'username' and 'password' must be set to use credentials")]
    IncompleteCredentials,
    #[error(transparent)]
    Client(#[from] DatabaseError),
}

/// Settings of a remote database, as found under its settings key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebDatabaseSettings {
    #[serde(default)]
    pub remote_url: Option<String>,
    #[serde(default)]
    pub remote_database: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl WebDatabaseSettings {
    /// Parses settings from a JSON map such as `{"remoteUrl": "...", "remoteDatabase": "..."}`.
    pub fn from_value(value: Value) -> Result<Self, SettingsError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Validates the settings and builds the endpoint they describe.
    pub fn into_endpoint(self) -> Result<RemoteEndpoint, SettingsError> {
        let url = self
            .remote_url
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingRemoteUrl)?;

        let mut endpoint = RemoteEndpoint::new(url);

        if let Some(database) = self.remote_database.filter(|db| !db.trim().is_empty()) {
            endpoint = endpoint.with_database(database);
        }

        match (self.username, self.password) {
            (Some(username), Some(password)) => {
                endpoint = endpoint.with_credentials(Credentials::new(username, password));
            }
            (None, None) => {}
            _ => return Err(SettingsError::IncompleteCredentials),
        }

        Ok(endpoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_settings_build_endpoint() {
        let settings = WebDatabaseSettings::from_value(json!({
            "remoteUrl": " http://db.local/api ",
            "remoteDatabase": "main",
            "username": "admin",
            "password": "secret"
        }))
        .unwrap();

        let endpoint = settings.into_endpoint().unwrap();
        assert_eq!(endpoint.url(), "http://db.local/api");
        assert_eq!(endpoint.database(), Some("main"));
        assert_eq!(endpoint.credentials().unwrap().username, "admin");
    }

    #[test]
    fn test_blank_database_is_ignored() {
        let endpoint = WebDatabaseSettings::from_value(json!({
            "remoteUrl": "http://db.local/api",
            "remoteDatabase": ""
        }))
        .unwrap()
        .into_endpoint()
        .unwrap();

        assert_eq!(endpoint.database(), None);
        assert!(endpoint.credentials().is_none());
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let missing = WebDatabaseSettings::from_value(json!({ "remoteUrl": "  " }))
            .unwrap()
            .into_endpoint();
        assert!(matches!(missing, Err(SettingsError::MissingRemoteUrl)));

        let partial = WebDatabaseSettings::from_value(json!({
            "remoteUrl": "http://db.local/api",
            "username": "admin"
        }))
        .unwrap()
        .into_endpoint();
        assert!(matches!(partial, Err(SettingsError::IncompleteCredentials)));

        let malformed = WebDatabaseSettings::from_value(json!({ "remoteUrl": 5 }));
        assert!(matches!(malformed, Err(SettingsError::Malformed(_))));
    }
}
