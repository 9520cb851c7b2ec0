use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use webdb_core::client::WebDatabaseSettings;
use webdb_core::registry::{ObjectType, TypeRegistry};

/// The contents of the config file: database settings plus the known types.
///
/// ```json
/// {
///   "remoteUrl": "http://localhost:8080/_db",
///   "remoteDatabase": "main",
///   "types": [{ "id": "...", "internalName": "demo.Article" }]
/// }
/// ```
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
pub struct AppConfig {
    #[serde(flatten)]
    pub settings: WebDatabaseSettings,
    #[serde(default)]
    pub types: Vec<ObjectType>,
}

impl AppConfig {
    /// Replaces the file settings with any value given on the command line.
    pub fn override_with(
        mut self,
        url: Option<String>,
        database: Option<String>,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        let settings = &mut self.settings;
        settings.remote_url = url.or(settings.remote_url.take());
        settings.remote_database = database.or(settings.remote_database.take());
        settings.username = username.or(settings.username.take());
        settings.password = password.or(settings.password.take());
        self
    }

    pub fn registry(&self) -> TypeRegistry {
        self.types.iter().cloned().collect()
    }
}

pub struct ConfigManager {
    config_path: PathBuf,
    explicit: bool,
}

impl ConfigManager {
    /// Uses `path` when given, else `config.json` in the user config directory.
    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Ok(Self {
                config_path,
                explicit: true,
            });
        }

        let proj_dirs = ProjectDirs::from("com", "webdb", "webdb")
            .context("Could not determine config directory")?;

        Ok(Self {
            config_path: proj_dirs.config_dir().join("config.json"),
            explicit: false,
        })
    }

    /// Loads the config. A missing default file is an empty config; a missing explicit one is an error.
    pub fn load(&self) -> Result<AppConfig> {
        if !self.explicit && !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file found");
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read '{}'", self.config_path.display()))?;
        let config = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file '{}'", self.config_path.display()))?;
        Ok(config)
    }
}
