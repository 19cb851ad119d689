//! Settings for the admin binary. Read from `settings.toml` when present,
//! with `QUADERNO_*` environment variables layered on top.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Database {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for Database {
    fn default() -> Self {
        Database {
            url: default_database_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub database: Database,
    /// Filter directive for `tracing_subscriber`, e.g. `info` or `engine=debug`.
    #[serde(default = "default_log")]
    pub log: String,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("QUADERNO").separator("_"))
            .build()?;

        settings.try_deserialize()
    }
}

fn default_database_url() -> String {
    "sqlite:./quaderno.db?mode=rwc".to_string()
}

fn default_log() -> String {
    "info".to_string()
}
