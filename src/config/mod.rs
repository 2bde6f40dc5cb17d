// textpair-restore/src/config/mod.rs
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Default location of the process-wide TextPAIR settings file.
pub const DEFAULT_SETTINGS_PATH: &str = "/etc/text-pair/global_settings.json";

// Structs for deserializing global_settings.json
#[derive(Debug, Clone, Deserialize)]
struct JsonDatabaseSection {
    pub database_name: String,
    pub database_user: String,
    pub database_password: String,
}

#[derive(Debug, Clone, Deserialize)]
struct JsonWebAppSection {
    pub web_app_path: PathBuf,
    pub api_server: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawSettings {
    pub database: JsonDatabaseSection,
    pub web_app: JsonWebAppSection,
}

/// Process-wide configuration, loaded once at startup and passed by
/// reference into every component for the lifetime of a restore run.
#[derive(Debug, Clone)]
pub struct GlobalConfig {
    pub database_name: String,
    pub database_user: String,
    pub database_password: String,
    pub web_app_path: PathBuf,
    pub api_server: String,
}

impl GlobalConfig {
    pub fn load_from_json(settings_path: &Path) -> Result<Self> {
        let settings_content = fs::read_to_string(settings_path).with_context(|| {
            format!(
                "Failed to read settings file at {}",
                settings_path.display()
            )
        })?;
        let raw: RawSettings = serde_json::from_str(&settings_content).with_context(|| {
            format!(
                "Failed to parse JSON from settings file at {}",
                settings_path.display()
            )
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self> {
        if raw.database.database_name.trim().is_empty() {
            anyhow::bail!("database.database_name cannot be empty in settings");
        }
        if raw.database.database_user.trim().is_empty() {
            anyhow::bail!("database.database_user cannot be empty in settings");
        }
        if raw.web_app.web_app_path.as_os_str().is_empty() {
            anyhow::bail!("web_app.web_app_path cannot be empty in settings");
        }
        Url::parse(&raw.web_app.api_server).with_context(|| {
            format!(
                "web_app.api_server is not a valid URL: {}",
                raw.web_app.api_server
            )
        })?;

        Ok(GlobalConfig {
            database_name: raw.database.database_name,
            database_user: raw.database.database_user,
            database_password: raw.database.database_password,
            web_app_path: raw.web_app.web_app_path,
            api_server: raw.web_app.api_server,
        })
    }
}
