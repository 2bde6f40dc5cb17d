// textpair-restore/src/restore/app_config.rs
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

use crate::errors::{RestoreError, Result};

pub const APP_CONFIG_FILE: &str = "appConfig.json";
const SOURCE_DATA_DIR: &str = "source_data";
const TARGET_DATA_DIR: &str = "target_data";

/// Rewrites `appConfig.json` inside the restored web application so it
/// points at the live API endpoint and the restored data directories.
///
/// Only `apiServer`, `sourcePhiloDBPath` and `targetPhiloDBPath` are
/// touched; every other field passes through unchanged. A prior
/// `targetPhiloDBPath` is cleared when the backup carries no `target_data`
/// directory, so no dangling path survives the restore.
pub fn update_app_config(web_app_path: &Path, api_server: &str) -> Result<()> {
    let config_path = web_app_path.join(APP_CONFIG_FILE);
    if !config_path.is_file() {
        return Err(RestoreError::ConfigUpdate(format!(
            "{} not found at {}",
            APP_CONFIG_FILE,
            config_path.display()
        )));
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        RestoreError::ConfigUpdate(format!("failed to read {}: {}", config_path.display(), e))
    })?;
    let mut doc: Value = serde_json::from_str(&content).map_err(|e| {
        RestoreError::ConfigUpdate(format!("failed to parse {}: {}", config_path.display(), e))
    })?;
    let fields = doc.as_object_mut().ok_or_else(|| {
        RestoreError::ConfigUpdate(format!("{} is not a JSON object", APP_CONFIG_FILE))
    })?;

    fields.insert("apiServer".to_string(), json!(api_server));

    let mut source_path_note = None;
    let source_data = web_app_path.join(SOURCE_DATA_DIR);
    if source_data.is_dir() {
        let absolute = absolute_path(&source_data)?;
        source_path_note = Some(absolute.clone());
        fields.insert("sourcePhiloDBPath".to_string(), json!(absolute));
    }

    let mut target_path_note = None;
    let target_data = web_app_path.join(TARGET_DATA_DIR);
    if target_data.is_dir() {
        let absolute = absolute_path(&target_data)?;
        target_path_note = Some(absolute.clone());
        fields.insert("targetPhiloDBPath".to_string(), json!(absolute));
    } else if fields.contains_key("targetPhiloDBPath") {
        fields.insert("targetPhiloDBPath".to_string(), json!(""));
    }

    let updated = serde_json::to_string_pretty(&doc).map_err(|e| {
        RestoreError::ConfigUpdate(format!("failed to serialize {}: {}", APP_CONFIG_FILE, e))
    })?;
    fs::write(&config_path, updated).map_err(|e| {
        RestoreError::ConfigUpdate(format!("failed to write {}: {}", config_path.display(), e))
    })?;

    println!("Updated {}:", APP_CONFIG_FILE);
    println!("  - apiServer: {}", api_server);
    if let Some(path) = source_path_note {
        println!("  - sourcePhiloDBPath: {}", path);
    }
    if let Some(path) = target_path_note {
        println!("  - targetPhiloDBPath: {}", path);
    }
    Ok(())
}

fn absolute_path(path: &Path) -> Result<String> {
    let canonical = fs::canonicalize(path).map_err(|e| {
        RestoreError::ConfigUpdate(format!("failed to resolve {}: {}", path.display(), e))
    })?;
    Ok(canonical.to_string_lossy().into_owned())
}
