pub(crate) mod app_config; // Patches appConfig.json inside the restored web app
pub(crate) mod archive; // Archive extraction and backup-layout validation
pub(crate) mod build; // npm install / build invocation
pub mod confirm; // Pluggable confirmation gate for destructive overwrites
pub(crate) mod conflicts; // Read-only probe for resources a restore would overwrite
pub(crate) mod db_restore; // Table drop/recreate via sqlx and psql
mod logic; // End-to-end orchestration and guaranteed cleanup
pub(crate) mod web_app; // Web application directory replacement

pub use logic::{run_restore_flow, RestoreOptions};
