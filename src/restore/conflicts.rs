// textpair-restore/src/restore/conflicts.rs
use std::fmt;
use std::path::Path;

use crate::config::GlobalConfig;
use crate::errors::Result;
use crate::restore::archive::TableDump;
use crate::restore::db_restore;

/// Human-readable description of one pre-existing resource a restore would
/// overwrite. Purely advisory; drives the confirmation gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRecord(String);

impl ConflictRecord {
    pub fn table(name: &str) -> Self {
        ConflictRecord(format!("database table '{}'", name))
    }

    pub fn directory(name: &str) -> Self {
        ConflictRecord(format!("web application directory '{}'", name))
    }
}

impl fmt::Display for ConflictRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only probe of the destination database and filesystem for resources
/// the restore would overwrite. Performs no mutation.
pub async fn scan_conflicts(
    config: &GlobalConfig,
    dumps: &[TableDump],
    web_app_source: Option<&Path>,
    web_app_dest: &Path,
) -> Result<Vec<ConflictRecord>> {
    let mut conflicts = Vec::new();

    for dump in dumps {
        if table_exists(config, &dump.table).await? {
            conflicts.push(ConflictRecord::table(&dump.table));
        }
    }

    if let Some(conflict) = web_app_conflict(web_app_source, web_app_dest) {
        conflicts.push(conflict);
    }

    Ok(conflicts)
}

async fn table_exists(config: &GlobalConfig, table: &str) -> Result<bool> {
    let mut conn = db_restore::connect(config).await?;
    let found: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM information_schema.tables WHERE table_name = $1")
            .bind(table)
            .fetch_optional(&mut conn)
            .await?;
    Ok(found.is_some())
}

fn web_app_conflict(web_app_source: Option<&Path>, web_app_dest: &Path) -> Option<ConflictRecord> {
    let name = web_app_source?.file_name()?;
    if web_app_dest.join(name).exists() {
        Some(ConflictRecord::directory(&name.to_string_lossy()))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_conflict_record_descriptions() {
        assert_eq!(
            ConflictRecord::table("alignments").to_string(),
            "database table 'alignments'"
        );
        assert_eq!(
            ConflictRecord::directory("web_app").to_string(),
            "web application directory 'web_app'"
        );
    }

    #[test]
    fn test_web_app_conflict_when_destination_exists() {
        let scratch = tempfile::tempdir().unwrap();
        let source = scratch.path().join("backup/web_app");
        fs::create_dir_all(&source).unwrap();
        let dest_base = scratch.path().join("www");
        fs::create_dir_all(dest_base.join("web_app")).unwrap();

        let conflict = web_app_conflict(Some(&source), &dest_base);
        assert_eq!(conflict, Some(ConflictRecord::directory("web_app")));
    }

    #[test]
    fn test_web_app_conflict_when_destination_is_free() {
        let scratch = tempfile::tempdir().unwrap();
        let source = scratch.path().join("backup/web_app");
        fs::create_dir_all(&source).unwrap();
        let dest_base = scratch.path().join("www");
        fs::create_dir_all(&dest_base).unwrap();

        assert_eq!(web_app_conflict(Some(&source), &dest_base), None);
    }

    #[test]
    fn test_web_app_conflict_without_web_app_in_backup() {
        let scratch = tempfile::tempdir().unwrap();
        assert_eq!(web_app_conflict(None, scratch.path()), None);
    }
}
