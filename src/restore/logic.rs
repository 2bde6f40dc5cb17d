// textpair-restore/src/restore/logic.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GlobalConfig;
use crate::errors::{RestoreError, Result};
use crate::restore::confirm::ConfirmOverwrite;
use crate::restore::conflicts::{self, ConflictRecord};
use crate::restore::{app_config, archive, build, db_restore, web_app};

/// Fixed workspace name under the system temp directory. A leftover from a
/// crashed prior run is destroyed before use, which also means at most one
/// restore may run per host at a time.
pub const WORKSPACE_DIR_NAME: &str = "textpair_restore_temp";

/// Caller-selected parameters for one restore run.
#[derive(Debug, Clone)]
pub struct RestoreOptions {
    pub archive_path: PathBuf,
    pub web_app_dest: Option<PathBuf>,
    pub force: bool,
}

/// State owned by a single restore run: the private extraction workspace,
/// the conflicts found while scanning, and the final location of the
/// restored web application once it is known.
struct RestoreSession {
    workspace: PathBuf,
    conflicts: Vec<ConflictRecord>,
    restored_web_app_path: Option<PathBuf>,
}

impl RestoreSession {
    fn prepare(workspace_root: &Path) -> Result<Self> {
        let workspace = workspace_root.join(WORKSPACE_DIR_NAME);
        if workspace.exists() {
            println!("  - Cleaning up existing temporary files...");
            fs::remove_dir_all(&workspace)?;
        }
        fs::create_dir_all(&workspace)?;
        Ok(RestoreSession {
            workspace,
            conflicts: Vec::new(),
            restored_web_app_path: None,
        })
    }
}

/// Restores TextPAIR database tables and web files from a backup archive.
///
/// The run is destructive past the confirmation gate: conflicting tables are
/// dropped and the destination web-app directory is replaced. Whatever the
/// outcome, the temporary workspace and the consumed archive file are
/// deleted before this function returns; callers must not expect the archive
/// to survive the call. The only case that leaves the archive untouched is a
/// validation failure before the workspace is created.
pub async fn run_restore_flow(
    config: &GlobalConfig,
    options: &RestoreOptions,
    confirmer: &dyn ConfirmOverwrite,
) -> Result<()> {
    run_restore_in(config, options, confirmer, &std::env::temp_dir()).await
}

pub(crate) async fn run_restore_in(
    config: &GlobalConfig,
    options: &RestoreOptions,
    confirmer: &dyn ConfirmOverwrite,
    workspace_root: &Path,
) -> Result<()> {
    println!(
        "\nStarting TextPAIR restoration from: {}",
        options.archive_path.display()
    );

    println!("\nChecking database connection...");
    db_restore::check_database_connection(config).await?;
    println!("✓ Database connection verified");

    if !options.archive_path.is_file() {
        return Err(RestoreError::NotFound(options.archive_path.clone()));
    }

    println!("\nPreparing temporary workspace...");
    let mut session = RestoreSession::prepare(workspace_root)?;
    println!("✓ Workspace prepared");

    let outcome = perform_restore(config, options, confirmer, &mut session).await;
    finish(outcome, &session, &options.archive_path)
}

async fn perform_restore(
    config: &GlobalConfig,
    options: &RestoreOptions,
    confirmer: &dyn ConfirmOverwrite,
    session: &mut RestoreSession,
) -> Result<()> {
    println!("\nExtracting backup archive...");
    let backup_dir = archive::extract_archive(&options.archive_path, &session.workspace)?;
    println!("✓ Backup extracted successfully");

    let dumps = archive::find_table_dumps(&backup_dir)?;
    let web_app_source = archive::find_web_app_dir(&backup_dir)?;

    let web_app_dest = options
        .web_app_dest
        .clone()
        .unwrap_or_else(|| config.web_app_path.clone());

    if !options.force {
        println!("\nChecking for existing resources...");
        session.conflicts =
            conflicts::scan_conflicts(config, &dumps, web_app_source.as_deref(), &web_app_dest)
                .await?;
        if !session.conflicts.is_empty() {
            println!("\nWARNING: The following resources will be overwritten:");
            for conflict in &session.conflicts {
                println!("  - {}", conflict);
            }
            if !confirmer.confirm_overwrite(&session.conflicts)? {
                println!("Restoration cancelled");
                return Err(RestoreError::Cancelled);
            }
            println!();
        }
    }

    println!("\nRestoring database tables...");
    db_restore::restore_tables(config, &dumps).await?;
    println!("✓ Database restoration complete");

    if let Some(source) = &web_app_source {
        let restored = web_app::restore_web_app(source, &web_app_dest)?;
        println!("✓ Web application files restored");
        session.restored_web_app_path = Some(restored);
    }

    if let Some(restored) = session.restored_web_app_path.clone() {
        println!("\nConfiguring web application...");
        match app_config::update_app_config(&restored, &config.api_server) {
            Ok(()) => println!("✓ Configuration updated"),
            Err(e) if options.force => eprintln!("⚠ {} (continuing due to --force)", e),
            Err(e) => return Err(e),
        }

        println!("\nRebuilding web application...");
        match build::rebuild_web_app(&restored) {
            Ok(()) => println!("✓ Web application rebuilt successfully"),
            Err(e) if options.force => eprintln!("⚠ {} (continuing due to --force)", e),
            Err(e) => {
                eprintln!("✗ Failed to rebuild web application");
                return Err(e);
            }
        }
    }

    println!("\n✓ Restore completed successfully!");
    if let Some(restored) = &session.restored_web_app_path {
        println!(
            "The database is viewable at: {}",
            viewable_url(&config.api_server, restored)
        );
    }
    Ok(())
}

/// Runs cleanup after the restore body, whatever its outcome. A cleanup
/// failure is reported but never masks the restore's own error.
fn finish(outcome: Result<()>, session: &RestoreSession, archive_path: &Path) -> Result<()> {
    println!("\nCleaning up...");
    let cleanup = cleanup_run(&session.workspace, archive_path);
    match (outcome, cleanup) {
        (Ok(()), Ok(())) => {
            println!("✓ Cleanup completed");
            Ok(())
        }
        (Ok(()), Err(cleanup_err)) => Err(cleanup_err),
        (Err(run_err), Ok(())) => {
            println!("✓ Cleanup completed");
            Err(run_err)
        }
        (Err(run_err), Err(cleanup_err)) => {
            eprintln!("⚠ {}", cleanup_err);
            Err(run_err)
        }
    }
}

fn cleanup_run(workspace: &Path, archive_path: &Path) -> Result<()> {
    let mut failures = Vec::new();

    if workspace.exists() {
        if let Err(e) = fs::remove_dir_all(workspace) {
            failures.push(format!(
                "could not remove workspace {}: {}",
                workspace.display(),
                e
            ));
        }
    }
    if archive_path.exists() {
        if let Err(e) = fs::remove_file(archive_path) {
            failures.push(format!(
                "could not remove archive {}: {}",
                archive_path.display(),
                e
            ));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(RestoreError::Cleanup(failures.join("; ")))
    }
}

/// Where the restored corpus is served: the API server URL with its "-api"
/// suffix removed, joined with the restored web-app directory name.
fn viewable_url(api_server: &str, restored_web_app: &Path) -> String {
    let base = api_server.trim_end_matches('/').replace("-api", "");
    match restored_web_app.file_name().and_then(|n| n.to_str()) {
        Some(name) => format!("{}/{}", base, name),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct NeverAsked;

    impl ConfirmOverwrite for NeverAsked {
        fn confirm_overwrite(&self, _conflicts: &[ConflictRecord]) -> Result<bool> {
            panic!("confirmation gate must not be reached");
        }
    }

    fn touch(path: &Path, content: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = fs::File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_prepare_destroys_leftover_workspace() {
        let scratch = tempfile::tempdir().unwrap();
        let leftover = scratch.path().join(WORKSPACE_DIR_NAME);
        touch(&leftover.join("stale.sql"), "leftover from a crashed run");

        let session = RestoreSession::prepare(scratch.path()).unwrap();
        assert_eq!(session.workspace, leftover);
        assert!(session.workspace.is_dir());
        assert!(!session.workspace.join("stale.sql").exists());
    }

    #[test]
    fn test_cleanup_removes_workspace_and_archive() {
        let scratch = tempfile::tempdir().unwrap();
        let workspace = scratch.path().join(WORKSPACE_DIR_NAME);
        touch(&workspace.join("backup/textpair_alignments.sql"), "");
        let archive_path = scratch.path().join("backup.tar.lz4");
        touch(&archive_path, "consumed");

        cleanup_run(&workspace, &archive_path).unwrap();
        assert!(!workspace.exists());
        assert!(!archive_path.exists());
    }

    #[test]
    fn test_cleanup_tolerates_already_absent_paths() {
        let scratch = tempfile::tempdir().unwrap();
        let workspace = scratch.path().join(WORKSPACE_DIR_NAME);
        let archive_path = scratch.path().join("backup.tar.lz4");

        assert!(cleanup_run(&workspace, &archive_path).is_ok());
    }

    #[test]
    fn test_viewable_url_strips_api_suffix() {
        let url = viewable_url(
            "https://example.org/text-pair-api",
            Path::new("/var/www/html/text-pair/web_app"),
        );
        assert_eq!(url, "https://example.org/text-pair/web_app");
    }

    #[tokio::test]
    async fn test_connection_failure_leaves_archive_and_creates_no_workspace() {
        let scratch = tempfile::tempdir().unwrap();
        let archive_path = scratch.path().join("backup.tar.lz4");
        touch(&archive_path, "never read");

        let config = GlobalConfig {
            database_name: "textpair_restore_no_such_db".to_string(),
            database_user: "textpair_restore_no_such_user".to_string(),
            database_password: "wrong".to_string(),
            web_app_path: scratch.path().join("www"),
            api_server: "https://example.org/text-pair-api".to_string(),
        };
        let options = RestoreOptions {
            archive_path: archive_path.clone(),
            web_app_dest: None,
            force: false,
        };

        let result = run_restore_in(&config, &options, &NeverAsked, scratch.path()).await;
        assert!(matches!(result, Err(RestoreError::Connection { .. })));
        assert!(archive_path.exists());
        assert!(!scratch.path().join(WORKSPACE_DIR_NAME).exists());
    }
}
