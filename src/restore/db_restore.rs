// textpair-restore/src/restore/db_restore.rs
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use std::process::Command;

use crate::config::GlobalConfig;
use crate::errors::{RestoreError, Result};
use crate::restore::archive::TableDump;
use crate::utils::find_psql_executable;

fn connect_options(config: &GlobalConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .database(&config.database_name)
        .username(&config.database_user)
        .password(&config.database_password)
}

/// Opens a fresh connection to the target database. No connection is kept
/// across operations; every catalog probe and every drop uses its own.
pub async fn connect(config: &GlobalConfig) -> Result<PgConnection> {
    PgConnection::connect_with(&connect_options(config))
        .await
        .map_err(|e| RestoreError::Connection {
            database: config.database_name.clone(),
            source: e,
        })
}

/// Tests database connectivity and credentials before any destructive step.
pub async fn check_database_connection(config: &GlobalConfig) -> Result<()> {
    let conn = connect(config).await?;
    let _ = conn.close().await;
    Ok(())
}

/// Postgres identifiers cannot be bound as query parameters; quote and
/// escape them instead.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn validate_table_name(table: &str) -> Result<()> {
    if table.trim().is_empty()
        || table
            .contains(|c: char| !c.is_alphanumeric() && c != '_' && c != '-')
    {
        return Err(RestoreError::TableRestore {
            table: table.to_string(),
            reason: "invalid character in table name derived from dump file name".to_string(),
        });
    }
    Ok(())
}

async fn drop_table(config: &GlobalConfig, table: &str) -> Result<()> {
    let mut conn = connect(config).await?;
    let drop_sql = format!("DROP TABLE IF EXISTS {} CASCADE", quote_ident(table));
    sqlx::query(&drop_sql)
        .execute(&mut conn)
        .await
        .map_err(|e| RestoreError::TableRestore {
            table: table.to_string(),
            reason: format!("failed to drop existing table: {}", e),
        })?;
    let _ = conn.close().await;
    Ok(())
}

/// Executes a table dump with psql. Credentials travel through the child
/// process environment, never through argv or the narrated output.
fn execute_dump_with_psql(config: &GlobalConfig, dump: &TableDump) -> Result<()> {
    let psql_path = find_psql_executable().map_err(|e| RestoreError::TableRestore {
        table: dump.table.clone(),
        reason: e.to_string(),
    })?;

    let output = Command::new(psql_path)
        .env("PGPASSWORD", &config.database_password)
        .arg("-X") // Do not read psqlrc
        .arg("-q") // Quiet mode
        .arg("-v")
        .arg("ON_ERROR_STOP=1") // Exit on first error
        .arg("-U")
        .arg(&config.database_user)
        .arg("-d")
        .arg(&config.database_name)
        .arg("-f")
        .arg(&dump.path)
        .output()
        .map_err(|e| RestoreError::TableRestore {
            table: dump.table.clone(),
            reason: format!("failed to execute psql: {}", e),
        })?;

    if !output.status.success() {
        return Err(RestoreError::TableRestore {
            table: dump.table.clone(),
            reason: format!(
                "psql exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        });
    }
    Ok(())
}

/// Drops and recreates each table from its dump, in dump-listing order.
///
/// Each table's drop+recreate is one logical unit; a failed recreation halts
/// the remaining tables and may leave that table absent. Tables already
/// restored stand as-is.
pub async fn restore_tables(config: &GlobalConfig, dumps: &[TableDump]) -> Result<()> {
    println!("Found {} tables to restore", dumps.len());

    for dump in dumps {
        validate_table_name(&dump.table)?;

        println!("  - Processing {}:", dump.table);
        println!("    • Dropping existing table if present...");
        drop_table(config, &dump.table).await?;

        println!("    • Restoring table data...");
        execute_dump_with_psql(config, dump)?;
        println!("    ✓ Table {} restored", dump.table);
    }
    Ok(())
}
