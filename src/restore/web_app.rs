// textpair-restore/src/restore/web_app.rs
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::{RestoreError, Result};

/// Replaces the destination web application directory with the backup's
/// copy. Returns the final destination path of the restored tree.
pub fn restore_web_app(web_app_source: &Path, dest_base: &Path) -> Result<PathBuf> {
    let name = web_app_source.file_name().ok_or_else(|| {
        RestoreError::FileRestore(format!(
            "web application source has no directory name: {}",
            web_app_source.display()
        ))
    })?;
    let dest = dest_base.join(name);

    if dest.exists() {
        println!("\nRemoving existing web application at {}...", dest.display());
        fs::remove_dir_all(&dest).map_err(|e| {
            RestoreError::FileRestore(format!(
                "failed to remove existing directory {}: {}",
                dest.display(),
                e
            ))
        })?;
    }

    println!("Copying web application files...");
    copy_dir_recursive(web_app_source, &dest)?;
    Ok(dest)
}

fn copy_dir_recursive(source: &Path, dest: &Path) -> Result<()> {
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| RestoreError::FileRestore(e.to_string()))?;
        let relative = entry.path().strip_prefix(source).map_err(|e| {
            RestoreError::FileRestore(format!(
                "unexpected path {} outside source tree: {}",
                entry.path().display(),
                e
            ))
        })?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| {
                RestoreError::FileRestore(format!(
                    "failed to create directory {}: {}",
                    target.display(),
                    e
                ))
            })?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| {
                RestoreError::FileRestore(format!(
                    "failed to copy {} to {}: {}",
                    entry.path().display(),
                    target.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}
