// textpair-restore/src/restore/build.rs
use std::path::Path;
use std::process::Command;

use crate::errors::{RestoreError, Result};
use crate::utils::find_npm_executable;

/// Runs the dependency-install and production-build steps in the restored
/// web application directory. The child processes get their own working
/// directory; the parent's is never changed.
pub fn rebuild_web_app(web_app_path: &Path) -> Result<()> {
    let npm_path = find_npm_executable().map_err(|e| RestoreError::Build(e.to_string()))?;

    println!("  - Installing dependencies...");
    run_npm_step(&npm_path, web_app_path, &["install"])?;

    println!("  - Building production bundle...");
    run_npm_step(&npm_path, web_app_path, &["run", "build"])?;

    Ok(())
}

fn run_npm_step(npm_path: &Path, web_app_path: &Path, args: &[&str]) -> Result<()> {
    let status = Command::new(npm_path)
        .args(args)
        .current_dir(web_app_path)
        .status()
        .map_err(|e| {
            RestoreError::Build(format!("failed to execute npm {}: {}", args.join(" "), e))
        })?;

    if !status.success() {
        return Err(RestoreError::Build(format!(
            "npm {} exited with {}",
            args.join(" "),
            status
        )));
    }
    Ok(())
}
