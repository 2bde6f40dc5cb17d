// textpair-restore/src/restore/confirm.rs
use crate::errors::{RestoreError, Result};
use crate::restore::conflicts::ConflictRecord;

/// Decides whether the run may overwrite the listed pre-existing resources.
/// The orchestrator consults this gate only when conflicts were found and
/// the caller did not request unconditional overwrite.
pub trait ConfirmOverwrite {
    fn confirm_overwrite(&self, conflicts: &[ConflictRecord]) -> Result<bool>;
}

/// Interactive console prompt, the default gate for CLI runs.
pub struct ConsolePrompt;

impl ConfirmOverwrite for ConsolePrompt {
    fn confirm_overwrite(&self, _conflicts: &[ConflictRecord]) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(
                "Do you want to proceed with the restoration? This will replace all existing resources",
            )
            .default(false)
            .interact()
            .map_err(|e| RestoreError::Io(std::io::Error::other(e)))
    }
}
