//! Terminal confirmation for interactive runs.

use crate::core::processor::Confirm;
use crate::error::Result;

/// Asks on the terminal, defaulting to no.
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(Into::into)
    }
}
