use inquire::{Confirm, InquireError};
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum PromptError {
    #[error("Error occurred trying to prompt user: {0}")]
    #[diagnostic(
        code(scaffold::prompt::inquire),
        help("Run without --confirm when no terminal is attached")
    )]
    Inquire(#[from] InquireError),
}

/// Asks whether the previewed structure should be written. Escape counts as "no".
pub fn apply_changes() -> Result<bool, PromptError> {
    let answer = Confirm::new("Create this structure?")
        .with_default(false)
        .with_help_message("Nothing is written unless you answer yes")
        .prompt_skippable()?;

    Ok(answer.unwrap_or(false))
}
