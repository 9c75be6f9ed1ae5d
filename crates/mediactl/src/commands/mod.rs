//! Command handlers.

pub mod config_cmd;
pub mod settings;
pub mod watch;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a server-backed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Settings(args) => settings::handle(args, global).await,
        Command::Watch => watch::handle(global).await,
        // Config and Completions are handled before dispatch; reaching
        // here is a wiring bug.
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "command does not need a server connection".into(),
        }),
    }
}
