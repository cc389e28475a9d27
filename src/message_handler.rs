//! Command handler for messages from the companion control surface.
//!
//! Kept apart from the `extra-bars-rpc` binary so it can be unit-tested
//! directly against an [`App`].

use serde_json::Value;
use tracing::{debug, warn};

use crate::app::App;
use crate::types::errors::MessageError;
use crate::types::message::{Command, CommandResult};

const KNOWN_ACTIONS: [&str; 5] = [
    "addCurrentPage",
    "addLinkToBar",
    "addNewBar",
    "toggleExtension",
    "getStatus",
];

/// Decodes a raw message, telling unknown actions apart from malformed known ones.
pub fn parse_command(message: &Value) -> Result<Command, MessageError> {
    let action = match message.get("action") {
        Some(Value::String(a)) => a.as_str(),
        Some(_) => return Err(MessageError::Malformed("action must be a string".to_string())),
        None => return Err(MessageError::Malformed("missing action".to_string())),
    };
    if !KNOWN_ACTIONS.contains(&action) {
        return Err(MessageError::UnknownAction(action.to_string()));
    }
    serde_json::from_value(message.clone()).map_err(|e| MessageError::Malformed(e.to_string()))
}

/// Executes one command against the app.
pub fn handle_command(app: &mut App, command: Command) -> CommandResult {
    debug!(?command, "handling command");
    let outcome: Result<CommandResult, MessageError> = match command {
        Command::AddCurrentPage { bar_index } => {
            app.add_current_page(bar_index).map(|()| CommandResult::ok())
        }
        Command::AddLinkToBar {
            url,
            title,
            bar_index,
        } => app
            .add_link_to_bar(&url, title.as_deref(), bar_index)
            .map(|()| CommandResult::ok()),
        Command::AddNewBar => app
            .add_new_bar()
            .map(|_| CommandResult::ok())
            .map_err(MessageError::from),
        Command::ToggleExtension => app
            .toggle_extension()
            .map(|()| CommandResult::ok())
            .map_err(MessageError::from),
        Command::GetStatus => Ok(CommandResult::status(app.is_enabled())),
    };
    outcome.unwrap_or_else(|e| {
        warn!(error = %e, "command failed");
        CommandResult::failed(e.to_string())
    })
}

/// Parses and executes a raw JSON message.
pub fn handle_message(app: &mut App, message: &Value) -> CommandResult {
    match parse_command(message) {
        Ok(command) => handle_command(app, command),
        Err(e) => {
            warn!(error = %e, "rejected message");
            CommandResult::failed(e.to_string())
        }
    }
}
