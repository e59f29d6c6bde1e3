//! Command listing and execution DTOs.

use serde::{Deserialize, Serialize};

use crate::command::CommandOption;

/// One assembled command as exposed to clients.
#[derive(Debug, Clone, Serialize)]
pub struct CommandDto {
    /// Position in the binding order; used in the execute path.
    pub index: usize,
    /// Human-readable command name.
    pub command_name: String,
    /// Parameter name for axis bindings.
    pub axis_parameter_name: String,
    /// Parameter name for button bindings.
    pub button_parameter_name: String,
    /// Current options in index order.
    pub options: Vec<CommandOption>,
}

/// Request body for `POST /commands/{index}/execute`.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    /// Option index to apply.
    pub value: i32,
}

/// Response for a successful execution.
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteResponse {
    /// Name of the executed command.
    pub command_name: String,
    /// Applied option index.
    pub value: i32,
    /// Selected camera after execution, if any.
    pub selected_camera: Option<String>,
}
