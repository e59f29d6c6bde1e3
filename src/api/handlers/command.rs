//! Command handlers: list and execute.
//!
//! These endpoints stand in for the raw-input layer: they resolve a command
//! by its position in the binding order and pass an option index to
//! [`Command::execute`](crate::command::Command::execute).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CommandDto, ExecuteRequest, ExecuteResponse};
use crate::app_state::AppState;
use crate::error::DispatchError;

/// `GET /commands`: List assembled commands with their current options.
async fn list_commands(State(state): State<AppState>) -> impl IntoResponse {
    let data: Vec<CommandDto> = state
        .commands
        .iter()
        .enumerate()
        .map(|(index, command)| CommandDto {
            index,
            command_name: command.command_name().to_string(),
            axis_parameter_name: command.axis_parameter_name().to_string(),
            button_parameter_name: command.button_parameter_name().to_string(),
            options: command.options(),
        })
        .collect();
    Json(data)
}

/// `POST /commands/{index}/execute`: Apply an option of one command.
///
/// # Errors
///
/// Returns [`DispatchError::CommandNotFound`] for an unknown index and
/// whatever the command itself rejects the value with.
async fn execute_command(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<ExecuteRequest>,
) -> Result<impl IntoResponse, DispatchError> {
    let command = state
        .commands
        .get(index)
        .ok_or(DispatchError::CommandNotFound(index))?;

    command.execute(req.value)?;
    tracing::debug!(command = command.command_name(), value = req.value, "command executed");

    Ok(Json(ExecuteResponse {
        command_name: command.command_name().to_string(),
        value: req.value,
        selected_camera: state.context.selected_camera().map(|c| c.name()),
    }))
}

/// Command routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/commands", get(list_commands))
        .route("/commands/{index}/execute", post(execute_command))
}
