//! Roster handlers: list, add, rename, remove and reorder cameras.
//!
//! The roster normally belongs to the application's device setup; these
//! endpoints let an operator mutate it at runtime. Every mutation flows
//! through [`CameraRoster`](crate::domain::CameraRoster) so that the
//! camera-select command observes it like any other change.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};

use crate::api::dto::{CameraDto, CameraListResponse, CameraNameRequest};
use crate::app_state::AppState;
use crate::domain::Camera;
use crate::error::DispatchError;

/// `GET /cameras`: Roster in order plus the current selection.
async fn list_cameras(State(state): State<AppState>) -> impl IntoResponse {
    let selected = state.context.selected_camera().map(|c| c.id());
    let cameras = state
        .context
        .roster()
        .snapshot()
        .iter()
        .enumerate()
        .map(|(index, camera)| CameraDto {
            index,
            camera_id: camera.id(),
            name: camera.name(),
            selected: selected == Some(camera.id()),
        })
        .collect();

    Json(CameraListResponse {
        controller: state.context.name().to_string(),
        cameras,
        selected_camera_id: selected,
    })
}

/// `POST /cameras`: Append a camera to the roster.
///
/// # Errors
///
/// Returns [`DispatchError::InvalidRequest`] for a blank name.
async fn add_camera(
    State(state): State<AppState>,
    Json(req): Json<CameraNameRequest>,
) -> Result<impl IntoResponse, DispatchError> {
    let name = req.validated()?;
    let camera = Camera::new(name);
    let roster = state.context.roster();
    roster.push(Arc::clone(&camera));
    tracing::info!(camera = %camera.id(), name = %camera.name(), "camera added");

    let dto = CameraDto {
        index: roster.len().saturating_sub(1),
        camera_id: camera.id(),
        name: camera.name(),
        selected: false,
    };
    Ok((StatusCode::CREATED, Json(dto)))
}

/// `PUT /cameras/{index}`: Rename a camera.
///
/// # Errors
///
/// Returns [`DispatchError::CameraNotFound`] for an unknown index and
/// [`DispatchError::InvalidRequest`] for a blank name.
async fn rename_camera(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(req): Json<CameraNameRequest>,
) -> Result<impl IntoResponse, DispatchError> {
    let name = req.validated()?;
    let camera = state
        .context
        .roster()
        .get(index)
        .ok_or(DispatchError::CameraNotFound(index))?;
    camera.rename(name);

    let selected = state
        .context
        .selected_camera()
        .is_some_and(|c| c.id() == camera.id());
    Ok(Json(CameraDto {
        index,
        camera_id: camera.id(),
        name: camera.name(),
        selected,
    }))
}

/// `DELETE /cameras/{index}`: Remove a camera from the roster.
///
/// # Errors
///
/// Returns [`DispatchError::CameraNotFound`] for an unknown index.
async fn remove_camera(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<impl IntoResponse, DispatchError> {
    let camera = state.context.roster().remove_at(index)?;
    tracing::info!(camera = %camera.id(), name = %camera.name(), "camera removed");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /cameras/{from}/move/{to}`: Reorder the roster.
///
/// # Errors
///
/// Returns [`DispatchError::CameraNotFound`] if either index is unknown.
async fn move_camera(
    State(state): State<AppState>,
    Path((from, to)): Path<(usize, usize)>,
) -> Result<impl IntoResponse, DispatchError> {
    state.context.roster().move_camera(from, to)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Roster routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cameras", get(list_cameras).post(add_camera))
        .route("/cameras/{index}", put(rename_camera).delete(remove_camera))
        .route("/cameras/{from}/move/{to}", post(move_camera))
}
