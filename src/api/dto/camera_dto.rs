//! Camera roster DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::CameraId;

/// One roster entry.
#[derive(Debug, Clone, Serialize)]
pub struct CameraDto {
    /// Roster position.
    pub index: usize,
    /// Camera identity.
    pub camera_id: CameraId,
    /// Display name.
    pub name: String,
    /// Whether this camera is the current selection.
    pub selected: bool,
}

/// Response for `GET /cameras`.
#[derive(Debug, Clone, Serialize)]
pub struct CameraListResponse {
    /// Controller display name.
    pub controller: String,
    /// Roster in order.
    pub cameras: Vec<CameraDto>,
    /// Identity of the selected camera, if any.
    pub selected_camera_id: Option<CameraId>,
}

/// Request body for adding or renaming a camera.
#[derive(Debug, Clone, Deserialize)]
pub struct CameraNameRequest {
    /// Display name.
    pub name: String,
}

impl CameraNameRequest {
    /// Returns the trimmed name.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::DispatchError::InvalidRequest`] if the name is
    /// blank.
    pub fn validated(&self) -> Result<String, crate::error::DispatchError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(crate::error::DispatchError::InvalidRequest(
                "camera name must not be empty".to_string(),
            ));
        }
        Ok(name.to_string())
    }
}
