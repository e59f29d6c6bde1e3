//! Contract for the camera transport that actually moves cameras.
//!
//! The relay does not speak any camera protocol itself. Control commands
//! resolve the selected camera and hand the requested [`Control`] and
//! option value to a [`CameraTransport`]. [`LoggingTransport`] is the
//! default implementation used when no device protocol is wired in.

use std::fmt;

use serde::Serialize;

use super::camera::Camera;
use crate::error::DispatchError;

/// Camera function addressed by a control command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    /// Horizontal movement.
    Pan,
    /// Vertical movement.
    Tilt,
    /// Optical zoom.
    Zoom,
    /// Manual focus drive.
    FocusMove,
    /// Auto/manual focus mode.
    FocusMode,
    /// Focus lock.
    FocusLock,
    /// Preset recall.
    Preset,
    /// Speed used when recalling presets.
    PresetRecallSpeed,
    /// Camera power.
    Power,
}

impl Control {
    /// Every control, in the order commands are assembled.
    pub const ALL: [Self; 9] = [
        Self::Pan,
        Self::Tilt,
        Self::Zoom,
        Self::FocusMove,
        Self::FocusMode,
        Self::FocusLock,
        Self::Preset,
        Self::PresetRecallSpeed,
        Self::Power,
    ];
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pan => "pan",
            Self::Tilt => "tilt",
            Self::Zoom => "zoom",
            Self::FocusMove => "focus_move",
            Self::FocusMode => "focus_mode",
            Self::FocusLock => "focus_lock",
            Self::Preset => "preset",
            Self::PresetRecallSpeed => "preset_recall_speed",
            Self::Power => "power",
        };
        f.write_str(s)
    }
}

/// Device protocol able to apply a control to a camera.
pub trait CameraTransport: Send + Sync + fmt::Debug {
    /// Applies `control` with the validated option `value` to `camera`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Transport`] if the device could not be
    /// reached or refused the request.
    fn apply(&self, camera: &Camera, control: Control, value: i32) -> Result<(), DispatchError>;
}

/// Transport that only records requests in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingTransport;

impl CameraTransport for LoggingTransport {
    fn apply(&self, camera: &Camera, control: Control, value: i32) -> Result<(), DispatchError> {
        tracing::info!(camera = %camera.name(), %control, value, "camera control requested");
        Ok(())
    }
}
