//! Fixed-option control commands: pan, tilt, zoom, focus, presets, power.
//!
//! These commands have static option tables. Executing one validates the
//! index and forwards it to the [`CameraTransport`] for whichever camera is
//! selected at that moment. With nothing selected the input is accepted
//! and dropped.

use std::fmt;
use std::sync::Arc;

use super::{Command, CommandOption, option_at, project_options};
use crate::domain::{CameraTransport, Control, ControllerContext};
use crate::error::DispatchError;

/// Number of preset slots exposed by the preset command.
pub const PRESET_SLOTS: u8 = 16;

/// Highest preset recall speed.
pub const MAX_RECALL_SPEED: u8 = 24;

/// Command driving one [`Control`] of the selected camera.
pub struct ControlCommand {
    control: Control,
    labels: Vec<String>,
    context: Arc<ControllerContext>,
    transport: Arc<dyn CameraTransport>,
}

impl ControlCommand {
    /// Creates the command for `control` bound to `context`.
    #[must_use]
    pub fn new(
        control: Control,
        context: Arc<ControllerContext>,
        transport: Arc<dyn CameraTransport>,
    ) -> Self {
        Self {
            control,
            labels: option_labels(control),
            context,
            transport,
        }
    }

    /// The control this command drives.
    #[must_use]
    pub const fn control(&self) -> Control {
        self.control
    }
}

impl fmt::Debug for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlCommand")
            .field("control", &self.control)
            .field("context", &self.context.id())
            .field("options", &self.labels.len())
            .finish_non_exhaustive()
    }
}

impl Command for ControlCommand {
    fn command_name(&self) -> &'static str {
        match self.control {
            Control::Pan => "Pan",
            Control::Tilt => "Tilt",
            Control::Zoom => "Zoom",
            Control::FocusMove => "Focus",
            Control::FocusMode => "Focus mode",
            Control::FocusLock => "Focus lock",
            Control::Preset => "Preset",
            Control::PresetRecallSpeed => "Preset recall speed",
            Control::Power => "Power",
        }
    }

    fn axis_parameter_name(&self) -> &'static str {
        match self.control {
            Control::Pan | Control::Tilt | Control::Zoom | Control::FocusMove => "Speed",
            Control::FocusMode => "Mode",
            Control::FocusLock => "Lock",
            Control::Preset => "Preset",
            Control::PresetRecallSpeed => "Speed",
            Control::Power => "Power",
        }
    }

    fn button_parameter_name(&self) -> &'static str {
        match self.control {
            Control::Pan | Control::Tilt | Control::Zoom | Control::FocusMove => "Direction",
            Control::FocusMode => "Mode",
            Control::FocusLock => "Lock",
            Control::Preset => "Preset",
            Control::PresetRecallSpeed => "Speed",
            Control::Power => "Power",
        }
    }

    fn options(&self) -> Vec<CommandOption> {
        project_options(self.labels.iter().map(String::as_str))
    }

    fn execute(&self, value: i32) -> Result<(), DispatchError> {
        let label = option_at(self.command_name(), &self.labels, value)?;
        let Some(camera) = self.context.selected_camera() else {
            tracing::debug!(control = %self.control, %label, "no camera selected; input dropped");
            return Ok(());
        };
        self.transport.apply(&camera, self.control, value)
    }
}

fn option_labels(control: Control) -> Vec<String> {
    let fixed: &[&str] = match control {
        Control::Pan => &["Stop", "Left", "Right"],
        Control::Tilt => &["Stop", "Up", "Down"],
        Control::Zoom => &["Stop", "Tele", "Wide"],
        Control::FocusMove => &["Stop", "Far", "Near"],
        Control::FocusMode => &["Auto", "Manual", "Toggle"],
        Control::FocusLock => &["Lock", "Unlock"],
        Control::Power => &["Off", "On"],
        Control::Preset => {
            return (1..=PRESET_SLOTS).map(|n| format!("Preset {n}")).collect();
        }
        Control::PresetRecallSpeed => {
            return (1..=MAX_RECALL_SPEED).map(|n| n.to_string()).collect();
        }
    };
    fixed.iter().map(|s| (*s).to_string()).collect()
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Camera, CameraRoster};
    use std::sync::{Mutex, PoisonError};

    #[derive(Debug, Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<(String, Control, i32)>>,
    }

    impl CameraTransport for RecordingTransport {
        fn apply(
            &self,
            camera: &crate::domain::Camera,
            control: Control,
            value: i32,
        ) -> Result<(), DispatchError> {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((camera.name(), control, value));
            Ok(())
        }
    }

    #[derive(Debug)]
    struct FailingTransport;

    impl CameraTransport for FailingTransport {
        fn apply(
            &self,
            _camera: &crate::domain::Camera,
            _control: Control,
            _value: i32,
        ) -> Result<(), DispatchError> {
            Err(DispatchError::Transport("unreachable".to_string()))
        }
    }

    fn context_with_selection() -> Arc<ControllerContext> {
        let cam = Camera::new("Cam1");
        let context =
            ControllerContext::new("pad", CameraRoster::from_cameras([Arc::clone(&cam)]));
        if context.select(Some(cam)).is_err() {
            panic!("select failed");
        }
        context
    }

    #[test]
    fn every_control_has_options_and_names() {
        let context = ControllerContext::new("pad", CameraRoster::new());
        for control in Control::ALL {
            let cmd = ControlCommand::new(control, Arc::clone(&context), Arc::new(RecordingTransport::default()));
            assert!(!cmd.options().is_empty(), "{control} has no options");
            assert!(!cmd.command_name().is_empty());
            assert!(!cmd.axis_parameter_name().is_empty());
            assert!(!cmd.button_parameter_name().is_empty());
        }
    }

    #[test]
    fn preset_table_size() {
        let context = ControllerContext::new("pad", CameraRoster::new());
        let cmd = ControlCommand::new(Control::Preset, context, Arc::new(RecordingTransport::default()));
        let options = cmd.options();
        assert_eq!(options.len(), usize::from(PRESET_SLOTS));
        assert_eq!(options.first().map(|o| o.label.as_str()), Some("Preset 1"));
    }

    #[test]
    fn execute_forwards_to_selected_camera() {
        let transport = Arc::new(RecordingTransport::default());
        let cmd = ControlCommand::new(
            Control::Zoom,
            context_with_selection(),
            Arc::clone(&transport) as Arc<dyn CameraTransport>,
        );
        assert!(cmd.execute(1).is_ok());
        let calls = transport.calls.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(calls.as_slice(), [("Cam1".to_string(), Control::Zoom, 1)]);
    }

    #[test]
    fn out_of_range_is_rejected_before_transport() {
        let transport = Arc::new(RecordingTransport::default());
        let cmd = ControlCommand::new(
            Control::Power,
            context_with_selection(),
            Arc::clone(&transport) as Arc<dyn CameraTransport>,
        );
        assert!(matches!(
            cmd.execute(2),
            Err(DispatchError::InvalidCommandValue { value: 2, count: 2, .. })
        ));
        assert!(cmd.execute(-1).is_err());
        assert!(transport.calls.lock().unwrap_or_else(PoisonError::into_inner).is_empty());
    }

    #[test]
    fn no_selection_drops_input() {
        let transport = Arc::new(RecordingTransport::default());
        let context = ControllerContext::new("pad", CameraRoster::from_cameras([Camera::new("Cam1")]));
        let cmd = ControlCommand::new(
            Control::Pan,
            context,
            Arc::clone(&transport) as Arc<dyn CameraTransport>,
        );
        assert!(cmd.execute(1).is_ok());
        assert!(transport.calls.lock().unwrap_or_else(PoisonError::into_inner).is_empty());
    }

    #[test]
    fn transport_errors_reach_the_caller() {
        let cmd = ControlCommand::new(Control::Tilt, context_with_selection(), Arc::new(FailingTransport));
        assert!(matches!(cmd.execute(0), Err(DispatchError::Transport(_))));
    }
}
