//! Builds the command set for a controller context.

use std::sync::Arc;

use super::{CameraSelectCommand, Command, ControlCommand};
use crate::domain::{CameraTransport, Control, ControllerContext};
use crate::ws::BroadcastRegistry;

/// Factory for the ordered command list of a controller.
///
/// Holds only the shared collaborators handed to every command: the
/// broadcast registry (camera-select only) and the camera transport
/// (control commands only).
#[derive(Debug, Clone)]
pub struct CommandAssembler {
    registry: Arc<BroadcastRegistry>,
    transport: Arc<dyn CameraTransport>,
}

impl CommandAssembler {
    /// Creates an assembler sharing `registry` and `transport`.
    #[must_use]
    pub fn new(registry: Arc<BroadcastRegistry>, transport: Arc<dyn CameraTransport>) -> Self {
        Self {
            registry,
            transport,
        }
    }

    /// Builds one command per control for `context`, in binding order:
    /// pan, tilt, zoom, focus, focus mode, focus lock, preset, preset
    /// recall speed, select camera, power.
    #[must_use]
    pub fn build_commands(&self, context: &Arc<ControllerContext>) -> Vec<Box<dyn Command>> {
        let mut commands: Vec<Box<dyn Command>> = Vec::with_capacity(Control::ALL.len() + 1);
        for control in Control::ALL {
            if control == Control::Power {
                commands.push(Box::new(CameraSelectCommand::new(
                    Arc::clone(context),
                    Arc::clone(&self.registry),
                )));
            }
            commands.push(Box::new(ControlCommand::new(
                control,
                Arc::clone(context),
                Arc::clone(&self.transport),
            )));
        }
        tracing::info!(
            context = %context.id(),
            controller = context.name(),
            commands = commands.len(),
            "commands assembled"
        );
        commands
    }
}
