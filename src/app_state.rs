//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::command::{Command, CommandAssembler};
use crate::domain::ControllerContext;
use crate::ws::BroadcastRegistry;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Registry of push-channel peers.
    pub registry: Arc<BroadcastRegistry>,
    /// The controller context the REST surface drives.
    pub context: Arc<ControllerContext>,
    /// Commands assembled for `context`, in binding order.
    pub commands: Arc<Vec<Box<dyn Command>>>,
}

impl AppState {
    /// Assembles the commands for `context` and bundles the shared state.
    #[must_use]
    pub fn new(
        registry: Arc<BroadcastRegistry>,
        context: Arc<ControllerContext>,
        assembler: &CommandAssembler,
    ) -> Self {
        let commands = Arc::new(assembler.build_commands(&context));
        Self {
            registry,
            context,
            commands,
        }
    }
}
