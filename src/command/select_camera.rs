//! Camera-select command.
//!
//! The only command whose options are not fixed: they are the cameras of
//! the context roster, in roster order. The command keeps itself wired to
//! whatever roster the context is bound to:
//!
//! - roster replaced: detach from the old roster and its cameras, attach to
//!   the new one;
//! - cameras removed: clear the selection if it left the roster (a move
//!   never clears it), detach rename listeners of the removed cameras;
//! - cameras inserted: attach rename listeners;
//! - camera renamed: options changed, nothing else.
//!
//! Every selection change is announced on the push channel as a
//! `selectedCameraChanged` envelope, at most once per distinct camera name.
//! The announcement is also retained by the registry so that peers joining
//! later receive the current selection first.
//!
//! Announcements never trust the camera a caller just selected. They
//! re-read the context's selection while holding the announcement lock, so
//! concurrent `execute` calls publish in the order the selections took
//! effect and the last envelope always names the selected camera.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{
    Command, CommandOption, OptionsChangeReason, OptionsChanged, option_at, project_options,
};
use crate::domain::{
    Camera, CameraRenamed, CameraRoster, ControllerContext, ListenerId, Listeners, RosterChange,
    SelectionChanged,
};
use crate::error::DispatchError;
use crate::ws::{BroadcastRegistry, Envelope};

const COMMAND_NAME: &str = "Select camera";
const PARAMETER_NAME: &str = "Camera";

/// Listener handles installed on one roster and its cameras.
struct RosterWiring {
    roster: Arc<CameraRoster>,
    roster_sub: ListenerId,
    camera_subs: Vec<(Arc<Camera>, ListenerId)>,
}

impl RosterWiring {
    fn detach(self) {
        self.roster.detach_changed(self.roster_sub);
        for (camera, id) in self.camera_subs {
            camera.detach_renamed(id);
        }
    }
}

/// What has been published for the context so far.
#[derive(Debug, Default)]
struct Announcement {
    last: Option<String>,
    retired: bool,
}

#[derive(Debug, Clone, Copy)]
struct ContextSubs {
    roster_replaced: ListenerId,
    selection_changed: ListenerId,
}

struct SelectState {
    context: Arc<ControllerContext>,
    registry: Arc<BroadcastRegistry>,
    wiring: Mutex<Option<RosterWiring>>,
    context_subs: Mutex<Option<ContextSubs>>,
    announced: Mutex<Announcement>,
    options_changed: Listeners<OptionsChanged>,
}

/// Selects the active camera of a controller context by roster index.
pub struct CameraSelectCommand {
    state: Arc<SelectState>,
}

impl CameraSelectCommand {
    /// Creates the command, wires it to the context and its roster, and
    /// announces the current selection if there is one.
    #[must_use]
    pub fn new(context: Arc<ControllerContext>, registry: Arc<BroadcastRegistry>) -> Self {
        let state = Arc::new(SelectState {
            context,
            registry,
            wiring: Mutex::new(None),
            context_subs: Mutex::new(None),
            announced: Mutex::new(Announcement::default()),
            options_changed: Listeners::new(),
        });

        let roster = state.context.roster();
        *lock(&state.wiring) = Some(state.wire(roster));

        let weak = Arc::downgrade(&state);
        let roster_replaced = state.context.on_roster_replaced(move |event| {
            if let Some(state) = weak.upgrade() {
                state.on_roster_replaced(&event.roster);
            }
        });
        let weak = Arc::downgrade(&state);
        let selection_changed = state.context.on_selection_changed(move |event| {
            if let Some(state) = weak.upgrade() {
                state.on_selection_changed(event);
            }
        });
        *lock(&state.context_subs) = Some(ContextSubs {
            roster_replaced,
            selection_changed,
        });

        state.sync_announcement();
        Self { state }
    }

    /// Detaches every listener this command installed and drops its
    /// retained announcement. Idempotent; also runs on drop.
    ///
    /// A retired command still selects cameras but never broadcasts again.
    pub fn retire(&self) {
        self.state.detach_all();
    }
}

impl Drop for CameraSelectCommand {
    fn drop(&mut self) {
        self.state.detach_all();
    }
}

impl fmt::Debug for CameraSelectCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraSelectCommand")
            .field("context", &self.state.context.id())
            .field("announced", &lock(&self.state.announced).last)
            .finish_non_exhaustive()
    }
}

impl Command for CameraSelectCommand {
    fn command_name(&self) -> &'static str {
        COMMAND_NAME
    }

    fn axis_parameter_name(&self) -> &'static str {
        PARAMETER_NAME
    }

    fn button_parameter_name(&self) -> &'static str {
        PARAMETER_NAME
    }

    fn options(&self) -> Vec<CommandOption> {
        project_options(self.state.context.roster().snapshot().iter().map(|c| c.name()))
    }

    fn execute(&self, value: i32) -> Result<(), DispatchError> {
        let cameras = self.state.context.roster().snapshot();
        let camera = option_at(COMMAND_NAME, &cameras, value)?;
        self.state.context.select(Some(Arc::clone(camera)))?;
        tracing::debug!(context = %self.state.context.id(), camera = %camera.name(), "camera selected");
        // Also covers re-selecting a camera that was renamed in between,
        // which raises no selection event.
        self.state.sync_announcement();
        Ok(())
    }

    fn options_changed(&self) -> Option<&Listeners<OptionsChanged>> {
        Some(&self.state.options_changed)
    }
}

impl SelectState {
    fn wire(self: &Arc<Self>, roster: Arc<CameraRoster>) -> RosterWiring {
        let weak = Arc::downgrade(self);
        let roster_sub = roster.on_changed(move |change| {
            if let Some(state) = weak.upgrade() {
                state.on_roster_changed(change);
            }
        });
        let camera_subs = roster
            .snapshot()
            .into_iter()
            .map(|camera| {
                let id = self.watch_camera(&camera);
                (camera, id)
            })
            .collect();
        RosterWiring {
            roster,
            roster_sub,
            camera_subs,
        }
    }

    fn watch_camera(self: &Arc<Self>, camera: &Camera) -> ListenerId {
        let weak = Arc::downgrade(self);
        camera.on_renamed(move |event| {
            if let Some(state) = weak.upgrade() {
                state.on_camera_renamed(event);
            }
        })
    }

    fn on_roster_replaced(self: &Arc<Self>, roster: &Arc<CameraRoster>) {
        {
            let mut wiring = lock(&self.wiring);
            let Some(current) = wiring.take() else {
                return;
            };
            if Arc::ptr_eq(&current.roster, roster) {
                *wiring = Some(current);
                return;
            }
            current.detach();
            *wiring = Some(self.wire(Arc::clone(roster)));
        }
        tracing::debug!(context = %self.context.id(), "camera-select rewired to new roster");
        self.notify_options(OptionsChangeReason::RosterReplaced);
    }

    fn on_roster_changed(self: &Arc<Self>, change: &RosterChange) {
        if !change.is_move()
            && let Some(selected) = self.context.selected_camera()
            && change.removed().iter().any(|c| c.id() == selected.id())
            && !self.context.roster().contains(selected.id())
            && self.context.deselect_if(selected.id())
        {
            tracing::info!(
                context = %self.context.id(),
                camera = %selected.name(),
                "selected camera left the roster; selection cleared"
            );
        }

        {
            let mut wiring = lock(&self.wiring);
            let Some(wiring) = wiring.as_mut() else {
                return;
            };
            for camera in change.removed() {
                if let Some(pos) = wiring
                    .camera_subs
                    .iter()
                    .position(|(c, _)| Arc::ptr_eq(c, camera))
                {
                    let (camera, id) = wiring.camera_subs.swap_remove(pos);
                    camera.detach_renamed(id);
                }
            }
            for camera in change.inserted() {
                let id = self.watch_camera(camera);
                wiring.camera_subs.push((Arc::clone(camera), id));
            }
        }
        self.notify_options(OptionsChangeReason::RosterChanged);
    }

    fn on_camera_renamed(&self, event: &CameraRenamed) {
        tracing::debug!(camera = %event.camera_id, new_name = %event.new_name, "camera label changed");
        self.notify_options(OptionsChangeReason::CameraRenamed);
    }

    fn on_selection_changed(&self, _event: &SelectionChanged) {
        self.sync_announcement();
    }

    fn notify_options(&self, reason: OptionsChangeReason) {
        self.options_changed.emit(&OptionsChanged {
            command: COMMAND_NAME,
            reason,
        });
    }

    /// Brings the push channel in line with the context's current
    /// selection.
    ///
    /// Broadcasts the selected camera's name unless it is empty or was the
    /// last name announced. A cleared selection (or an unnamed camera)
    /// drops the retained snapshot instead. Does nothing once retired.
    /// Failures are logged, never returned.
    fn sync_announcement(&self) {
        let mut announced = lock(&self.announced);
        if announced.retired {
            tracing::debug!(context = %self.context.id(), "retired; not broadcasting");
            return;
        }

        let name = self
            .context
            .selected_camera()
            .map(|c| c.name())
            .filter(|n| !n.is_empty());
        let Some(name) = name else {
            if announced.last.take().is_some() {
                self.registry.clear_state(&self.state_key());
            }
            tracing::debug!(context = %self.context.id(), "not broadcasting: no camera name");
            return;
        };

        if announced.last.as_deref() == Some(name.as_str()) {
            tracing::debug!(context = %self.context.id(), camera = %name, "selection unchanged; not broadcasting");
            return;
        }

        let message = match Envelope::selected_camera_changed(name.as_str()).encode() {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(error = %e, camera = %name, "could not encode selection");
                return;
            }
        };
        let delivered = self.registry.publish_state(self.state_key(), message);
        tracing::info!(context = %self.context.id(), camera = %name, delivered, "broadcast selected camera");
        announced.last = Some(name);
    }

    fn retire_announcement(&self) {
        let mut announced = lock(&self.announced);
        announced.retired = true;
        announced.last = None;
        self.registry.clear_state(&self.state_key());
    }

    fn state_key(&self) -> String {
        self.context.id().to_string()
    }

    fn detach_all(&self) {
        if let Some(subs) = lock(&self.context_subs).take() {
            self.context.detach_roster_replaced(subs.roster_replaced);
            self.context.detach_selection_changed(subs.selection_changed);
        }
        self.retire_announcement();
        let wiring = lock(&self.wiring).take();
        if let Some(wiring) = wiring {
            wiring.detach();
            tracing::debug!(context = %self.context.id(), "camera-select command retired");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
