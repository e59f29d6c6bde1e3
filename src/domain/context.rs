//! Controller context: one physical input device bound to a camera roster.
//!
//! The context owns the roster reference and the current selection. It is
//! created by the application and shared with the commands built for it.
//! Two signals are exposed: [`RosterReplaced`] when a different roster
//! object is bound, and [`SelectionChanged`] when the selected camera
//! changes identity.

use std::sync::{Arc, PoisonError, RwLock};

use super::camera::Camera;
use super::listeners::{ListenerId, Listeners};
use super::roster::CameraRoster;
use super::{CameraId, ContextId};
use crate::error::DispatchError;

/// Signal raised after a context was bound to a different roster.
#[derive(Debug, Clone)]
pub struct RosterReplaced {
    /// The newly bound roster.
    pub roster: Arc<CameraRoster>,
}

/// Signal raised after the selected camera changed.
#[derive(Debug, Clone)]
pub struct SelectionChanged {
    /// Previously selected camera.
    pub previous: Option<Arc<Camera>>,
    /// Newly selected camera, or `None` when the selection was cleared.
    pub current: Option<Arc<Camera>>,
}

/// Binding of a camera roster and the current selection for one controller.
#[derive(Debug)]
pub struct ControllerContext {
    id: ContextId,
    name: String,
    roster: RwLock<Arc<CameraRoster>>,
    selected: RwLock<Option<Arc<Camera>>>,
    roster_replaced: Listeners<RosterReplaced>,
    selection_changed: Listeners<SelectionChanged>,
}

impl ControllerContext {
    /// Creates a context bound to `roster` with nothing selected.
    #[must_use]
    pub fn new(name: impl Into<String>, roster: Arc<CameraRoster>) -> Arc<Self> {
        Arc::new(Self {
            id: ContextId::new(),
            name: name.into(),
            roster: RwLock::new(roster),
            selected: RwLock::new(None),
            roster_replaced: Listeners::new(),
            selection_changed: Listeners::new(),
        })
    }

    /// Returns the context identity.
    #[must_use]
    pub const fn id(&self) -> ContextId {
        self.id
    }

    /// Returns the display name of the controller.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the currently bound roster.
    #[must_use]
    pub fn roster(&self) -> Arc<CameraRoster> {
        Arc::clone(&self.roster.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Binds a different roster object.
    ///
    /// A selection that is not part of the new roster is cleared first.
    /// Binding the roster that is already bound is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::NullRosterAssignment`] when `roster` is
    /// `None`; nothing is changed in that case.
    pub fn replace_roster(&self, roster: Option<Arc<CameraRoster>>) -> Result<(), DispatchError> {
        let roster = roster.ok_or(DispatchError::NullRosterAssignment)?;
        {
            let mut current = self.roster.write().unwrap_or_else(PoisonError::into_inner);
            if Arc::ptr_eq(&current, &roster) {
                return Ok(());
            }
            *current = Arc::clone(&roster);
        }
        tracing::info!(context = %self.id, cameras = roster.len(), "camera roster replaced");

        if let Some(selected) = self.selected_camera()
            && !roster.contains(selected.id())
        {
            self.set_selected(None);
        }
        self.roster_replaced.emit(&RosterReplaced { roster });
        Ok(())
    }

    /// Returns the selected camera, if any.
    #[must_use]
    pub fn selected_camera(&self) -> Option<Arc<Camera>> {
        self.selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Selects `camera`, or clears the selection with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::CameraNotInRoster`] if the camera is not
    /// part of the bound roster; the selection is left unchanged.
    pub fn select(&self, camera: Option<Arc<Camera>>) -> Result<(), DispatchError> {
        if let Some(camera) = &camera
            && !self.roster().contains(camera.id())
        {
            return Err(DispatchError::CameraNotInRoster(camera.id()));
        }
        self.set_selected(camera);
        Ok(())
    }

    /// Clears the selection if it currently points at `camera_id`.
    ///
    /// Returns `true` if the selection was cleared.
    pub fn deselect_if(&self, camera_id: CameraId) -> bool {
        let matches = self
            .selected_camera()
            .is_some_and(|selected| selected.id() == camera_id);
        if matches {
            self.set_selected(None);
        }
        matches
    }

    /// Subscribes to roster replacement.
    pub fn on_roster_replaced<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&RosterReplaced) + Send + Sync + 'static,
    {
        self.roster_replaced.subscribe(listener)
    }

    /// Detaches a listener installed with
    /// [`ControllerContext::on_roster_replaced`].
    pub fn detach_roster_replaced(&self, id: ListenerId) -> bool {
        self.roster_replaced.unsubscribe(id)
    }

    /// Subscribes to selection changes.
    pub fn on_selection_changed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SelectionChanged) + Send + Sync + 'static,
    {
        self.selection_changed.subscribe(listener)
    }

    /// Detaches a listener installed with
    /// [`ControllerContext::on_selection_changed`].
    pub fn detach_selection_changed(&self, id: ListenerId) -> bool {
        self.selection_changed.unsubscribe(id)
    }

    /// Number of listeners attached to either context signal.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.roster_replaced.len() + self.selection_changed.len()
    }

    fn set_selected(&self, camera: Option<Arc<Camera>>) {
        let previous = {
            let mut selected = self.selected.write().unwrap_or_else(PoisonError::into_inner);
            let same = match (selected.as_ref(), camera.as_ref()) {
                (Some(a), Some(b)) => a.id() == b.id(),
                (None, None) => true,
                _ => false,
            };
            if same {
                return;
            }
            std::mem::replace(&mut *selected, camera.clone())
        };
        tracing::debug!(
            context = %self.id,
            camera = %camera.as_ref().map(|c| c.name()).unwrap_or_default(),
            "selected camera changed"
        );
        self.selection_changed.emit(&SelectionChanged {
            previous,
            current: camera,
        });
    }
}
