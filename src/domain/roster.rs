//! Ordered, observable camera roster.
//!
//! [`CameraRoster`] is the collection a controller context binds its
//! cameras in. Roster order is meaningful: a camera's position is the
//! option index the camera-select command exposes for it. Every mutation
//! raises exactly one [`RosterChange`] after the roster lock is released.

use std::sync::{Arc, MutexGuard, PoisonError};

use super::CameraId;
use super::camera::Camera;
use super::listeners::{ListenerId, Listeners};
use crate::error::DispatchError;

/// Membership change raised by [`CameraRoster`].
#[derive(Debug, Clone)]
pub enum RosterChange {
    /// Cameras were inserted starting at `index`.
    Added {
        /// Position of the first inserted camera.
        index: usize,
        /// Inserted cameras, in roster order.
        cameras: Vec<Arc<Camera>>,
    },
    /// Cameras were removed starting at `index`.
    Removed {
        /// Former position of the first removed camera.
        index: usize,
        /// Removed cameras, in former roster order.
        cameras: Vec<Arc<Camera>>,
    },
    /// The camera at `index` was swapped for another one.
    Replaced {
        /// Position of the swap.
        index: usize,
        /// Camera that left the roster.
        old: Arc<Camera>,
        /// Camera that took its place.
        new: Arc<Camera>,
    },
    /// A camera changed position without leaving the roster.
    Moved {
        /// Former position.
        from: usize,
        /// New position.
        to: usize,
        /// The moved camera.
        camera: Arc<Camera>,
    },
    /// The whole content was swapped at once.
    Reset {
        /// Previous content.
        old: Vec<Arc<Camera>>,
        /// New content.
        new: Vec<Arc<Camera>>,
    },
}

impl RosterChange {
    /// Cameras that left the roster with this change.
    ///
    /// A move never removes anything.
    #[must_use]
    pub fn removed(&self) -> &[Arc<Camera>] {
        match self {
            Self::Removed { cameras, .. } => cameras,
            Self::Replaced { old, .. } => std::slice::from_ref(old),
            Self::Reset { old, .. } => old,
            Self::Added { .. } | Self::Moved { .. } => &[],
        }
    }

    /// Cameras that joined the roster with this change.
    #[must_use]
    pub fn inserted(&self) -> &[Arc<Camera>] {
        match self {
            Self::Added { cameras, .. } => cameras,
            Self::Replaced { new, .. } => std::slice::from_ref(new),
            Self::Reset { new, .. } => new,
            Self::Removed { .. } | Self::Moved { .. } => &[],
        }
    }

    /// Returns `true` if the change only reordered the roster.
    #[must_use]
    pub const fn is_move(&self) -> bool {
        matches!(self, Self::Moved { .. })
    }
}

/// Ordered collection of camera handles owned by a controller context.
#[derive(Debug, Default)]
pub struct CameraRoster {
    cameras: std::sync::Mutex<Vec<Arc<Camera>>>,
    changed: Listeners<RosterChange>,
}

impl CameraRoster {
    /// Creates an empty roster.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a roster holding `cameras` in the given order.
    #[must_use]
    pub fn from_cameras(cameras: impl IntoIterator<Item = Arc<Camera>>) -> Arc<Self> {
        Arc::new(Self {
            cameras: std::sync::Mutex::new(cameras.into_iter().collect()),
            changed: Listeners::new(),
        })
    }

    /// Appends a camera at the end of the roster.
    pub fn push(&self, camera: Arc<Camera>) {
        let index = {
            let mut cameras = self.lock();
            cameras.push(Arc::clone(&camera));
            cameras.len() - 1
        };
        self.changed.emit(&RosterChange::Added {
            index,
            cameras: vec![camera],
        });
    }

    /// Inserts a camera at `index`, shifting later cameras back.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::CameraNotFound`] if `index` is past the end.
    pub fn insert(&self, index: usize, camera: Arc<Camera>) -> Result<(), DispatchError> {
        {
            let mut cameras = self.lock();
            if index > cameras.len() {
                return Err(DispatchError::CameraNotFound(index));
            }
            cameras.insert(index, Arc::clone(&camera));
        }
        self.changed.emit(&RosterChange::Added {
            index,
            cameras: vec![camera],
        });
        Ok(())
    }

    /// Removes and returns the camera at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::CameraNotFound`] if `index` is out of range.
    pub fn remove_at(&self, index: usize) -> Result<Arc<Camera>, DispatchError> {
        let camera = {
            let mut cameras = self.lock();
            if index >= cameras.len() {
                return Err(DispatchError::CameraNotFound(index));
            }
            cameras.remove(index)
        };
        self.changed.emit(&RosterChange::Removed {
            index,
            cameras: vec![Arc::clone(&camera)],
        });
        Ok(camera)
    }

    /// Removes the first camera with the given identity.
    pub fn remove(&self, id: CameraId) -> Option<Arc<Camera>> {
        let index = self.position(id)?;
        self.remove_at(index).ok()
    }

    /// Swaps the camera at `index` for `camera`, returning the old one.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::CameraNotFound`] if `index` is out of range.
    pub fn replace_at(
        &self,
        index: usize,
        camera: Arc<Camera>,
    ) -> Result<Arc<Camera>, DispatchError> {
        let old = {
            let mut cameras = self.lock();
            let slot = cameras
                .get_mut(index)
                .ok_or(DispatchError::CameraNotFound(index))?;
            std::mem::replace(slot, Arc::clone(&camera))
        };
        self.changed.emit(&RosterChange::Replaced {
            index,
            old: Arc::clone(&old),
            new: camera,
        });
        Ok(old)
    }

    /// Moves the camera at `from` to position `to`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::CameraNotFound`] if either index is out of
    /// range.
    pub fn move_camera(&self, from: usize, to: usize) -> Result<(), DispatchError> {
        let camera = {
            let mut cameras = self.lock();
            if from >= cameras.len() {
                return Err(DispatchError::CameraNotFound(from));
            }
            if to >= cameras.len() {
                return Err(DispatchError::CameraNotFound(to));
            }
            if from == to {
                return Ok(());
            }
            let camera = cameras.remove(from);
            cameras.insert(to, Arc::clone(&camera));
            camera
        };
        self.changed
            .emit(&RosterChange::Moved { from, to, camera });
        Ok(())
    }

    /// Replaces the whole content with `cameras`.
    pub fn reset(&self, cameras: Vec<Arc<Camera>>) {
        let old = std::mem::replace(&mut *self.lock(), cameras.clone());
        self.changed.emit(&RosterChange::Reset { old, new: cameras });
    }

    /// Removes every camera.
    pub fn clear(&self) {
        self.reset(Vec::new());
    }

    /// Returns the camera at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Arc<Camera>> {
        self.lock().get(index).cloned()
    }

    /// Returns the roster position of the camera with the given identity.
    #[must_use]
    pub fn position(&self, id: CameraId) -> Option<usize> {
        self.lock().iter().position(|c| c.id() == id)
    }

    /// Returns `true` if a camera with the given identity is in the roster.
    #[must_use]
    pub fn contains(&self, id: CameraId) -> bool {
        self.position(id).is_some()
    }

    /// Returns a point-in-time copy of the roster content.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Arc<Camera>> {
        self.lock().clone()
    }

    /// Returns the number of cameras.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the roster is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Subscribes to membership changes.
    pub fn on_changed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&RosterChange) + Send + Sync + 'static,
    {
        self.changed.subscribe(listener)
    }

    /// Detaches a listener installed with [`CameraRoster::on_changed`].
    pub fn detach_changed(&self, id: ListenerId) -> bool {
        self.changed.unsubscribe(id)
    }

    /// Number of membership listeners currently attached.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.changed.len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<Camera>>> {
        self.cameras.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn names(roster: &CameraRoster) -> Vec<String> {
        roster.snapshot().iter().map(|c| c.name()).collect()
    }

    fn recorder(roster: &CameraRoster) -> Arc<Mutex<Vec<RosterChange>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        roster.on_changed(move |change| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(change.clone());
        });
        log
    }

    #[test]
    fn push_and_insert_keep_order() {
        let roster = CameraRoster::new();
        roster.push(Camera::new("Cam1"));
        roster.push(Camera::new("Cam3"));
        assert!(roster.insert(1, Camera::new("Cam2")).is_ok());
        assert_eq!(names(&roster), ["Cam1", "Cam2", "Cam3"]);
    }

    #[test]
    fn insert_past_end_is_rejected() {
        let roster = CameraRoster::new();
        let result = roster.insert(1, Camera::new("Cam1"));
        assert!(matches!(result, Err(DispatchError::CameraNotFound(1))));
        assert!(roster.is_empty());
    }

    #[test]
    fn remove_reports_removed_camera() {
        let cam2 = Camera::new("Cam2");
        let roster = CameraRoster::from_cameras([Camera::new("Cam1"), Arc::clone(&cam2)]);
        let log = recorder(&roster);

        let removed = roster.remove(cam2.id());
        assert!(removed.is_some());

        let log = log.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(change) = log.first() else {
            panic!("expected a change");
        };
        assert_eq!(change.removed().len(), 1);
        assert!(change.inserted().is_empty());
        assert!(!change.is_move());
    }

    #[test]
    fn move_removes_nothing() {
        let roster = CameraRoster::from_cameras([Camera::new("A"), Camera::new("B")]);
        let log = recorder(&roster);
        assert!(roster.move_camera(0, 1).is_ok());
        assert_eq!(names(&roster), ["B", "A"]);

        let log = log.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(change) = log.first() else {
            panic!("expected a change");
        };
        assert!(change.is_move());
        assert!(change.removed().is_empty());
        assert!(change.inserted().is_empty());
    }

    #[test]
    fn move_out_of_range_is_rejected() {
        let roster = CameraRoster::from_cameras([Camera::new("A")]);
        assert!(roster.move_camera(0, 4).is_err());
        assert!(roster.move_camera(2, 0).is_err());
    }

    #[test]
    fn replace_reports_both_sides() {
        let roster = CameraRoster::from_cameras([Camera::new("A")]);
        let log = recorder(&roster);
        let Ok(old) = roster.replace_at(0, Camera::new("B")) else {
            panic!("replace failed");
        };
        assert_eq!(old.name(), "A");

        let log = log.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(change) = log.first() else {
            panic!("expected a change");
        };
        assert_eq!(change.removed().len(), 1);
        assert_eq!(change.inserted().len(), 1);
    }

    #[test]
    fn clear_reports_every_old_camera() {
        let roster = CameraRoster::from_cameras([Camera::new("A"), Camera::new("B")]);
        let log = recorder(&roster);
        roster.clear();
        assert!(roster.is_empty());

        let log = log.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(change) = log.first() else {
            panic!("expected a change");
        };
        assert_eq!(change.removed().len(), 2);
    }

    #[test]
    fn remove_at_out_of_range() {
        let roster = CameraRoster::new();
        assert!(matches!(
            roster.remove_at(0),
            Err(DispatchError::CameraNotFound(0))
        ));
    }
}
