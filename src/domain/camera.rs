//! Camera device handle.
//!
//! A [`Camera`] carries an immutable identity and a mutable display name.
//! The command layer never owns cameras; it only observes renames through
//! [`Camera::on_renamed`].

use std::sync::{Arc, PoisonError, RwLock};

use super::CameraId;
use super::listeners::{ListenerId, Listeners};

/// Event raised after a camera's display name changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraRenamed {
    /// Camera whose name changed.
    pub camera_id: CameraId,
    /// Name before the change.
    pub old_name: String,
    /// Name after the change.
    pub new_name: String,
}

/// Handle to one remotely controlled PTZ camera.
#[derive(Debug)]
pub struct Camera {
    id: CameraId,
    name: RwLock<String>,
    renamed: Listeners<CameraRenamed>,
}

impl Camera {
    /// Creates a new camera handle with a fresh [`CameraId`].
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_id(CameraId::new(), name)
    }

    /// Creates a camera handle with a known identity.
    #[must_use]
    pub fn with_id(id: CameraId, name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id,
            name: RwLock::new(name.into()),
            renamed: Listeners::new(),
        })
    }

    /// Returns the camera identity.
    #[must_use]
    pub const fn id(&self) -> CameraId {
        self.id
    }

    /// Returns the current display name.
    #[must_use]
    pub fn name(&self) -> String {
        self.name
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Changes the display name and notifies rename listeners.
    ///
    /// Setting the name it already has is a no-op and raises no event.
    pub fn rename(&self, name: impl Into<String>) {
        let new_name = name.into();
        let old_name = {
            let mut current = self.name.write().unwrap_or_else(PoisonError::into_inner);
            if *current == new_name {
                return;
            }
            std::mem::replace(&mut *current, new_name.clone())
        };
        tracing::debug!(camera = %self.id, %old_name, %new_name, "camera renamed");
        self.renamed.emit(&CameraRenamed {
            camera_id: self.id,
            old_name,
            new_name,
        });
    }

    /// Subscribes to name changes.
    pub fn on_renamed<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&CameraRenamed) + Send + Sync + 'static,
    {
        self.renamed.subscribe(listener)
    }

    /// Detaches a rename listener installed with [`Camera::on_renamed`].
    pub fn detach_renamed(&self, id: ListenerId) -> bool {
        self.renamed.unsubscribe(id)
    }

    /// Number of rename listeners currently attached.
    #[must_use]
    pub fn rename_listener_count(&self) -> usize {
        self.renamed.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn rename_notifies_with_old_and_new() {
        let camera = Camera::new("Cam1");
        let seen: Arc<Mutex<Vec<CameraRenamed>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        camera.on_renamed(move |e| {
            sink.lock().unwrap_or_else(PoisonError::into_inner).push(e.clone());
        });

        camera.rename("North");

        assert_eq!(camera.name(), "North");
        let seen = seen.lock().unwrap_or_else(PoisonError::into_inner);
        assert_eq!(seen.len(), 1);
        let Some(event) = seen.first() else {
            panic!("expected a rename event");
        };
        assert_eq!(event.old_name, "Cam1");
        assert_eq!(event.new_name, "North");
        assert_eq!(event.camera_id, camera.id());
    }

    #[test]
    fn rename_to_same_name_is_silent() {
        let camera = Camera::new("Cam1");
        let calls = Arc::new(Mutex::new(0_u32));
        let sink = Arc::clone(&calls);
        camera.on_renamed(move |_| {
            *sink.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        });
        camera.rename("Cam1");
        assert_eq!(*calls.lock().unwrap_or_else(PoisonError::into_inner), 0);
    }

    #[test]
    fn detach_stops_notifications() {
        let camera = Camera::new("Cam1");
        let id = camera.on_renamed(|_| {});
        assert_eq!(camera.rename_listener_count(), 1);
        assert!(camera.detach_renamed(id));
        assert_eq!(camera.rename_listener_count(), 0);
    }
}
