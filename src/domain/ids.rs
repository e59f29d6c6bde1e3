//! Type-safe identifiers.
//!
//! Cameras, controller contexts and push-channel connections are each
//! identified by a newtype wrapper around a [`uuid::Uuid`] (v4), so that one
//! kind of identifier cannot be passed where another is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing [`uuid::Uuid`].
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner [`uuid::Uuid`].
            #[must_use]
            pub const fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<uuid::Uuid> for $name {
            fn from(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for a camera device handle.
    ///
    /// Generated when the camera is registered and immutable thereafter.
    /// Renaming a camera never changes its identity.
    CameraId
);

uuid_id!(
    /// Unique identifier for a controller context (one physical input device).
    ///
    /// Also used as the key under which the context's last selection
    /// notification is retained by the broadcast registry.
    ContextId
);

uuid_id!(
    /// Unique identifier for one accepted push-channel connection.
    ConnectionId
);

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_unique_ids() {
        assert_ne!(CameraId::new(), CameraId::new());
        assert_ne!(ConnectionId::new(), ConnectionId::new());
    }

    #[test]
    fn display_is_uuid_format() {
        let s = format!("{}", ContextId::new());
        assert_eq!(s.len(), 36);
        assert!(s.contains('-'));
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let uuid = uuid::Uuid::new_v4();
        let id = CameraId::from_uuid(uuid);
        let Ok(json) = serde_json::to_string(&id) else {
            panic!("serialization failed");
        };
        assert_eq!(json, format!("\"{uuid}\""));
        assert_eq!(*id.as_uuid(), uuid);
    }
}
