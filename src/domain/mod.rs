//! Domain layer: camera handles, rosters, controller contexts and the
//! listener registry they use to publish changes.
//!
//! Everything in here is synchronous. Observables raise their events on
//! the thread that performed the mutation, after their own locks are
//! released.

pub mod camera;
pub mod context;
pub mod ids;
pub mod listeners;
pub mod roster;
pub mod transport;

pub use camera::{Camera, CameraRenamed};
pub use context::{ControllerContext, RosterReplaced, SelectionChanged};
pub use ids::{CameraId, ConnectionId, ContextId};
pub use listeners::{ListenerId, Listeners};
pub use roster::{CameraRoster, RosterChange};
pub use transport::{CameraTransport, Control, LoggingTransport};
