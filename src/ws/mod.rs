//! WebSocket layer: envelope codec, peer registry and connection handling.
//!
//! The push channel is one upgradeable endpoint (default `/ws`). Every
//! connected peer receives every broadcast; there is no subscription
//! filtering and no authentication.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod registry;

pub use messages::{Envelope, EnvelopeType, SELECTED_CAMERA_CHANGED, SelectedCameraPayload};
pub use registry::BroadcastRegistry;
