//! # ptz-relay
//!
//! Command dispatch and live-state broadcast for joystick-driven PTZ camera
//! control.
//!
//! A controller context binds a physical input device to an ordered roster
//! of cameras. Input events are resolved to [`command::Command`]s; the
//! camera-select command keeps its options in step with the roster and
//! announces every selection change to all WebSocket peers.
//!
//! ## Architecture
//!
//! ```text
//! Input layer / REST (api/)          WebSocket peers (ws/)
//!     │                                   ▲
//!     ├── Commands (command/)             │
//!     │     └── CameraSelectCommand ──► BroadcastRegistry (ws/)
//!     │                                   │
//!     ├── ControllerContext (domain/)     └── Envelope codec (ws/)
//!     ├── CameraRoster, Camera (domain/)
//!     │
//!     └── CameraTransport (device protocol, external)
//! ```

pub mod api;
pub mod app_state;
pub mod command;
pub mod config;
pub mod domain;
pub mod error;
pub mod ws;
