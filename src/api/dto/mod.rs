//! Data Transfer Objects for REST request/response serialization.

pub mod camera_dto;
pub mod command_dto;

pub use camera_dto::*;
pub use command_dto::*;
