//! Glare decision and spot mapping.
//!
//! [`FieldOfView`] decides whether the sun is in the driver's view,
//! [`mapping`] turns the sun's angles into surface pixels, and
//! [`GlareEngine`] ties both to the latest fix and cached sun position.

pub mod engine;
pub mod fov;
pub mod mapping;
pub mod state;

pub use engine::{EngineConfig, EngineStats, GlareEngine};
pub use fov::{AzimuthWindow, Degeneracy, FieldOfView};
pub use mapping::{linear_map, spot_position, SurfaceOrientation};
pub use state::{GlareState, TrackingState};
