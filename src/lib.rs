//! AutoShade - sun glare prediction and windshield shading spot placement

pub mod core;
pub mod config;
pub mod sensor;
pub mod solar;
pub mod glare;
pub mod display;
pub mod driver;

pub use config::AutoshadeConfig;
pub use driver::ShadeLoop;
pub use glare::{GlareEngine, GlareState, TrackingState};
