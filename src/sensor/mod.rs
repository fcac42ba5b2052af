//! Vehicle position input.
//!
//! A [`SensorFeed`] hands out [`RawFix`] values without blocking. Only fixes
//! that pass [`PositionSample::from_fix`] ever reach the glare engine.

pub mod fix;
pub mod gpsd;
pub mod replay;

pub use fix::{FixDimension, FixRejection, PositionSample, RawFix};
pub use gpsd::GpsdFeed;
pub use replay::ReplayFeed;

/// Non-blocking source of position fixes.
pub trait SensorFeed {
    /// Next buffered fix, or `None` if nothing new is available.
    /// Must return immediately; transient errors are logged and reported as `None`.
    fn poll(&mut self) -> Option<RawFix>;
}

impl<F: SensorFeed + ?Sized> SensorFeed for Box<F> {
    fn poll(&mut self) -> Option<RawFix> {
        (**self).poll()
    }
}
