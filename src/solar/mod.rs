//! Solar position: where the sun is for a given place and civil time.
//!
//! The computation itself sits behind [`SolarPositionProvider`]; the default
//! implementation is the NREL Solar Position Algorithm in [`spa`]. Results are
//! only meaningful together with the location and time they were computed
//! for, so [`SolarPosition`] carries both.

pub mod clock;
pub mod params;
pub mod spa;

pub use clock::{Clock, ManualClock, SystemClock};
pub use params::AtmosphericParams;
pub use spa::SpaProvider;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::sensor::PositionSample;

/// Observer location
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Degrees, north positive
    pub latitude: f64,
    /// Degrees, east positive
    pub longitude: f64,
    /// Meters above mean sea level
    pub altitude: f64,
}

impl From<&PositionSample> for Location {
    fn from(sample: &PositionSample) -> Self {
        Self {
            latitude: sample.latitude(),
            longitude: sample.longitude(),
            altitude: sample.altitude(),
        }
    }
}

/// Topocentric sun position and the context it was computed for.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolarPosition {
    /// Degrees from vertical, `[0, 180]`
    pub zenith: f64,
    /// Degrees clockwise from true north, `[0, 360)`
    pub azimuth: f64,
    /// Angle between the sun and the normal of the configured surface
    pub incidence: f64,
    /// Civil (local) time of the computation
    pub computed_at: NaiveDateTime,
    pub location: Location,
}

impl SolarPosition {
    /// Sun elevation above the horizon in degrees
    #[inline]
    pub fn elevation(&self) -> f64 {
        90.0 - self.zenith
    }
}

/// Computes where the sun is. Implementations must be synchronous and must
/// not perform blocking I/O.
pub trait SolarPositionProvider {
    /// Fails with [`Error::Computation`](crate::core::Error::Computation) on
    /// invalid or out-of-range input.
    fn compute(
        &self,
        location: &Location,
        civil_time: NaiveDateTime,
        params: &AtmosphericParams,
    ) -> Result<SolarPosition>;
}

impl<P: SolarPositionProvider + ?Sized> SolarPositionProvider for Box<P> {
    fn compute(
        &self,
        location: &Location,
        civil_time: NaiveDateTime,
        params: &AtmosphericParams,
    ) -> Result<SolarPosition> {
        (**self).compute(location, civil_time, params)
    }
}

/// Incidence angle of the sun on a tilted surface (NREL SPA eq. 47).
///
/// `slope` is measured from the horizontal; `azimuth_rotation` from south,
/// positive towards west.
pub fn surface_incidence(zenith: f64, azimuth: f64, slope: f64, azimuth_rotation: f64) -> f64 {
    let zenith = zenith.to_radians();
    let slope = slope.to_radians();
    // Astronomers' azimuth: measured westward from south
    let gamma = (azimuth - 180.0).to_radians();
    let rotation = azimuth_rotation.to_radians();

    let cos_incidence = zenith.cos() * slope.cos() + slope.sin() * zenith.sin() * (gamma - rotation).cos();
    cos_incidence.clamp(-1.0, 1.0).acos().to_degrees()
}
