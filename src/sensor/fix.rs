//! Raw receiver fixes and validated position samples.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dimension of a receiver fix
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixDimension {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "2d")]
    TwoD,
    #[serde(rename = "3d")]
    ThreeD,
}

/// A fix as reported by the receiver, before any validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFix {
    pub dimension: FixDimension,
    /// Receiver reports a usable fix status
    pub status_ok: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Meters above mean sea level
    pub altitude: Option<f64>,
    /// Course over ground, degrees clockwise from true north
    pub heading: Option<f64>,
}

impl RawFix {
    /// A complete 3-D fix with a heading
    pub fn three_d(latitude: f64, longitude: f64, altitude: f64, heading: f64) -> Self {
        Self {
            dimension: FixDimension::ThreeD,
            status_ok: true,
            latitude: Some(latitude),
            longitude: Some(longitude),
            altitude: Some(altitude),
            heading: Some(heading),
        }
    }
}

/// Why a raw fix was not accepted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum FixRejection {
    #[error("receiver has no fix")]
    NoFix,
    #[error("fix is not three-dimensional")]
    No3dFix,
    #[error("fix carries no heading")]
    MissingHeading,
    #[error("fix is missing a position field")]
    MissingPosition,
    #[error("fix contains a non-finite value")]
    NonFinite,
    #[error("latitude or longitude out of range")]
    OutOfRange,
}

/// A validated vehicle fix. Immutable; superseded wholesale by the next one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PositionSample {
    latitude: f64,
    longitude: f64,
    altitude: f64,
    heading: f64,
}

impl PositionSample {
    /// Validate explicit values. Heading is normalised into `[0, 360)`.
    pub fn new(latitude: f64, longitude: f64, altitude: f64, heading: f64) -> Result<Self, FixRejection> {
        if ![latitude, longitude, altitude, heading].iter().all(|v| v.is_finite()) {
            return Err(FixRejection::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(FixRejection::OutOfRange);
        }

        Ok(Self {
            latitude,
            longitude,
            altitude,
            heading: normalize_degrees(heading),
        })
    }

    /// Accept a raw fix iff it is a 3-D fix with a heading and finite values.
    ///
    /// Latitude outside [-90, 90] or longitude outside [-180, 180] is also
    /// rejected ([`FixRejection::OutOfRange`]) so that no sample can reach the
    /// solar provider with a position it would refuse.
    pub fn from_fix(fix: &RawFix) -> Result<Self, FixRejection> {
        if !fix.status_ok || fix.dimension == FixDimension::None {
            return Err(FixRejection::NoFix);
        }
        if fix.dimension != FixDimension::ThreeD {
            return Err(FixRejection::No3dFix);
        }
        let heading = fix.heading.ok_or(FixRejection::MissingHeading)?;
        let (Some(latitude), Some(longitude), Some(altitude)) = (fix.latitude, fix.longitude, fix.altitude) else {
            return Err(FixRejection::MissingPosition);
        };

        Self::new(latitude, longitude, altitude, heading)
    }

    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    #[inline]
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    /// Degrees clockwise from true north, in `[0, 360)`
    #[inline]
    pub fn heading(&self) -> f64 {
        self.heading
    }
}

/// Wrap an angle into `[0, 360)`
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
