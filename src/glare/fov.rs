//! Driver field of view and the glare visibility decision.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Angular window, relative to heading, in which the sun can glare.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOfView {
    /// Azimuth offset left of heading (degrees)
    pub phi_left: f64,
    /// Azimuth offset right of heading (degrees)
    pub phi_right: f64,
    /// Minimum zenith, i.e. the highest sun that can still glare (degrees)
    pub gamma_min: f64,
    /// Zenith at or beyond which the sun is below the horizon (degrees)
    pub zenith_horizon: f64,
    /// Compare azimuth relative to heading modulo 360.
    ///
    /// Off by default: the plain comparison misjudges a heading near north
    /// with the sun just across the 0°/360° seam.
    pub wrap_azimuth: bool,
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self {
            phi_left: 30.0,
            phi_right: 60.0,
            gamma_min: 70.0,
            zenith_horizon: 90.0,
            wrap_azimuth: false,
        }
    }
}

/// Configuration under which the spot mapping has no defined slope
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Degeneracy {
    /// `phi_left + phi_right == 0`
    ZeroAzimuthSpan,
    /// `gamma_min == zenith_horizon`
    ZeroZenithSpan,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degeneracy::ZeroAzimuthSpan => write!(f, "phi_left + phi_right is zero"),
            Degeneracy::ZeroZenithSpan => write!(f, "gamma_min equals zenith_horizon"),
        }
    }
}

/// Azimuth window for one heading, in the frame the comparison is made in
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AzimuthWindow {
    /// `heading - phi_left`
    pub left: f64,
    /// `heading + phi_right`
    pub right: f64,
    /// Sun azimuth expressed in the same frame as `left`/`right`
    pub azimuth: f64,
}

impl FieldOfView {
    /// Check all angles are usable numbers
    pub fn validate(&self) -> Result<()> {
        let angles = [
            ("phi_left", self.phi_left),
            ("phi_right", self.phi_right),
            ("gamma_min", self.gamma_min),
            ("zenith_horizon", self.zenith_horizon),
        ];
        for (name, value) in angles {
            if !value.is_finite() {
                return Err(Error::Config(format!("fov.{} must be finite", name)));
            }
        }
        Ok(())
    }

    /// Which mapping denominator, if any, collapses to zero
    pub fn degeneracy(&self) -> Option<Degeneracy> {
        if self.phi_left + self.phi_right == 0.0 {
            Some(Degeneracy::ZeroAzimuthSpan)
        } else if self.gamma_min == self.zenith_horizon {
            Some(Degeneracy::ZeroZenithSpan)
        } else {
            None
        }
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degeneracy().is_some()
    }

    /// Azimuth window around `heading`.
    ///
    /// With `wrap_azimuth` the sun azimuth is re-expressed as
    /// `heading + delta` where `delta` is the signed offset in `[-180, 180)`.
    pub fn azimuth_window(&self, azimuth: f64, heading: f64) -> AzimuthWindow {
        let azimuth = if self.wrap_azimuth {
            let delta = (azimuth - heading + 180.0).rem_euclid(360.0) - 180.0;
            heading + delta
        } else {
            azimuth
        };

        AzimuthWindow {
            left: heading - self.phi_left,
            right: heading + self.phi_right,
            azimuth,
        }
    }

    /// Whether a sun at (`azimuth`, `zenith`) glares a driver facing `heading`.
    ///
    /// Lower bounds are inclusive, upper bounds exclusive. Always `false`
    /// for a degenerate configuration.
    pub fn sees(&self, azimuth: f64, zenith: f64, heading: f64) -> bool {
        if self.is_degenerate() {
            return false;
        }
        let window = self.azimuth_window(azimuth, heading);

        window.azimuth >= window.left
            && window.azimuth < window.right
            && zenith >= self.gamma_min
            && zenith < self.zenith_horizon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fov() -> FieldOfView {
        FieldOfView::default()
    }

    #[test]
    fn test_reference_values() {
        let f = fov();
        assert_eq!((f.phi_left, f.phi_right, f.gamma_min, f.zenith_horizon), (30.0, 60.0, 70.0, 90.0));
        assert!(!f.wrap_azimuth);
        assert!(f.validate().is_ok());
        assert_eq!(f.degeneracy(), None);
    }

    #[test]
    fn test_azimuth_upper_bound_exclusive() {
        // heading 110: window [80, 170)
        assert!(fov().sees(169.9, 80.0, 110.0));
        assert!(!fov().sees(170.0, 80.0, 110.0));
    }

    #[test]
    fn test_azimuth_lower_bound_inclusive() {
        // heading 100: window [70, 160)
        assert!(fov().sees(70.0, 80.0, 100.0));
        assert!(!fov().sees(69.9, 80.0, 100.0));
        assert!(fov().sees(159.9, 80.0, 100.0));
        assert!(!fov().sees(160.0, 80.0, 100.0));
    }

    #[test]
    fn test_zenith_bounds() {
        assert!(!fov().sees(100.0, 69.9, 100.0));
        assert!(fov().sees(100.0, 70.0, 100.0));
        assert!(fov().sees(100.0, 89.9, 100.0));
        assert!(!fov().sees(100.0, 90.0, 100.0));
    }

    #[test]
    fn test_reference_scenario() {
        // 40 >= 50-30, 40 < 50+60, 80 >= 70, 80 < 90
        assert!(fov().sees(40.0, 80.0, 50.0));
    }

    #[test]
    fn test_seam_without_wrap_is_missed() {
        // Heading 10, sun at 355: 15° left of heading, but the plain comparison misses it
        assert!(!fov().sees(355.0, 80.0, 10.0));
    }

    #[test]
    fn test_seam_with_wrap() {
        let f = FieldOfView { wrap_azimuth: true, ..fov() };
        assert!(f.sees(355.0, 80.0, 10.0));
        assert!(f.sees(5.0, 80.0, 350.0));
        // 30° left of heading 10 is 340: inclusive
        assert!(f.sees(340.0, 80.0, 10.0));
        assert!(!f.sees(339.9, 80.0, 10.0));
        // Away from the seam nothing changes
        assert!(f.sees(169.9, 80.0, 110.0));
        assert!(!f.sees(170.0, 80.0, 110.0));

        // 355 is re-expressed as 10 - 15
        let w = f.azimuth_window(355.0, 10.0);
        assert!((w.azimuth + 5.0).abs() < 1e-9, "azimuth = {}", w.azimuth);
        assert_eq!((w.left, w.right), (-20.0, 70.0));

        // Sun just right of a heading near 360
        let w = f.azimuth_window(5.0, 350.0);
        assert!((w.azimuth - 365.0).abs() < 1e-9, "azimuth = {}", w.azimuth);
    }

    #[test]
    fn test_degenerate_configs() {
        let flat = FieldOfView { phi_left: 30.0, phi_right: -30.0, ..fov() };
        assert_eq!(flat.degeneracy(), Some(Degeneracy::ZeroAzimuthSpan));
        assert!(!flat.sees(100.0, 80.0, 100.0));

        let thin = FieldOfView { gamma_min: 90.0, ..fov() };
        assert_eq!(thin.degeneracy(), Some(Degeneracy::ZeroZenithSpan));
        assert!(!thin.sees(100.0, 90.0, 100.0));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let f = FieldOfView { gamma_min: f64::NAN, ..fov() };
        assert!(f.validate().is_err());
    }
}
