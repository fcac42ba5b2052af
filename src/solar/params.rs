//! Atmospheric and surface parameters for the solar position computation.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};

/// Fixed site parameters fed to the solar position algorithm.
///
/// Defaults are annual averages for the reference installation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmosphericParams {
    /// Annual average local pressure (millibars)
    pub pressure_mb: f64,
    /// Annual average local temperature (°C)
    pub temperature_c: f64,
    /// Surface slope from the horizontal plane (degrees)
    pub surface_slope_deg: f64,
    /// Surface azimuth rotation from south, positive towards west (degrees)
    pub surface_azimuth_rotation_deg: f64,
    /// Refraction at sunrise/sunset (degrees). Acts as a switch: any positive
    /// value enables the standard 0.5667° correction with the pressure and
    /// temperature above, zero or less disables it. Other magnitudes are not
    /// honoured by the SPA backend.
    pub atmospheric_refraction_deg: f64,
    /// UT1 - UTC (seconds)
    pub delta_ut1: f64,
    /// TT - UT1 (seconds)
    pub delta_t: f64,
    /// Civil time offset from UTC (hours)
    pub timezone_hours: f64,
}

impl Default for AtmosphericParams {
    fn default() -> Self {
        Self {
            pressure_mb: 820.0,
            temperature_c: 11.0,
            surface_slope_deg: 30.0,
            surface_azimuth_rotation_deg: -10.0,
            atmospheric_refraction_deg: 0.5667,
            delta_ut1: 0.0,
            delta_t: 67.0,
            timezone_hours: 0.0,
        }
    }
}

impl AtmosphericParams {
    /// Reject values the algorithm cannot use
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("pressure_mb", self.pressure_mb),
            ("temperature_c", self.temperature_c),
            ("surface_slope_deg", self.surface_slope_deg),
            ("surface_azimuth_rotation_deg", self.surface_azimuth_rotation_deg),
            ("atmospheric_refraction_deg", self.atmospheric_refraction_deg),
            ("delta_ut1", self.delta_ut1),
            ("delta_t", self.delta_t),
            ("timezone_hours", self.timezone_hours),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(Error::Config(format!("atmosphere.{} must be finite", name)));
            }
        }
        if self.pressure_mb <= 0.0 {
            return Err(Error::Config("atmosphere.pressure_mb must be positive".into()));
        }
        if !(-18.0..=18.0).contains(&self.timezone_hours) {
            return Err(Error::Config("atmosphere.timezone_hours must be within ±18".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_site() {
        let p = AtmosphericParams::default();
        assert_eq!(p.pressure_mb, 820.0);
        assert_eq!(p.temperature_c, 11.0);
        assert_eq!(p.surface_slope_deg, 30.0);
        assert_eq!(p.surface_azimuth_rotation_deg, -10.0);
        assert_eq!(p.atmospheric_refraction_deg, 0.5667);
        assert_eq!(p.delta_ut1, 0.0);
        assert_eq!(p.delta_t, 67.0);
        assert_eq!(p.timezone_hours, 0.0);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let p: AtmosphericParams = serde_json::from_str(r#"{"timezone_hours": -5}"#).unwrap();
        assert_eq!(p.timezone_hours, -5.0);
        assert_eq!(p.pressure_mb, 820.0);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut p = AtmosphericParams::default();
        p.delta_t = f64::NAN;
        assert!(p.validate().is_err());

        let mut p = AtmosphericParams::default();
        p.pressure_mb = 0.0;
        assert!(p.validate().is_err());

        let mut p = AtmosphericParams::default();
        p.timezone_hours = 30.0;
        assert!(p.validate().is_err());
    }
}
