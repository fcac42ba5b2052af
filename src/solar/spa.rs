//! NREL Solar Position Algorithm provider.
//!
//! Wraps `solar_positioning::spa`. Civil time is converted to UT1 with the
//! configured timezone offset and ΔUT1 before the Julian date is formed.

use chrono::{Datelike, NaiveDateTime, TimeDelta, Timelike};
use solar_positioning::{spa, time::JulianDate, RefractionCorrection};

use crate::core::{Error, Result};
use super::{surface_incidence, AtmosphericParams, Location, SolarPosition, SolarPositionProvider};

/// SPA-backed solar position provider. Stateless.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpaProvider;

impl SpaProvider {
    pub fn new() -> Self {
        Self
    }
}

/// Shift civil time to UT1
fn civil_to_ut1(civil: NaiveDateTime, params: &AtmosphericParams) -> Result<NaiveDateTime> {
    let shift_ms = (params.delta_ut1 - params.timezone_hours * 3600.0) * 1000.0;
    let shift = TimeDelta::try_milliseconds(shift_ms.round() as i64)
        .ok_or_else(|| Error::Computation(format!("time shift out of range: {} ms", shift_ms)))?;
    civil
        .checked_add_signed(shift)
        .ok_or_else(|| Error::Computation(format!("civil time {} out of range", civil)))
}

impl SolarPositionProvider for SpaProvider {
    fn compute(
        &self,
        location: &Location,
        civil_time: NaiveDateTime,
        params: &AtmosphericParams,
    ) -> Result<SolarPosition> {
        let ut = civil_to_ut1(civil_time, params)?;
        let seconds = ut.second() as f64 + ut.nanosecond() as f64 / 1e9;

        let jd = JulianDate::from_utc(
            ut.year(),
            ut.month(),
            ut.day(),
            ut.hour(),
            ut.minute(),
            seconds,
            params.delta_t,
        )
        .map_err(|e| Error::Computation(format!("invalid date {}: {:?}", ut, e)))?;

        // The backend's sunrise/sunset threshold is fixed; only on/off is configurable
        let refraction = if params.atmospheric_refraction_deg > 0.0 {
            Some(
                RefractionCorrection::new(params.pressure_mb, params.temperature_c)
                    .map_err(|e| Error::Computation(format!("invalid atmosphere: {:?}", e)))?,
            )
        } else {
            None
        };

        let position = spa::solar_position_from_julian(
            jd,
            location.latitude,
            location.longitude,
            location.altitude,
            refraction,
        )
        .map_err(|e| {
            Error::Computation(format!(
                "SPA rejected ({:.5}, {:.5}, {:.1} m): {:?}",
                location.latitude, location.longitude, location.altitude, e
            ))
        })?;

        let zenith = position.zenith_angle();
        let azimuth = position.azimuth();

        Ok(SolarPosition {
            zenith,
            azimuth,
            incidence: surface_incidence(
                zenith,
                azimuth,
                params.surface_slope_deg,
                params.surface_azimuth_rotation_deg,
            ),
            computed_at: civil_time,
            location: *location,
        })
    }
}
