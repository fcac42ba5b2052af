//! gpsd-backed sensor feed

use autoshade_gpsd::{FixMode, ReportStream, Tpv};

use super::fix::{FixDimension, RawFix};
use super::SensorFeed;

impl From<&Tpv> for RawFix {
    fn from(tpv: &Tpv) -> Self {
        let dimension = match tpv.fix_mode() {
            FixMode::Fix3d => FixDimension::ThreeD,
            FixMode::Fix2d => FixDimension::TwoD,
            FixMode::NoFix | FixMode::Unknown => FixDimension::None,
        };

        RawFix {
            dimension,
            status_ok: tpv.has_fix_status(),
            latitude: tpv.lat,
            longitude: tpv.lon,
            altitude: tpv.altitude(),
            heading: tpv.track,
        }
    }
}

/// Feed reading TPV reports streamed by an `autoshade_gpsd::GpsdClient`
pub struct GpsdFeed {
    reports: ReportStream,
    closed_logged: bool,
}

impl GpsdFeed {
    pub fn new(reports: ReportStream) -> Self {
        Self {
            reports,
            closed_logged: false,
        }
    }
}

impl SensorFeed for GpsdFeed {
    fn poll(&mut self) -> Option<RawFix> {
        match self.reports.try_next() {
            Some(tpv) => Some(RawFix::from(&tpv)),
            None => {
                if self.reports.is_closed() && !self.closed_logged {
                    log::warn!("GPS Data Unavailable: gpsd stream closed, keeping last position");
                    self.closed_logged = true;
                }
                None
            }
        }
    }
}
