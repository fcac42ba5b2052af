//! gpsd protocol - JSON report definitions

use serde::{Deserialize, Serialize};

/// Reports sent by gpsd, one JSON object per line, tagged by `class`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "class")]
pub enum GpsdMessage {
    /// Sent once on connect
    #[serde(rename = "VERSION")]
    Version {
        release: String,
        #[serde(default)]
        proto_major: u32,
        #[serde(default)]
        proto_minor: u32,
    },
    /// Devices currently seen by the daemon
    #[serde(rename = "DEVICES")]
    Devices {
        #[serde(default)]
        devices: Vec<Device>,
    },
    /// Acknowledges a `?WATCH` command
    #[serde(rename = "WATCH")]
    Watch {
        #[serde(default)]
        enable: bool,
        #[serde(default)]
        json: bool,
    },
    /// Time-position-velocity report
    #[serde(rename = "TPV")]
    Tpv(Tpv),
    /// SKY, GST, PPS, ... (not used)
    #[serde(other)]
    Other,
}

/// A receiver attached to gpsd
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
}

/// NMEA mode of a TPV report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixMode {
    Unknown,
    NoFix,
    Fix2d,
    Fix3d,
}

impl From<u8> for FixMode {
    fn from(mode: u8) -> Self {
        match mode {
            1 => FixMode::NoFix,
            2 => FixMode::Fix2d,
            3 => FixMode::Fix3d,
            _ => FixMode::Unknown,
        }
    }
}

/// Time-position-velocity report. Fields gpsd has no value for are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tpv {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    /// 0 = unknown, 1 = no fix, 2 = 2D, 3 = 3D
    #[serde(default)]
    pub mode: u8,
    /// 0 = no fix, 1 = normal, 2 = DGPS, ... Absent on older daemons.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
    /// Deprecated since gpsd 3.20, still sent by older daemons
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<f64>,
    #[serde(rename = "altMSL", default, skip_serializing_if = "Option::is_none")]
    pub alt_msl: Option<f64>,
    #[serde(rename = "altHAE", default, skip_serializing_if = "Option::is_none")]
    pub alt_hae: Option<f64>,
    /// Course over ground, degrees from true north
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl Tpv {
    pub fn fix_mode(&self) -> FixMode {
        FixMode::from(self.mode)
    }

    /// Whether the receiver reports a usable fix status
    pub fn has_fix_status(&self) -> bool {
        !matches!(self.status, Some(0))
    }

    /// Altitude above mean sea level, falling back to the legacy and
    /// ellipsoid fields
    pub fn altitude(&self) -> Option<f64> {
        self.alt_msl.or(self.alt).or(self.alt_hae)
    }
}

/// Parse a single line of gpsd output
pub fn parse_line(line: &str) -> Result<GpsdMessage, serde_json::Error> {
    serde_json::from_str(line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_tpv_report() {
        let line = r#"{"class":"TPV","device":"/dev/ttyUSB0","mode":3,"time":"2017-05-01T23:33:00.000Z","lat":39.9612,"lon":-82.9988,"altMSL":240.5,"track":271.3,"speed":12.1}"#;
        let msg = parse_line(line).unwrap();
        let GpsdMessage::Tpv(tpv) = msg else {
            panic!("expected TPV, got {msg:?}");
        };
        assert_eq!(tpv.fix_mode(), FixMode::Fix3d);
        assert_eq!(tpv.lat, Some(39.9612));
        assert_eq!(tpv.altitude(), Some(240.5));
        assert_eq!(tpv.track, Some(271.3));
        assert!(tpv.has_fix_status());
    }

    #[test]
    fn test_legacy_alt_used_when_msl_missing() {
        let line = r#"{"class":"TPV","mode":3,"lat":1.0,"lon":2.0,"alt":10.0,"altHAE":12.0}"#;
        let GpsdMessage::Tpv(tpv) = parse_line(line).unwrap() else {
            panic!("expected TPV");
        };
        assert_eq!(tpv.altitude(), Some(10.0));
    }

    #[test]
    fn test_two_d_fix_without_altitude() {
        let line = r#"{"class":"TPV","mode":2,"lat":1.0,"lon":2.0}"#;
        let GpsdMessage::Tpv(tpv) = parse_line(line).unwrap() else {
            panic!("expected TPV");
        };
        assert_eq!(tpv.fix_mode(), FixMode::Fix2d);
        assert_eq!(tpv.altitude(), None);
        assert_eq!(tpv.track, None);
    }

    #[test]
    fn test_status_zero_is_no_fix() {
        let line = r#"{"class":"TPV","mode":3,"status":0}"#;
        let GpsdMessage::Tpv(tpv) = parse_line(line).unwrap() else {
            panic!("expected TPV");
        };
        assert!(!tpv.has_fix_status());
    }

    #[test]
    fn test_parses_version_and_watch() {
        let v = parse_line(r#"{"class":"VERSION","release":"3.22","rev":"3.22","proto_major":3,"proto_minor":14}"#).unwrap();
        assert!(matches!(v, GpsdMessage::Version { proto_major: 3, .. }));

        let w = parse_line(r#"{"class":"WATCH","enable":true,"json":true,"nmea":false}"#).unwrap();
        assert!(matches!(w, GpsdMessage::Watch { enable: true, json: true }));
    }

    #[test]
    fn test_unknown_class_is_other() {
        let sky = parse_line(r#"{"class":"SKY","satellites":[]}"#).unwrap();
        assert!(matches!(sky, GpsdMessage::Other));
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(parse_line("not json").is_err());
        assert!(parse_line(r#"{"mode":3}"#).is_err());
    }
}
