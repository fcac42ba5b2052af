//! Runtime configuration, loaded from a JSON file.
//!
//! Every field has a default; a missing file section or field falls back to
//! the reference installation values.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::display::SpotAnchor;
use crate::glare::{EngineConfig, FieldOfView, SurfaceOrientation};
use crate::solar::AtmosphericParams;

/// Tick scheduling
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Time between engine ticks (milliseconds)
    pub tick_period_ms: u64,
    /// Ticks between solar position recomputes
    pub recompute_interval_ticks: u32,
    /// Compute the sun position on the first tick that has a fix
    pub recompute_on_first_fix: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: 500,
            recompute_interval_ticks: 60,
            recompute_on_first_fix: true,
        }
    }
}

/// Shading surface
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Surface width in pixels; also the test mode reference width
    pub width: u32,
    /// Surface height in pixels; also the test mode reference height
    pub height: u32,
    /// Diameter of the shading spot in pixels
    pub spot_diameter: u32,
    pub orientation: SurfaceOrientation,
    /// Which point of the spot sits on the mapped coordinates
    pub anchor: SpotAnchor,
    pub fullscreen: bool,
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1072,
            height: 704,
            spot_diameter: 100,
            orientation: SurfaceOrientation::Direct,
            anchor: SpotAnchor::TopLeft,
            fullscreen: true,
            title: "AutoShade".to_string(),
        }
    }
}

/// gpsd daemon address
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsdConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GpsdConfig {
    fn default() -> Self {
        Self {
            host: autoshade_gpsd::DEFAULT_HOST.to_string(),
            port: autoshade_gpsd::DEFAULT_PORT,
        }
    }
}

/// Top-level configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoshadeConfig {
    pub fov: FieldOfView,
    pub atmosphere: AtmosphericParams,
    pub schedule: ScheduleConfig,
    pub display: DisplayConfig,
    pub gpsd: GpsdConfig,
}

impl AutoshadeConfig {
    /// Read and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the engine cannot run with.
    ///
    /// A degenerate field of view is accepted; the engine warns about it.
    pub fn validate(&self) -> Result<()> {
        self.fov.validate()?;
        self.atmosphere.validate()?;

        if self.schedule.tick_period_ms == 0 {
            return Err(Error::Config("schedule.tick_period_ms must be positive".into()));
        }
        if self.schedule.recompute_interval_ticks == 0 {
            return Err(Error::Config("schedule.recompute_interval_ticks must be positive".into()));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(Error::Config(format!(
                "display size {}x{} must be non-zero",
                self.display.width, self.display.height
            )));
        }
        Ok(())
    }

    /// Settings for [`GlareEngine`](crate::glare::GlareEngine)
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            fov: self.fov,
            orientation: self.display.orientation,
            atmosphere: self.atmosphere,
            recompute_interval_ticks: self.schedule.recompute_interval_ticks,
            recompute_on_first_fix: self.schedule.recompute_on_first_fix,
        }
    }

    #[inline]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.schedule.tick_period_ms)
    }

    /// Configured surface size as (width, height)
    #[inline]
    pub fn surface(&self) -> (u32, u32) {
        (self.display.width, self.display.height)
    }
}
