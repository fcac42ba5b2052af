//! Main shading loop: sensor feed in, engine tick, spot out.

use crate::config::AutoshadeConfig;
use crate::display::{DisplaySurface, SpotAnchor, SpotFrame};
use crate::glare::{GlareEngine, GlareState};
use crate::sensor::SensorFeed;
use crate::solar::{Clock, SolarPositionProvider};

/// One engine fed by one sensor feed, rendering to whatever surface it is
/// stepped against. Single-threaded; the host calls [`step`](Self::step)
/// once per tick period.
pub struct ShadeLoop<F: SensorFeed> {
    engine: GlareEngine,
    feed: F,
    spot_diameter: u32,
    anchor: SpotAnchor,
    /// Max fixes taken from the feed per step
    fix_budget: usize,
    render_failures: u64,
}

impl<F: SensorFeed> ShadeLoop<F> {
    pub fn new(engine: GlareEngine, feed: F, spot_diameter: u32, anchor: SpotAnchor) -> Self {
        Self {
            engine,
            feed,
            spot_diameter,
            anchor,
            fix_budget: usize::MAX,
            render_failures: 0,
        }
    }

    /// Build the engine and loop from a config
    pub fn from_config(
        config: &AutoshadeConfig,
        feed: F,
        provider: Box<dyn SolarPositionProvider + Send>,
        clock: Box<dyn Clock + Send>,
    ) -> Self {
        let engine = GlareEngine::new(config.engine_config(), provider, clock);
        Self::new(engine, feed, config.display.spot_diameter, config.display.anchor)
    }

    /// Limit how many fixes one step takes from the feed. The default drains
    /// everything pending; a budget of 1 paces a replay at one fix per tick.
    pub fn with_fix_budget(mut self, budget: usize) -> Self {
        self.fix_budget = budget.max(1);
        self
    }

    /// Ingest pending fixes, advance the engine one tick, and render.
    ///
    /// Render failures are logged and counted; they never stop the loop.
    pub fn step(&mut self, surface: &mut dyn DisplaySurface) -> GlareState {
        let mut taken = 0;
        while taken < self.fix_budget {
            let Some(fix) = self.feed.poll() else {
                break;
            };
            taken += 1;
            self.engine.ingest(&fix);
        }

        let glare = self.engine.tick(surface.dimensions());
        let frame = SpotFrame::from_glare(&glare, self.spot_diameter, self.anchor);
        if let Err(e) = surface.render(&frame) {
            self.render_failures += 1;
            log::warn!("Failed to render spot: {}", e);
        }
        glare
    }

    pub fn engine(&self) -> &GlareEngine {
        &self.engine
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn feed_mut(&mut self) -> &mut F {
        &mut self.feed
    }

    pub fn render_failures(&self) -> u64 {
        self.render_failures
    }
}

/// Test mode: evaluate one sun/heading triple against the configured surface
/// without any sensor or clock.
pub fn evaluate_once(config: &AutoshadeConfig, azimuth: f64, zenith: f64, heading: f64) -> GlareState {
    GlareState::evaluate(
        &config.fov,
        config.display.orientation,
        azimuth,
        zenith,
        heading,
        config.surface(),
    )
}
