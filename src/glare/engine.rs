//! The glare engine: latest fix, cached sun position, per-tick decision.

use serde::Serialize;

use crate::sensor::{PositionSample, RawFix};
use crate::solar::{AtmosphericParams, Clock, Location, SolarPosition, SolarPositionProvider};
use super::fov::FieldOfView;
use super::mapping::SurfaceOrientation;
use super::state::{GlareState, TrackingState};

/// Engine settings. Not mutated at runtime.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub fov: FieldOfView,
    pub orientation: SurfaceOrientation,
    pub atmosphere: AtmosphericParams,
    /// Ticks between solar position recomputes
    pub recompute_interval_ticks: u32,
    /// Start with the interval already elapsed so the first tick that has a
    /// fix computes the sun position immediately.
    ///
    /// When set, N ticks with a fix make `1 + (N - 1) / interval` provider
    /// calls instead of `N / interval`. Clear it to count strictly from zero.
    pub recompute_on_first_fix: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fov: FieldOfView::default(),
            orientation: SurfaceOrientation::Direct,
            atmosphere: AtmosphericParams::default(),
            recompute_interval_ticks: 60,
            recompute_on_first_fix: true,
        }
    }
}

/// Counters for diagnostics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub ticks: u64,
    pub recompute_attempts: u64,
    pub recompute_failures: u64,
    pub accepted_fixes: u64,
    pub rejected_fixes: u64,
}

/// Owns all glare state. Driven by [`ingest`](Self::ingest) and
/// [`tick`](Self::tick), which are the only writers.
///
/// The engine is `Send`; a multi-threaded host must put it behind a single
/// `Mutex` so both entry points are serialized.
pub struct GlareEngine {
    config: EngineConfig,
    provider: Box<dyn SolarPositionProvider + Send>,
    clock: Box<dyn Clock + Send>,
    sample: Option<PositionSample>,
    solar: Option<SolarPosition>,
    ticks_since_recompute: u32,
    glare: GlareState,
    tracking: TrackingState,
    stats: EngineStats,
}

impl GlareEngine {
    pub fn new(
        config: EngineConfig,
        provider: Box<dyn SolarPositionProvider + Send>,
        clock: Box<dyn Clock + Send>,
    ) -> Self {
        if let Some(degeneracy) = config.fov.degeneracy() {
            log::warn!(
                "Degenerate field of view ({}): the shading spot will never be shown",
                degeneracy
            );
        }

        let interval = config.recompute_interval_ticks.max(1);
        let ticks_since_recompute = if config.recompute_on_first_fix { interval } else { 0 };

        Self {
            config: EngineConfig {
                recompute_interval_ticks: interval,
                ..config
            },
            provider,
            clock,
            sample: None,
            solar: None,
            ticks_since_recompute,
            glare: GlareState::HIDDEN,
            tracking: TrackingState::NoFix,
            stats: EngineStats::default(),
        }
    }

    /// Offer a raw fix. Accepted and stored iff it validates; otherwise the
    /// previous sample is kept and `false` is returned.
    pub fn ingest(&mut self, fix: &RawFix) -> bool {
        match PositionSample::from_fix(fix) {
            Ok(sample) => {
                if self.sample.is_none() {
                    log::info!(
                        "First position fix: lat {:.5} lon {:.5} alt {:.1} m heading {:.1}",
                        sample.latitude(),
                        sample.longitude(),
                        sample.altitude(),
                        sample.heading()
                    );
                }
                self.sample = Some(sample);
                self.stats.accepted_fixes += 1;
                true
            }
            Err(reason) => {
                log::debug!("GPS Data Unavailable: {}", reason);
                self.stats.rejected_fixes += 1;
                false
            }
        }
    }

    /// Advance one tick against a surface of `surface` (width, height) pixels.
    ///
    /// Recomputes the sun position when the interval has elapsed and a fix
    /// exists, then always re-evaluates glare with whatever position is cached.
    pub fn tick(&mut self, surface: (u32, u32)) -> GlareState {
        self.stats.ticks += 1;
        self.ticks_since_recompute = self.ticks_since_recompute.saturating_add(1);

        if let Some(sample) = self.sample {
            if self.ticks_since_recompute >= self.config.recompute_interval_ticks {
                self.recompute(&sample);
                self.ticks_since_recompute = 0;
            }
        }

        self.glare = match (&self.sample, &self.solar) {
            (Some(sample), Some(solar)) => {
                log::debug!(
                    "Heading: {:.2}  Zenith: {:.6}  Azimuth: {:.6}",
                    sample.heading(),
                    solar.zenith,
                    solar.azimuth
                );
                GlareState::evaluate(
                    &self.config.fov,
                    self.config.orientation,
                    solar.azimuth,
                    solar.zenith,
                    sample.heading(),
                    surface,
                )
            }
            _ => GlareState::HIDDEN,
        };

        self.update_tracking();
        self.glare
    }

    fn recompute(&mut self, sample: &PositionSample) {
        self.stats.recompute_attempts += 1;
        let location = Location::from(sample);
        let now = self.clock.now();

        match self.provider.compute(&location, now, &self.config.atmosphere) {
            Ok(position) => {
                log::info!(
                    "NEW Zenith: {:.6} degrees   Azimuth: {:.6} degrees   Incidence: {:.6} degrees",
                    position.zenith,
                    position.azimuth,
                    position.incidence
                );
                self.solar = Some(position);
            }
            Err(e) => {
                self.stats.recompute_failures += 1;
                log::warn!("{}; keeping previous solar position", e);
            }
        }
    }

    fn update_tracking(&mut self) {
        let next = match (self.sample.is_some(), self.glare.visible) {
            (false, _) => TrackingState::NoFix,
            (true, false) => TrackingState::TrackingNoGlare,
            (true, true) => TrackingState::TrackingGlare,
        };
        if next != self.tracking {
            log::info!("Glare tracking: {:?} -> {:?}", self.tracking, next);
            self.tracking = next;
        }
    }

    /// Latest accepted position
    #[inline]
    pub fn sample(&self) -> Option<&PositionSample> {
        self.sample.as_ref()
    }

    /// Most recent successfully computed sun position
    #[inline]
    pub fn solar_position(&self) -> Option<&SolarPosition> {
        self.solar.as_ref()
    }

    /// Output of the last tick
    #[inline]
    pub fn glare(&self) -> GlareState {
        self.glare
    }

    #[inline]
    pub fn tracking(&self) -> TrackingState {
        self.tracking
    }

    #[inline]
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Ticks counted towards the next recompute
    #[inline]
    pub fn ticks_since_recompute(&self) -> u32 {
        self.ticks_since_recompute
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::{NaiveDate, NaiveDateTime};

    use crate::core::{Error, Result};
    use crate::solar::ManualClock;

    const SURFACE: (u32, u32) = (1072, 704);

    /// Provider returning a settable sun position and counting calls
    #[derive(Clone, Default)]
    struct FakeSun {
        calls: Arc<AtomicUsize>,
        fail: Arc<AtomicBool>,
        sun: Arc<Mutex<(f64, f64)>>,
    }

    impl FakeSun {
        fn at(azimuth: f64, zenith: f64) -> Self {
            let fake = Self::default();
            fake.set(azimuth, zenith);
            fake
        }

        fn set(&self, azimuth: f64, zenith: f64) {
            *self.sun.lock().unwrap() = (azimuth, zenith);
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl SolarPositionProvider for FakeSun {
        fn compute(
            &self,
            location: &Location,
            civil_time: NaiveDateTime,
            _params: &AtmosphericParams,
        ) -> Result<SolarPosition> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Computation("provider offline".into()));
            }
            let (azimuth, zenith) = *self.sun.lock().unwrap();
            Ok(SolarPosition {
                zenith,
                azimuth,
                incidence: 0.0,
                computed_at: civil_time,
                location: *location,
            })
        }
    }

    fn start_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2017, 5, 1).unwrap().and_hms_opt(18, 30, 0).unwrap()
    }

    fn engine_with(config: EngineConfig, sun: &FakeSun) -> GlareEngine {
        GlareEngine::new(config, Box::new(sun.clone()), Box::new(ManualClock::new(start_time())))
    }

    fn engine(sun: &FakeSun) -> GlareEngine {
        engine_with(EngineConfig::default(), sun)
    }

    fn fix(heading: f64) -> RawFix {
        RawFix::three_d(39.96, -82.99, 240.0, heading)
    }

    #[test]
    fn test_no_fix_never_computes() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut e = engine(&sun);
        for _ in 0..200 {
            assert_eq!(e.tick(SURFACE), GlareState::HIDDEN);
        }
        assert_eq!(sun.calls(), 0);
        assert_eq!(e.tracking(), TrackingState::NoFix);
        assert!(e.solar_position().is_none());
    }

    #[test]
    fn test_first_fix_computes_immediately() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut e = engine(&sun);
        assert!(e.ingest(&fix(50.0)));

        let g = e.tick(SURFACE);
        assert_eq!(sun.calls(), 1);
        assert_eq!(g, GlareState { visible: true, spot_x: 238, spot_y: 352 });
        assert_eq!(e.tracking(), TrackingState::TrackingGlare);

        let solar = e.solar_position().unwrap();
        assert_eq!(solar.computed_at, start_time());
        assert_eq!(solar.location.latitude, 39.96);
    }

    #[test]
    fn test_cadence_from_zero() {
        let sun = FakeSun::at(40.0, 80.0);
        let config = EngineConfig {
            recompute_on_first_fix: false,
            ..Default::default()
        };
        let mut e = engine_with(config, &sun);
        e.ingest(&fix(50.0));

        for n in 1..=250usize {
            e.tick(SURFACE);
            assert_eq!(sun.calls(), n / 60, "after {n} ticks");
        }
    }

    #[test]
    fn test_cadence_after_priming() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut e = engine(&sun);
        e.ingest(&fix(50.0));

        e.tick(SURFACE);
        assert_eq!(sun.calls(), 1);
        for _ in 0..59 {
            e.tick(SURFACE);
        }
        assert_eq!(sun.calls(), 1);
        e.tick(SURFACE);
        assert_eq!(sun.calls(), 2);
        assert_eq!(e.ticks_since_recompute(), 0);
    }

    #[test]
    fn test_primed_cadence_counts() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut e = engine(&sun);
        e.ingest(&fix(50.0));

        for n in 1..=250usize {
            e.tick(SURFACE);
            assert_eq!(sun.calls(), 1 + (n - 1) / 60, "after {n} ticks");
        }
    }

    #[test]
    fn test_counter_runs_before_first_fix() {
        let sun = FakeSun::at(40.0, 80.0);
        let config = EngineConfig {
            recompute_on_first_fix: false,
            ..Default::default()
        };
        let mut e = engine_with(config, &sun);
        for _ in 0..100 {
            e.tick(SURFACE);
        }
        assert_eq!(sun.calls(), 0);

        // Interval long elapsed: the first tick with a fix computes
        e.ingest(&fix(50.0));
        e.tick(SURFACE);
        assert_eq!(sun.calls(), 1);
    }

    #[test]
    fn test_failure_keeps_previous_position() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut e = engine(&sun);
        e.ingest(&fix(50.0));
        e.tick(SURFACE);
        let before = *e.solar_position().unwrap();

        sun.fail.store(true, Ordering::SeqCst);
        sun.set(200.0, 30.0);
        for _ in 0..60 {
            e.tick(SURFACE);
        }
        assert_eq!(sun.calls(), 2);
        assert_eq!(e.stats().recompute_failures, 1);
        assert_eq!(*e.solar_position().unwrap(), before);
        // Glare still evaluated from the cached position
        assert!(e.glare().visible);

        // Counter was reset: no retry on the next tick
        e.tick(SURFACE);
        assert_eq!(sun.calls(), 2);
    }

    #[test]
    fn test_failure_before_any_position() {
        let sun = FakeSun::at(40.0, 80.0);
        sun.fail.store(true, Ordering::SeqCst);
        let mut e = engine(&sun);
        e.ingest(&fix(50.0));

        assert_eq!(e.tick(SURFACE), GlareState::HIDDEN);
        assert_eq!(e.tracking(), TrackingState::TrackingNoGlare);
        assert!(e.solar_position().is_none());
    }

    #[test]
    fn test_recompute_picks_up_new_sun() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut e = engine(&sun);
        e.ingest(&fix(50.0));
        e.tick(SURFACE);

        sun.set(300.0, 80.0);
        for _ in 0..59 {
            assert!(e.tick(SURFACE).visible);
        }
        assert!(!e.tick(SURFACE).visible);
        assert_eq!(e.solar_position().unwrap().azimuth, 300.0);
    }

    #[test]
    fn test_heading_change_flips_between_recomputes() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut e = engine(&sun);
        e.ingest(&fix(50.0));
        assert!(e.tick(SURFACE).visible);

        e.ingest(&fix(200.0));
        let g = e.tick(SURFACE);
        assert!(!g.visible);
        assert_eq!(e.tracking(), TrackingState::TrackingNoGlare);
        assert_eq!(g, GlareState::HIDDEN);

        e.ingest(&fix(50.0));
        assert!(e.tick(SURFACE).visible);
        assert_eq!(e.tracking(), TrackingState::TrackingGlare);
        assert_eq!(sun.calls(), 1);
    }

    #[test]
    fn test_output_independent_of_history() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut seen_glare = engine(&sun);
        seen_glare.ingest(&fix(50.0));
        seen_glare.tick(SURFACE);
        seen_glare.ingest(&fix(200.0));

        let mut fresh = engine(&sun);
        fresh.ingest(&fix(200.0));

        assert_eq!(seen_glare.tick(SURFACE), fresh.tick(SURFACE));
        assert_eq!(fresh.glare(), GlareState::HIDDEN);
    }

    #[test]
    fn test_ingest_idempotent() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut e = engine(&sun);
        e.ingest(&fix(50.0));
        e.tick(SURFACE);

        let (sample, solar, glare) = (*e.sample().unwrap(), *e.solar_position().unwrap(), e.glare());
        assert!(e.ingest(&fix(50.0)));
        assert_eq!(*e.sample().unwrap(), sample);
        assert_eq!(*e.solar_position().unwrap(), solar);
        assert_eq!(e.glare(), glare);
    }

    #[test]
    fn test_invalid_fix_leaves_state() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut e = engine(&sun);
        assert!(!e.ingest(&fix(f64::NAN)));
        assert!(e.sample().is_none());

        e.ingest(&fix(50.0));
        let sample = *e.sample().unwrap();
        for bad in [
            RawFix::three_d(f64::NAN, -82.99, 240.0, 10.0),
            RawFix::three_d(39.96, f64::INFINITY, 240.0, 10.0),
            RawFix::three_d(39.96, -82.99, f64::NEG_INFINITY, 10.0),
            RawFix { heading: None, ..fix(10.0) },
            RawFix::default(),
        ] {
            assert!(!e.ingest(&bad));
            assert_eq!(*e.sample().unwrap(), sample);
        }
        assert_eq!(e.stats().rejected_fixes, 6);
        assert_eq!(e.stats().accepted_fixes, 1);
    }

    #[test]
    fn test_degenerate_config_never_visible() {
        let sun = FakeSun::at(50.0, 80.0);
        for fov in [
            FieldOfView { phi_left: 0.0, phi_right: 0.0, ..Default::default() },
            FieldOfView { gamma_min: 90.0, ..Default::default() },
        ] {
            let mut e = engine_with(EngineConfig { fov, ..Default::default() }, &sun);
            e.ingest(&fix(50.0));
            for _ in 0..5 {
                assert!(!e.tick(SURFACE).visible);
            }
            assert_eq!(e.tracking(), TrackingState::TrackingNoGlare);
        }
    }

    #[test]
    fn test_surface_size_used_each_tick() {
        let sun = FakeSun::at(40.0, 80.0);
        let mut e = engine(&sun);
        e.ingest(&fix(50.0));
        assert_eq!(e.tick((1072, 704)).spot_y, 352);
        assert_eq!(e.tick((1072, 1000)).spot_y, 500);
    }

    #[test]
    fn test_mirrored_orientation() {
        let sun = FakeSun::at(70.0, 80.0);
        let config = EngineConfig {
            orientation: SurfaceOrientation::Mirrored,
            ..Default::default()
        };
        let mut e = engine_with(config, &sun);
        e.ingest(&fix(100.0));
        assert_eq!(e.tick(SURFACE).spot_x, 1072);
    }

    #[test]
    fn test_zero_interval_clamped() {
        let sun = FakeSun::at(40.0, 80.0);
        let config = EngineConfig {
            recompute_interval_ticks: 0,
            ..Default::default()
        };
        let mut e = engine_with(config, &sun);
        assert_eq!(e.config().recompute_interval_ticks, 1);
        e.ingest(&fix(50.0));
        e.tick(SURFACE);
        e.tick(SURFACE);
        assert_eq!(sun.calls(), 2);
    }

    #[test]
    fn test_engine_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<GlareEngine>();
    }
}
