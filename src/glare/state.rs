//! Per-tick glare output and the engine's tracking state.

use serde::Serialize;

use super::fov::FieldOfView;
use super::mapping::{spot_position, SurfaceOrientation};

/// Whether to draw the spot, and where. Recomputed every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct GlareState {
    pub visible: bool,
    pub spot_x: i32,
    pub spot_y: i32,
}

impl GlareState {
    /// No spot
    pub const HIDDEN: GlareState = GlareState {
        visible: false,
        spot_x: 0,
        spot_y: 0,
    };

    /// Decide visibility and spot coordinates for one sun/heading pair.
    ///
    /// Depends only on its arguments; a spot that is not visible is always
    /// [`GlareState::HIDDEN`].
    pub fn evaluate(
        fov: &FieldOfView,
        orientation: SurfaceOrientation,
        azimuth: f64,
        zenith: f64,
        heading: f64,
        surface: (u32, u32),
    ) -> GlareState {
        if !fov.sees(azimuth, zenith, heading) {
            return GlareState::HIDDEN;
        }

        match spot_position(fov, orientation, azimuth, zenith, heading, surface) {
            Some((spot_x, spot_y)) => GlareState {
                visible: true,
                spot_x,
                spot_y,
            },
            None => GlareState::HIDDEN,
        }
    }
}

/// Engine lifecycle. There is no terminal state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum TrackingState {
    /// No valid position sample yet
    #[default]
    NoFix,
    /// Valid sample, sun outside the field of view
    TrackingNoGlare,
    /// Valid sample, sun inside the field of view
    TrackingGlare,
}
