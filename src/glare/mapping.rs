//! Angular-to-pixel mapping of the shading spot.
//!
//! Two independent linear interpolations, one per axis. This is a cheap
//! stand-in for projecting onto the windshield, not a perspective model.

use serde::{Deserialize, Serialize};

use super::fov::FieldOfView;

/// Sign convention of the x axis on the physical display
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceOrientation {
    /// Left edge of the FOV at pixel 0, right edge at full width
    #[default]
    Direct,
    /// Left edge of the FOV at full width, right edge at pixel 0
    Mirrored,
}

/// y on the line through `(x1, y1)` and `(x2, y2)`, evaluated at `x` and
/// truncated toward zero. `None` when `x1 == x2` or the result is not finite.
pub fn linear_map(x1: f64, y1: f64, x2: f64, y2: f64, x: f64) -> Option<i32> {
    let run = x2 - x1;
    if run == 0.0 {
        return None;
    }
    // Multiply before dividing so the endpoints land exactly on y1 / y2
    let y = y1 + (x - x1) * (y2 - y1) / run;
    y.is_finite().then(|| y as i32)
}

/// Pixel position of the spot for a sun at (`azimuth`, `zenith`) seen from `heading`.
///
/// Returns `None` for a degenerate field of view.
pub fn spot_position(
    fov: &FieldOfView,
    orientation: SurfaceOrientation,
    azimuth: f64,
    zenith: f64,
    heading: f64,
    (width, height): (u32, u32),
) -> Option<(i32, i32)> {
    if fov.is_degenerate() {
        return None;
    }

    let window = fov.azimuth_window(azimuth, heading);
    let (x_left, x_right) = match orientation {
        SurfaceOrientation::Direct => (0.0, width as f64),
        SurfaceOrientation::Mirrored => (width as f64, 0.0),
    };

    let x = linear_map(window.left, x_left, window.right, x_right, window.azimuth)?;
    let y = linear_map(fov.gamma_min, 0.0, fov.zenith_horizon, height as f64, zenith)?;
    Some((x, y))
}
