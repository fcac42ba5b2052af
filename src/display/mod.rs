//! Shading surface output.
//!
//! The glare engine only produces coordinates; a [`DisplaySurface`] turns a
//! [`SpotFrame`] into pixels. [`ShadeWindow`] draws with wgpu into a winit
//! window, [`HeadlessSurface`] records frames for tests and benches.

pub mod gpu;
pub mod headless;
pub mod spot_pipeline;
pub mod window;

pub use gpu::GpuContext;
pub use headless::HeadlessSurface;
pub use spot_pipeline::{SpotPipeline, SpotUniform};
pub use window::{run, ShadeWindow, WindowConfig};

use serde::{Deserialize, Serialize};

use crate::core::{Result, Vec2};
use crate::glare::GlareState;

/// Which point of the spot the mapped coordinates refer to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotAnchor {
    /// Top-left corner of the spot's bounding box
    #[default]
    TopLeft,
    Center,
}

/// One frame of shading output
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpotFrame {
    pub visible: bool,
    pub x: i32,
    pub y: i32,
    /// Spot diameter in pixels
    pub diameter: u32,
    pub anchor: SpotAnchor,
}

impl SpotFrame {
    pub fn from_glare(glare: &GlareState, diameter: u32, anchor: SpotAnchor) -> Self {
        Self {
            visible: glare.visible,
            x: glare.spot_x,
            y: glare.spot_y,
            diameter,
            anchor,
        }
    }

    /// Spot center in surface pixels
    pub fn center(&self) -> Vec2 {
        let origin = Vec2::new(self.x as f32, self.y as f32);
        match self.anchor {
            SpotAnchor::TopLeft => origin + Vec2::splat(self.diameter as f32 * 0.5),
            SpotAnchor::Center => origin,
        }
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.diameter as f32 * 0.5
    }
}

/// Something the shading spot can be drawn on
pub trait DisplaySurface {
    /// Current drawable size as (width, height) in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Show `frame`: a blank surface, plus the spot when visible
    fn render(&mut self, frame: &SpotFrame) -> Result<()>;
}
