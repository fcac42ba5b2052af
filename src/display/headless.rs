//! Off-screen surface that records what would have been drawn

use crate::core::Result;
use super::{DisplaySurface, SpotFrame};

#[derive(Clone, Debug)]
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    frames: Vec<SpotFrame>,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            frames: Vec::new(),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Every frame rendered so far, oldest first
    pub fn frames(&self) -> &[SpotFrame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&SpotFrame> {
        self.frames.last()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }
}

impl DisplaySurface for HeadlessSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn render(&mut self, frame: &SpotFrame) -> Result<()> {
        self.frames.push(*frame);
        Ok(())
    }
}
