//! Rosette layout configuration.

use glam::DVec2;
use std::f64::consts::TAU;

use crate::error::{Result, SceneError};
use crate::surface::Color;

/// Largest canvas edge (pixels); matches the default GPU 2D texture limit
pub const MAX_CANVAS_SIZE: u32 = 8192;

/// Canvas and rosette layout parameters
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Canvas width (pixels)
    pub canvas_width: u32,

    /// Canvas height (pixels)
    pub canvas_height: u32,

    /// Petals per rosette (each petal contributes 3 vertices)
    pub petal_count: usize,

    /// Rosette radius as a fraction of half the canvas width
    pub radius_fraction: f64,

    /// Number of stacked rosettes, phase-shifted evenly around the circle
    pub layer_count: usize,

    /// Fill color shared by every layer (translucent so overlaps show)
    pub fill: Color,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            canvas_width: 900,
            canvas_height: 900,
            petal_count: 64,
            radius_fraction: 0.5625,
            layer_count: 3,
            fill: Color::rgba(241, 240, 237, 0.1),
        }
    }
}

impl SceneConfig {
    /// Center of the canvas, where every rosette is anchored
    pub fn pole(&self) -> DVec2 {
        DVec2::new(
            self.canvas_width as f64 / 2.0,
            self.canvas_height as f64 / 2.0,
        )
    }

    /// Rosette radius (pixels)
    pub fn radius(&self) -> f64 {
        self.canvas_width as f64 / 2.0 * self.radius_fraction
    }

    /// Phase offset of layer `index` (radians)
    pub fn phase_offset(&self, index: usize) -> f64 {
        TAU * index as f64 / self.layer_count as f64
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(SceneError::InvalidConfiguration(format!(
                "canvas must be non-empty, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        if self.canvas_width > MAX_CANVAS_SIZE || self.canvas_height > MAX_CANVAS_SIZE {
            return Err(SceneError::InvalidConfiguration(format!(
                "canvas {}x{} exceeds the {}px limit",
                self.canvas_width, self.canvas_height, MAX_CANVAS_SIZE
            )));
        }
        if self.petal_count == 0 {
            return Err(SceneError::InvalidConfiguration(
                "petal count must be >= 1".to_string(),
            ));
        }
        if !(self.radius_fraction.is_finite() && self.radius_fraction > 0.0) {
            return Err(SceneError::InvalidConfiguration(format!(
                "radius fraction must be > 0, got {}",
                self.radius_fraction
            )));
        }
        if self.layer_count == 0 {
            return Err(SceneError::InvalidConfiguration(
                "layer count must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}
