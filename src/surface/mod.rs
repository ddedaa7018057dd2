//! 2D path-drawing surface the rosettes render onto.
//!
//! Mirrors the subset of an HTML canvas context the animation needs:
//! rectangle clears plus move/line/cubic path building and a nonzero fill.

mod canvas;
mod color;

pub use canvas::CanvasSurface;
pub use color::Color;

use glam::DVec2;

/// Path-drawing surface (one per scene, passed explicitly to every render call)
pub trait Surface {
    /// Reset a rectangle to the surface's cleared state
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    /// Discard the current path
    fn begin_path(&mut self);

    fn move_to(&mut self, p: DVec2);

    fn line_to(&mut self, p: DVec2);

    /// Cubic Bezier from the current point through two control points to `end`
    fn bezier_curve_to(&mut self, c1: DVec2, c2: DVec2, end: DVec2);

    fn close_path(&mut self);

    fn set_fill_style(&mut self, color: Color);

    /// Fill the current path with the current fill style (nonzero winding)
    fn fill(&mut self);
}
