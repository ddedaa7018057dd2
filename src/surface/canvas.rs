//! Software canvas: paths are built and filled by tiny-skia into a pixmap.

use glam::DVec2;
use image::RgbaImage;
use std::path::Path;
use tiny_skia::{BlendMode, FillRule, Paint, PathBuilder, Pixmap, Rect, Transform};

use super::{Color, Surface};
use crate::error::{Result, SceneError};

/// Raster surface backed by a `tiny_skia::Pixmap`
///
/// Cleared pixels take the backdrop color, which stands in for whatever sits
/// behind a transparent canvas.
pub struct CanvasSurface {
    pixmap: Pixmap,
    backdrop: Color,
    fill_paint: Paint<'static>,
    path: PathBuilder,
    /// True once the current path has a current point
    has_point: bool,
}

fn skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.alpha_u8())
}

fn point(p: DVec2) -> (f32, f32) {
    (p.x as f32, p.y as f32)
}

impl CanvasSurface {
    pub fn new(width: u32, height: u32, backdrop: Color) -> Result<Self> {
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            SceneError::InvalidConfiguration(format!(
                "cannot allocate a {}x{} canvas",
                width, height
            ))
        })?;
        pixmap.fill(skia_color(backdrop));

        let mut fill_paint = Paint::default();
        fill_paint.anti_alias = true;
        fill_paint.set_color(skia_color(Color::BLACK));

        Ok(Self {
            pixmap,
            backdrop,
            fill_paint,
            path: PathBuilder::new(),
            has_point: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Current contents as premultiplied RGBA8, row-major
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    /// Straight-alpha RGBA of one pixel
    ///
    /// # Panics
    /// If `(x, y)` lies outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width() && y < self.height(), "pixel out of bounds");
        let c = self.pixmap.pixels()[(y * self.width() + x) as usize].demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    /// Straight-alpha copy of the canvas
    pub fn to_image(&self) -> Result<RgbaImage> {
        let raw = self
            .pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        RgbaImage::from_raw(self.width(), self.height(), raw)
            .ok_or_else(|| SceneError::Graphics("canvas buffer size mismatch".to_string()))
    }

    /// Write the current frame as a PNG
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.to_image()?
            .save(path)
            .map_err(|e| SceneError::Io(std::io::Error::other(e)))
    }
}

impl Surface for CanvasSurface {
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (x0, x1) = (x.min(x + width), x.max(x + width));
        let (y0, y1) = (y.min(y + height), y.max(y + height));
        let Some(rect) = Rect::from_ltrb(x0 as f32, y0 as f32, x1 as f32, y1 as f32) else {
            return; // Empty rectangle
        };

        let mut paint = Paint::default();
        paint.set_color(skia_color(self.backdrop));
        paint.blend_mode = BlendMode::Source;
        paint.anti_alias = false;
        self.pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn begin_path(&mut self) {
        self.path = PathBuilder::new();
        self.has_point = false;
    }

    fn move_to(&mut self, p: DVec2) {
        let (x, y) = point(p);
        self.path.move_to(x, y);
        self.has_point = true;
    }

    fn line_to(&mut self, p: DVec2) {
        if !self.has_point {
            // An empty path treats its first line as a move
            self.move_to(p);
            return;
        }
        let (x, y) = point(p);
        self.path.line_to(x, y);
    }

    fn bezier_curve_to(&mut self, c1: DVec2, c2: DVec2, end: DVec2) {
        if !self.has_point {
            self.move_to(c1);
        }
        let ((x1, y1), (x2, y2), (x, y)) = (point(c1), point(c2), point(end));
        self.path.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close_path(&mut self) {
        self.path.close();
    }

    fn set_fill_style(&mut self, color: Color) {
        self.fill_paint.set_color(skia_color(color));
    }

    fn fill(&mut self) {
        // Filling leaves the path in place, as a canvas context does
        let Some(path) = self.path.clone().finish() else {
            return; // Nothing with area
        };
        self.pixmap.fill_path(
            &path,
            &self.fill_paint,
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}
