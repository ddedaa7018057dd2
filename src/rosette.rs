//! Rosette geometry: petals built from cubic Bezier leaves arranged around a pole.

use glam::DVec2;
use std::f64::consts::TAU;

use crate::error::{Result, SceneError};
use crate::params::SceneConfig;
use crate::surface::{Color, Surface};

/// Vertices contributed by each petal (line-to point plus two control points)
pub const VERTICES_PER_PETAL: usize = 3;

/// Multi-petal closed curve with a fixed base shape and a per-frame display shape
#[derive(Debug, Clone)]
pub struct RosetteGeometry {
    pole: DVec2,
    petal_count: usize,
    radius: f64,
    fill: Color,
    phase_offset: f64,
    /// Pole-relative base vertices, `VERTICES_PER_PETAL` per petal
    base: Vec<DVec2>,
    /// Absolute displayed vertices; the last entry repeats vertex 0
    display: Vec<DVec2>,
}

impl RosetteGeometry {
    /// Build the base vertex set
    ///
    /// Each petal is one cubic Bezier whose handle length `h` follows the
    /// circular-arc approximation for the petal angle; the resulting bulge is
    /// what gives the rosette its leaf shape.
    ///
    /// # Arguments
    /// * `pole` - Center the rosette is built and scaled around
    /// * `petal_count` - Number of petals (>= 1)
    /// * `radius` - Distance from the pole to each petal tip (> 0)
    /// * `fill` - Fill color used by `render`
    /// * `phase_offset` - Rotation of the whole rosette (radians)
    pub fn new(
        pole: DVec2,
        petal_count: usize,
        radius: f64,
        fill: Color,
        phase_offset: f64,
    ) -> Result<Self> {
        if petal_count < 1 {
            return Err(SceneError::InvalidConfiguration(
                "rosette needs at least one petal".to_string(),
            ));
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(SceneError::InvalidConfiguration(format!(
                "rosette radius must be > 0, got {}",
                radius
            )));
        }

        let theta = TAU / petal_count as f64;
        let (sin_t, cos_t) = theta.sin_cos();
        let h = radius * (4.0 * (1.0 - (theta / 2.0).cos())) / (3.0 * (theta / 2.0).sin());

        let leaf = [
            DVec2::new(radius, 0.0),
            DVec2::new(radius, h),
            DVec2::new(radius * cos_t + h * sin_t, radius * sin_t - h * cos_t),
        ];

        let mut base = Vec::with_capacity(petal_count * VERTICES_PER_PETAL);
        for i in 0..petal_count {
            let rotation = DVec2::from_angle(i as f64 * theta + phase_offset);
            base.extend(leaf.iter().map(|&p| rotation.rotate(p)));
        }

        let mut display: Vec<DVec2> = base.iter().map(|&v| pole + v).collect();
        display.push(display[0]);

        Ok(Self {
            pole,
            petal_count,
            radius,
            fill,
            phase_offset,
            base,
            display,
        })
    }

    pub fn pole(&self) -> DVec2 {
        self.pole
    }

    pub fn petal_count(&self) -> usize {
        self.petal_count
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn fill(&self) -> Color {
        self.fill
    }

    pub fn phase_offset(&self) -> f64 {
        self.phase_offset
    }

    /// Number of base vertices, i.e. the scale-factor length `update` expects
    pub fn vertex_count(&self) -> usize {
        self.base.len()
    }

    /// Pole-relative base vertices
    pub fn base_vertices(&self) -> &[DVec2] {
        &self.base
    }

    /// Displayed vertices, closed by a copy of vertex 0
    pub fn display_vertices(&self) -> &[DVec2] {
        &self.display
    }

    /// Scale each base vertex about the pole
    ///
    /// # Panics
    /// If `scale` does not hold exactly one factor per base vertex.
    pub fn update(&mut self, scale: &[f64]) {
        assert_eq!(
            scale.len(),
            self.base.len(),
            "one scale factor per rosette vertex"
        );

        for ((shown, &base), &factor) in self.display.iter_mut().zip(&self.base).zip(scale) {
            *shown = self.pole + base * factor;
        }

        let last = self.display.len() - 1;
        self.display[last] = self.display[0];
    }

    /// Emit the closed, filled outline
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let v = &self.display;

        surface.begin_path();
        surface.move_to(v[0]);
        for idx in (0..self.base.len()).step_by(VERTICES_PER_PETAL) {
            surface.line_to(v[idx]);
            // For the last petal this lands on the closing copy of vertex 0
            surface.bezier_curve_to(v[idx + 1], v[idx + 2], v[idx + 3]);
        }
        surface.close_path();
        surface.set_fill_style(self.fill);
        surface.fill();
    }
}

/// Build the layered scene: `layer_count` identical rosettes around the
/// canvas center, each turned by an equal share of the full circle
pub fn layered_rosettes(config: &SceneConfig) -> Result<Vec<RosetteGeometry>> {
    config.validate()?;

    (0..config.layer_count)
        .map(|layer| {
            RosetteGeometry::new(
                config.pole(),
                config.petal_count,
                config.radius(),
                config.fill,
                config.phase_offset(layer),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILL: Color = Color::rgba(241, 240, 237, 0.1);

    fn assert_close(a: DVec2, b: DVec2, tolerance: f64) {
        assert!(
            a.distance(b) <= tolerance,
            "expected {:?} ~= {:?} (tolerance {})",
            a,
            b,
            tolerance
        );
    }

    #[derive(Debug, PartialEq)]
    enum Op {
        Begin,
        Move(DVec2),
        Line(DVec2),
        Curve(DVec2, DVec2, DVec2),
        Close,
        Style(Color),
        Fill,
    }

    #[derive(Default)]
    struct Recorder(Vec<Op>);

    impl Surface for Recorder {
        fn clear_rect(&mut self, _: f64, _: f64, _: f64, _: f64) {}
        fn begin_path(&mut self) {
            self.0.push(Op::Begin);
        }
        fn move_to(&mut self, p: DVec2) {
            self.0.push(Op::Move(p));
        }
        fn line_to(&mut self, p: DVec2) {
            self.0.push(Op::Line(p));
        }
        fn bezier_curve_to(&mut self, c1: DVec2, c2: DVec2, end: DVec2) {
            self.0.push(Op::Curve(c1, c2, end));
        }
        fn close_path(&mut self) {
            self.0.push(Op::Close);
        }
        fn set_fill_style(&mut self, color: Color) {
            self.0.push(Op::Style(color));
        }
        fn fill(&mut self) {
            self.0.push(Op::Fill);
        }
    }

    #[test]
    fn test_base_vertex_count() {
        for petals in [1, 2, 3, 7, 64] {
            let rosette = RosetteGeometry::new(DVec2::ZERO, petals, 50.0, FILL, 0.0).unwrap();
            assert_eq!(rosette.base_vertices().len(), 3 * petals);
            assert_eq!(rosette.display_vertices().len(), 3 * petals + 1);
        }
    }

    #[test]
    fn test_rotation_by_petal_angle_shifts_indices() {
        let radius = 120.0;
        for petals in [2, 3, 5, 8, 64] {
            let rosette =
                RosetteGeometry::new(DVec2::new(10.0, -5.0), petals, radius, FILL, 0.3).unwrap();
            let base = rosette.base_vertices();
            let step = DVec2::from_angle(TAU / petals as f64);

            for (i, &v) in base.iter().enumerate() {
                let expected = base[(i + 3) % base.len()];
                assert_close(step.rotate(v), expected, 1e-9 * radius);
            }
        }
    }

    #[test]
    fn test_quarter_petals_match_circle_handles() {
        // With 4 petals the leaf is the classic quarter-circle cubic
        let radius = 10.0;
        let rosette = RosetteGeometry::new(DVec2::ZERO, 4, radius, FILL, 0.0).unwrap();
        let kappa = 4.0 / 3.0 * (2f64.sqrt() - 1.0);
        let h = radius * kappa;
        let base = rosette.base_vertices();

        assert_close(base[0], DVec2::new(radius, 0.0), 1e-12);
        assert_close(base[1], DVec2::new(radius, h), 1e-12);
        assert_close(base[2], DVec2::new(h, radius), 1e-12);
        assert_close(base[3], DVec2::new(0.0, radius), 1e-12);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            RosetteGeometry::new(DVec2::ZERO, 0, 10.0, FILL, 0.0),
            Err(SceneError::InvalidConfiguration(_))
        ));
        assert!(RosetteGeometry::new(DVec2::ZERO, 3, 0.0, FILL, 0.0).is_err());
        assert!(RosetteGeometry::new(DVec2::ZERO, 3, -1.0, FILL, 0.0).is_err());
        assert!(RosetteGeometry::new(DVec2::ZERO, 3, f64::NAN, FILL, 0.0).is_err());
    }

    #[test]
    fn test_unit_scale_reproduces_translated_base() {
        let pole = DVec2::new(300.0, 200.0);
        let mut rosette = RosetteGeometry::new(pole, 16, 80.0, FILL, 1.0).unwrap();
        let initial = rosette.display_vertices().to_vec();

        rosette.update(&vec![1.0; rosette.vertex_count()]);

        assert_eq!(rosette.display_vertices(), initial.as_slice());
        for (shown, base) in rosette.display_vertices().iter().zip(rosette.base_vertices()) {
            assert_eq!(*shown, pole + *base);
        }
    }

    #[test]
    fn test_update_scales_about_pole_and_refreshes_closing_vertex() {
        let pole = DVec2::new(5.0, 5.0);
        let mut rosette = RosetteGeometry::new(pole, 3, 10.0, FILL, 0.0).unwrap();
        let mut scale = vec![1.0; rosette.vertex_count()];
        scale[0] = 1.1;
        rosette.update(&scale);

        let shown = rosette.display_vertices();
        assert_close(shown[0], pole + rosette.base_vertices()[0] * 1.1, 1e-12);
        assert_eq!(shown[shown.len() - 1], shown[0]);
    }

    #[test]
    #[should_panic]
    fn test_update_rejects_wrong_length() {
        let mut rosette = RosetteGeometry::new(DVec2::ZERO, 3, 10.0, FILL, 0.0).unwrap();
        rosette.update(&[1.0; 4]);
    }

    #[test]
    fn test_render_emits_one_curve_per_petal() {
        let rosette = RosetteGeometry::new(DVec2::new(1.0, 2.0), 3, 10.0, FILL, 0.0).unwrap();
        let v = rosette.display_vertices();
        let mut surface = Recorder::default();
        rosette.render(&mut surface);

        let expected = vec![
            Op::Begin,
            Op::Move(v[0]),
            Op::Line(v[0]),
            Op::Curve(v[1], v[2], v[3]),
            Op::Line(v[3]),
            Op::Curve(v[4], v[5], v[6]),
            Op::Line(v[6]),
            Op::Curve(v[7], v[8], v[0]),
            Op::Close,
            Op::Style(FILL),
            Op::Fill,
        ];
        assert_eq!(surface.0, expected);
    }

    #[test]
    fn test_layered_rosettes_from_config() {
        let config = SceneConfig::default();
        let layers = layered_rosettes(&config).unwrap();

        assert_eq!(layers.len(), 3);
        for (i, rosette) in layers.iter().enumerate() {
            assert_eq!(rosette.pole(), config.pole());
            assert_eq!(rosette.vertex_count(), 192);
            assert!((rosette.phase_offset() - TAU * i as f64 / 3.0).abs() < 1e-12);
        }
    }
}
