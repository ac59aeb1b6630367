use kurbo::{Affine, Point, Rect, Shape, Vec2};
use serde::{Deserialize, Serialize};

use super::{Geometry, ShapeStyle, axis_scale};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ellipse {
    pub center: Point,
    pub radius_x: f64,
    pub radius_y: f64,
    /// Radians, about the center.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Ellipse {
    pub fn new(center: Point, radius_x: f64, radius_y: f64) -> Self {
        Self {
            center,
            radius_x,
            radius_y,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    fn outline(&self, grow: f64) -> kurbo::Ellipse {
        kurbo::Ellipse::new(
            self.center,
            Vec2::new(self.radius_x + grow, self.radius_y + grow),
            self.rotation,
        )
    }
}

impl Geometry for Ellipse {
    fn bounds(&self) -> Rect {
        self.outline(0.0).bounding_box()
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let grow = tolerance + self.style.reach();
        if self.radius_x + grow <= 0.0 || self.radius_y + grow <= 0.0 {
            return false;
        }
        // Normalized distance in the ellipse's own frame.
        let local = Affine::rotate(-self.rotation) * (point - self.center).to_point();
        let nx = local.x / (self.radius_x + grow);
        let ny = local.y / (self.radius_y + grow);
        nx * nx + ny * ny <= 1.0
    }

    fn transform(&mut self, affine: Affine) {
        let (sx, sy) = axis_scale(affine);
        self.center = affine * self.center;
        self.radius_x *= sx;
        self.radius_y *= sy;
    }

    fn is_degenerate(&self) -> bool {
        self.radius_x <= f64::EPSILON || self.radius_y <= f64::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_bounds_follow_rotation() {
        let mut e = Ellipse::new(Point::new(50.0, 50.0), 30.0, 10.0);
        let b = e.bounds();
        assert!(close(b.x0, 20.0) && close(b.x1, 80.0));
        assert!(close(b.y0, 40.0) && close(b.y1, 60.0));

        e.rotation = std::f64::consts::FRAC_PI_2;
        let b = e.bounds();
        assert!(close(b.width(), 20.0) && close(b.height(), 60.0));
    }

    #[test]
    fn test_pick_inside_and_near_edge() {
        let mut e = Ellipse::new(Point::ZERO, 10.0, 5.0);
        e.style.stroke_width = 0.0;
        assert!(e.hit_test(Point::ZERO, 0.0));
        assert!(e.hit_test(Point::new(10.0, 0.0), 0.0));
        assert!(!e.hit_test(Point::new(0.0, 7.0), 0.0));
        assert!(e.hit_test(Point::new(0.0, 7.0), 2.0));
    }

    #[test]
    fn test_rotated_pick() {
        let mut e = Ellipse::new(Point::ZERO, 20.0, 2.0);
        e.style.stroke_width = 0.0;
        e.rotation = std::f64::consts::FRAC_PI_2;
        assert!(e.hit_test(Point::new(0.0, 15.0), 0.0));
        assert!(!e.hit_test(Point::new(15.0, 0.0), 0.0));
    }

    #[test]
    fn test_flat_ellipse_is_degenerate() {
        assert!(Ellipse::new(Point::ZERO, 0.0, 3.0).is_degenerate());
        assert!(!Ellipse::new(Point::ZERO, 1.0, 1.0).is_degenerate());
    }
}
