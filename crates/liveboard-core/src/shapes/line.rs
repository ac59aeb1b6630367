use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

use super::{Geometry, ShapeStyle, segment_distance};

/// A straight segment between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Line {
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            style: ShapeStyle::default(),
        }
    }
}

impl Geometry for Line {
    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        segment_distance(point, self.start, self.end) <= tolerance + self.style.reach()
    }

    fn transform(&mut self, affine: Affine) {
        self.start = affine * self.start;
        self.end = affine * self.end;
    }

    fn is_degenerate(&self) -> bool {
        self.start.distance(self.end) <= f64::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_along_segment_only() {
        let mut line = Line::new(Point::new(0.0, 0.0), Point::new(100.0, 0.0));
        line.style.stroke_width = 2.0;
        assert!(line.hit_test(Point::new(50.0, 1.0), 0.0));
        assert!(line.hit_test(Point::new(50.0, 3.5), 3.0));
        assert!(!line.hit_test(Point::new(50.0, 20.0), 5.0));
        // Past the end cap.
        assert!(!line.hit_test(Point::new(110.0, 0.0), 5.0));
    }

    #[test]
    fn test_bounds_for_reversed_segment() {
        let line = Line::new(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(line.bounds(), Rect::new(10.0, 20.0, 50.0, 80.0));
    }

    #[test]
    fn test_transform_moves_both_ends() {
        let mut line = Line::new(Point::new(0.0, 0.0), Point::new(10.0, 0.0));
        line.transform(Affine::translate((3.0, 4.0)));
        assert_eq!(line.start, Point::new(3.0, 4.0));
        assert_eq!(line.end, Point::new(13.0, 4.0));
    }

    #[test]
    fn test_zero_length_is_degenerate() {
        let p = Point::new(3.0, 3.0);
        assert!(Line::new(p, p).is_degenerate());
    }
}
