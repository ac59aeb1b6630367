use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

use super::{Geometry, ShapeStyle, segment_distance};

/// A pen stroke stored as its sampled points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Freehand {
    pub points: Vec<Point>,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Freehand {
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            style: ShapeStyle::default(),
        }
    }

    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Drop samples that deviate less than `tolerance` from the simplified
    /// stroke (Ramer-Douglas-Peucker). Endpoints are always kept.
    pub fn simplify(&mut self, tolerance: f64) {
        let n = self.points.len();
        if n < 3 {
            return;
        }
        let mut keep = vec![false; n];
        keep[0] = true;
        keep[n - 1] = true;

        let mut spans = vec![(0, n - 1)];
        while let Some((first, last)) = spans.pop() {
            let (a, b) = (self.points[first], self.points[last]);
            let farthest = (first + 1..last)
                .map(|i| (i, segment_distance(self.points[i], a, b)))
                .max_by(|x, y| x.1.total_cmp(&y.1));
            if let Some((i, dist)) = farthest {
                if dist > tolerance {
                    keep[i] = true;
                    spans.push((first, i));
                    spans.push((i, last));
                }
            }
        }

        let mut flags = keep.into_iter();
        self.points.retain(|_| flags.next().unwrap_or(false));
    }
}

impl Geometry for Freehand {
    fn bounds(&self) -> Rect {
        let mut points = self.points.iter().copied();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(first, first), |acc, p| acc.union_pt(p))
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let reach = tolerance + self.style.reach();
        match self.points.as_slice() {
            [] => false,
            [only] => point.distance(*only) <= reach,
            points => points
                .windows(2)
                .any(|pair| segment_distance(point, pair[0], pair[1]) <= reach),
        }
    }

    fn transform(&mut self, affine: Affine) {
        self.points.iter_mut().for_each(|p| *p = affine * *p);
    }

    fn is_degenerate(&self) -> bool {
        self.points.len() < 2
    }
}
