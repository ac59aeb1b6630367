use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

use super::{Geometry, ShapeStyle, axis_scale, rotated_bounds, unrotate};

/// A rectangle given by its top-left corner and size, rotated about its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    #[serde(flatten)]
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Rectangle {
    pub fn new(position: Point, width: f64, height: f64) -> Self {
        Self {
            position,
            width,
            height,
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    /// The rectangle spanned by two opposite corners, in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let span = Rect::from_points(a, b);
        Self::new(span.origin(), span.width(), span.height())
    }

    /// Unrotated extent.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }
}

impl Geometry for Rectangle {
    fn bounds(&self) -> Rect {
        let rect = self.rect();
        rotated_bounds(rect, self.rotation, rect.center())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.rect();
        let slop = tolerance + self.style.reach();
        rect.inflate(slop, slop)
            .contains(unrotate(point, self.rotation, rect.center()))
    }

    fn transform(&mut self, affine: Affine) {
        let (sx, sy) = axis_scale(affine);
        self.position = affine * self.position;
        self.width *= sx;
        self.height *= sy;
    }

    fn is_degenerate(&self) -> bool {
        self.width <= f64::EPSILON || self.height <= f64::EPSILON
    }
}
