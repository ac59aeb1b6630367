//! Drawable kinds held by the canvas surface.
//!
//! A [`Drawable`] is the live geometry of one object on the surface. It does
//! not carry a shape identifier: the identity side-table and the codec attach
//! `shapeId` when the object is written to the shared store.

mod ellipse;
mod freehand;
mod image;
mod line;
mod rectangle;
mod text;

pub use ellipse::Ellipse;
pub use freehand::Freehand;
pub use image::{Image, ImageFormat};
pub use line::Line;
pub use rectangle::Rectangle;
pub use text::{FontFamily, FontWeight, Text};

use kurbo::{Affine, ParamCurveNearest, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a shape across clients.
pub type ShapeId = Uuid;

/// RGBA8 color as it appears in records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke and fill shared by every kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeStyle {
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
    /// 0.0 is invisible, 1.0 opaque.
    #[serde(default = "ShapeStyle::opaque")]
    pub opacity: f64,
}

impl ShapeStyle {
    fn opaque() -> f64 {
        1.0
    }

    /// Stroke color with `opacity` folded into alpha, ready for painting.
    pub fn stroke(&self) -> Color {
        let c = self.stroke_color;
        let alpha = (f64::from(c.a) * self.opacity.clamp(0.0, 1.0)).round() as u8;
        Color::from_rgba8(c.r, c.g, c.b, alpha)
    }

    pub fn fill(&self) -> Option<Color> {
        self.fill_color.map(Color::from)
    }

    /// Half the stroke width, the distance a stroke reaches past the outline.
    fn reach(&self) -> f64 {
        self.stroke_width / 2.0
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
            opacity: 1.0,
        }
    }
}

/// Record-level kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rectangle,
    Ellipse,
    Line,
    FreeformPath,
    Text,
    Image,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::Line,
        ShapeKind::FreeformPath,
        ShapeKind::Text,
        ShapeKind::Image,
    ];

    /// The `kind` string stored in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Line => "line",
            ShapeKind::FreeformPath => "freeform-path",
            ShapeKind::Text => "text",
            ShapeKind::Image => "image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Distance from `point` to the segment `a`-`b`.
pub(crate) fn segment_distance(point: Point, a: Point, b: Point) -> f64 {
    if a == b {
        return point.distance(a);
    }
    kurbo::Line::new(a, b).nearest(point, 1e-9).distance_sq.sqrt()
}

/// Axis-aligned bounds of `rect` rotated by `rotation` about `pivot`.
pub(crate) fn rotated_bounds(rect: Rect, rotation: f64, pivot: Point) -> Rect {
    if rotation == 0.0 {
        return rect;
    }
    Affine::rotate_about(rotation, pivot).transform_rect_bbox(rect)
}

/// Map a world point into the unrotated frame of a shape.
pub(crate) fn unrotate(point: Point, rotation: f64, pivot: Point) -> Point {
    if rotation == 0.0 {
        return point;
    }
    Affine::rotate_about(-rotation, pivot) * point
}

/// Scale factors of an affine along x and y, ignoring shear.
pub(crate) fn axis_scale(affine: Affine) -> (f64, f64) {
    let [a, _, _, d, _, _] = affine.as_coeffs();
    (a.abs(), d.abs())
}

/// Geometry every drawable kind provides.
pub trait Geometry {
    /// World-space bounding box, including rotation.
    fn bounds(&self) -> Rect;

    /// Whether `point` picks this shape, with `tolerance` of slop.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Move and scale. Rotation is tracked in its own field.
    fn transform(&mut self, affine: Affine);

    /// True when the shape has no visible extent and must not be stored.
    fn is_degenerate(&self) -> bool;
}

/// A live surface object of any kind.
///
/// Serializes as a flat record tagged by `kind`, e.g.
/// `{"kind": "rectangle", "x": 10.0, "y": 10.0, "width": 100.0, ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Drawable {
    Rectangle(Rectangle),
    Ellipse(Ellipse),
    Line(Line),
    FreeformPath(Freehand),
    Text(Text),
    Image(Image),
}

macro_rules! dispatch {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Drawable::Rectangle($s) => $body,
            Drawable::Ellipse($s) => $body,
            Drawable::Line($s) => $body,
            Drawable::FreeformPath($s) => $body,
            Drawable::Text($s) => $body,
            Drawable::Image($s) => $body,
        }
    };
}

impl Drawable {
    /// Create the initial object for a draw gesture anchored at `anchor`.
    ///
    /// Returns `None` for kinds that are not drawn by dragging (images).
    pub fn begin(kind: ShapeKind, anchor: Point, style: ShapeStyle) -> Option<Self> {
        let drawable = match kind {
            ShapeKind::Rectangle => Drawable::Rectangle(Rectangle::new(anchor, 0.0, 0.0)),
            ShapeKind::Ellipse => Drawable::Ellipse(Ellipse::new(anchor, 0.0, 0.0)),
            ShapeKind::Line => Drawable::Line(Line::new(anchor, anchor)),
            ShapeKind::FreeformPath => Drawable::FreeformPath(Freehand::from_points(vec![anchor])),
            ShapeKind::Text => Drawable::Text(Text::new(anchor, String::new())),
            ShapeKind::Image => return None,
        };
        Some(drawable.with_style(style))
    }

    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        *self.style_mut() = style;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Drawable::Rectangle(_) => ShapeKind::Rectangle,
            Drawable::Ellipse(_) => ShapeKind::Ellipse,
            Drawable::Line(_) => ShapeKind::Line,
            Drawable::FreeformPath(_) => ShapeKind::FreeformPath,
            Drawable::Text(_) => ShapeKind::Text,
            Drawable::Image(_) => ShapeKind::Image,
        }
    }

    /// Reshape an in-progress object so it spans `anchor` to `current`.
    pub fn resize_from(&mut self, anchor: Point, current: Point) {
        let span = Rect::from_points(anchor, current);
        match self {
            Drawable::Rectangle(r) => {
                r.position = span.origin();
                r.width = span.width();
                r.height = span.height();
            }
            Drawable::Ellipse(e) => {
                e.center = span.center();
                e.radius_x = span.width() / 2.0;
                e.radius_y = span.height() / 2.0;
            }
            Drawable::Line(l) => {
                l.start = anchor;
                l.end = current;
            }
            Drawable::FreeformPath(f) => f.add_point(current),
            // Placed at the anchor; size comes from content.
            Drawable::Text(_) | Drawable::Image(_) => {}
        }
    }

    /// Rotation in radians; lines and paths are never rotated.
    pub fn rotation(&self) -> f64 {
        self.rotation_slot().map_or(0.0, |r| *r)
    }

    pub fn set_rotation(&mut self, rotation: f64) {
        if let Some(slot) = self.rotation_slot_mut() {
            *slot = rotation;
        }
    }

    fn rotation_slot(&self) -> Option<&f64> {
        match self {
            Drawable::Rectangle(r) => Some(&r.rotation),
            Drawable::Ellipse(e) => Some(&e.rotation),
            Drawable::Text(t) => Some(&t.rotation),
            Drawable::Image(i) => Some(&i.rotation),
            Drawable::Line(_) | Drawable::FreeformPath(_) => None,
        }
    }

    fn rotation_slot_mut(&mut self) -> Option<&mut f64> {
        match self {
            Drawable::Rectangle(r) => Some(&mut r.rotation),
            Drawable::Ellipse(e) => Some(&mut e.rotation),
            Drawable::Text(t) => Some(&mut t.rotation),
            Drawable::Image(i) => Some(&mut i.rotation),
            Drawable::Line(_) | Drawable::FreeformPath(_) => None,
        }
    }

    pub fn style(&self) -> &ShapeStyle {
        dispatch!(self, s => &s.style)
    }

    pub fn style_mut(&mut self) -> &mut ShapeStyle {
        dispatch!(self, s => &mut s.style)
    }

    pub fn bounds(&self) -> Rect {
        dispatch!(self, s => s.bounds())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        dispatch!(self, s => s.hit_test(point, tolerance))
    }

    pub fn transform(&mut self, affine: Affine) {
        dispatch!(self, s => s.transform(affine))
    }

    pub fn is_degenerate(&self) -> bool {
        dispatch!(self, s => s.is_degenerate())
    }
}
