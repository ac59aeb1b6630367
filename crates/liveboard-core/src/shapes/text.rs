use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

use super::{Geometry, ShapeStyle, axis_scale, rotated_bounds, unrotate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontFamily {
    #[default]
    Handwritten,
    SansSerif,
    Monospace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontWeight {
    Light,
    #[default]
    Regular,
    Bold,
}

/// Line height as a multiple of font size.
const LINE_HEIGHT: f64 = 1.2;
/// Narrowest box kept for empty or short text, so it stays pickable.
const MIN_WIDTH: f64 = 20.0;

/// A text label anchored at its top-left corner.
///
/// The surface has no font shaping, so extents are estimated from glyph
/// counts and per-family advance widths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(flatten)]
    pub position: Point,
    pub content: String,
    #[serde(default = "Text::default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub font_family: FontFamily,
    #[serde(default)]
    pub font_weight: FontWeight,
    /// Radians, about the top-left corner.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Text {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;

    fn default_font_size() -> f64 {
        Self::DEFAULT_FONT_SIZE
    }

    pub fn new(position: Point, content: String) -> Self {
        Self {
            position,
            content,
            font_size: Self::DEFAULT_FONT_SIZE,
            font_family: FontFamily::default(),
            font_weight: FontWeight::default(),
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Average advance of one glyph, in pixels.
    fn advance(&self) -> f64 {
        let family = match self.font_family {
            FontFamily::Handwritten => 0.55,
            FontFamily::SansSerif => 0.52,
            FontFamily::Monospace => 0.60,
        };
        let weight = match self.font_weight {
            FontWeight::Light => -0.03,
            FontWeight::Regular => 0.0,
            FontWeight::Bold => 0.03,
        };
        (family + weight) * self.font_size
    }

    /// Estimated unrotated extent.
    pub fn layout_rect(&self) -> Rect {
        let columns = self
            .content
            .split('\n')
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let rows = self.content.split('\n').count();
        let width = (columns as f64 * self.advance()).max(MIN_WIDTH);
        let height = rows as f64 * self.font_size * LINE_HEIGHT;
        Rect::from_origin_size(self.position, (width, height))
    }
}

impl Geometry for Text {
    fn bounds(&self) -> Rect {
        rotated_bounds(self.layout_rect(), self.rotation, self.position)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.layout_rect()
            .inflate(tolerance, tolerance)
            .contains(unrotate(point, self.rotation, self.position))
    }

    fn transform(&mut self, affine: Affine) {
        let (sx, sy) = axis_scale(affine);
        self.position = affine * self.position;
        let scale = (sx + sy) / 2.0;
        if (scale - 1.0).abs() > 1e-3 {
            self.font_size *= scale;
        }
    }

    fn is_degenerate(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_and_columns_drive_extent() {
        let one = Text::new(Point::ZERO, "abcd".to_string());
        let two = Text::new(Point::ZERO, "ab\nabcd".to_string());
        let trailing = Text::new(Point::ZERO, "abcd\n".to_string());
        assert!((one.layout_rect().width() - two.layout_rect().width()).abs() < 1e-9);
        assert!((two.layout_rect().height() - 2.0 * one.layout_rect().height()).abs() < 1e-9);
        assert!((trailing.layout_rect().height() - two.layout_rect().height()).abs() < 1e-9);
    }

    #[test]
    fn test_empty_text_keeps_a_pickable_box() {
        let text = Text::new(Point::new(5.0, 5.0), String::new());
        assert!((text.layout_rect().width() - MIN_WIDTH).abs() < f64::EPSILON);
        assert!(text.hit_test(Point::new(10.0, 10.0), 0.0));
    }

    #[test]
    fn test_monospace_bold_is_wider() {
        let mut text = Text::new(Point::ZERO, "liveboard".to_string());
        let regular = text.layout_rect().width();
        text.font_family = FontFamily::Monospace;
        text.font_weight = FontWeight::Bold;
        assert!(text.layout_rect().width() > regular);
    }

    #[test]
    fn test_uniform_scale_grows_font() {
        let mut text = Text::new(Point::ZERO, "Hi".to_string());
        text.transform(Affine::scale(1.5));
        assert!((text.font_size - 30.0).abs() < 1e-9);
        text.transform(Affine::translate((4.0, 0.0)));
        assert!((text.font_size - 30.0).abs() < 1e-9);
        assert_eq!(text.position, Point::new(4.0, 0.0));
    }

    #[test]
    fn test_blank_text_is_degenerate() {
        assert!(Text::new(Point::ZERO, " \n ".to_string()).is_degenerate());
        assert!(!Text::new(Point::ZERO, "x".to_string()).is_degenerate());
    }
}
