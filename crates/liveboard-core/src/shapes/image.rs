use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::{Affine, Point, Rect};
use serde::{Deserialize, Serialize};

use super::{Geometry, ShapeStyle, axis_scale, rotated_bounds, unrotate};

/// Encodings accepted for inserted images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Case-insensitive file extension lookup.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Sniff the encoding from the file signature.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
        const JPEG: &[u8] = b"\xff\xd8\xff";
        match data {
            d if d.starts_with(PNG) => Some(ImageFormat::Png),
            d if d.starts_with(JPEG) => Some(ImageFormat::Jpeg),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
                Some(ImageFormat::WebP)
            }
            _ => None,
        }
    }

    pub(crate) fn as_image_crate(&self) -> ::image::ImageFormat {
        match self {
            ImageFormat::Png => ::image::ImageFormat::Png,
            ImageFormat::Jpeg => ::image::ImageFormat::Jpeg,
            ImageFormat::WebP => ::image::ImageFormat::WebP,
        }
    }
}

/// A placed raster image. The encoded bytes travel inside the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(flatten)]
    pub position: Point,
    /// Displayed size.
    pub width: f64,
    pub height: f64,
    /// Pixel size of the encoded image.
    pub source_width: u32,
    pub source_height: u32,
    #[serde(default)]
    pub source_name: String,
    pub format: ImageFormat,
    pub data_base64: String,
    /// Radians, about the center.
    #[serde(default)]
    pub rotation: f64,
    /// Stroke draws an optional border.
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Image {
    /// Place encoded bytes at `position`, displayed at pixel size.
    pub fn new(
        position: Point,
        data: &[u8],
        source_width: u32,
        source_height: u32,
        format: ImageFormat,
    ) -> Self {
        Self {
            position,
            width: f64::from(source_width),
            height: f64::from(source_height),
            source_width,
            source_height,
            source_name: String::new(),
            format,
            data_base64: STANDARD.encode(data),
            rotation: 0.0,
            style: ShapeStyle::default(),
        }
    }

    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Shrink to fit a `max_width` x `max_height` box, keeping aspect ratio.
    /// Never enlarges.
    pub fn fit_within(mut self, max_width: f64, max_height: f64) -> Self {
        let factor = (max_width / self.width).min(max_height / self.height);
        if factor.is_finite() && factor < 1.0 {
            self.width *= factor;
            self.height *= factor;
        }
        self
    }

    /// Decoded image bytes, or `None` if the payload is not valid base64.
    pub fn data(&self) -> Option<Vec<u8>> {
        STANDARD.decode(&self.data_base64).ok()
    }

    /// Unrotated extent.
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.position, (self.width, self.height))
    }
}

impl Geometry for Image {
    fn bounds(&self) -> Rect {
        let rect = self.rect();
        rotated_bounds(rect, self.rotation, rect.center())
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let rect = self.rect();
        rect.inflate(tolerance, tolerance)
            .contains(unrotate(point, self.rotation, rect.center()))
    }

    fn transform(&mut self, affine: Affine) {
        let (sx, sy) = axis_scale(affine);
        self.position = affine * self.position;
        self.width *= sx;
        self.height *= sy;
    }

    fn is_degenerate(&self) -> bool {
        self.width <= f64::EPSILON || self.height <= f64::EPSILON || self.data_base64.is_empty()
    }
}
