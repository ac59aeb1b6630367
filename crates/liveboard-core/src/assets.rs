//! Image loading for image insertion.

use std::path::{Path, PathBuf};

use crate::error::AssetError;
use crate::shapes::ImageFormat;

/// The "file handle" produced by an upload control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Path(PathBuf),
    /// Bytes already in memory (drag-and-drop, clipboard, browser upload).
    Bytes { name: String, data: Vec<u8> },
}

impl ImageSource {
    /// Human-readable name for logs and notifications.
    pub fn name(&self) -> String {
        match self {
            ImageSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ImageSource::Bytes { name, .. } => name.clone(),
        }
    }
}

/// A decoded, validated image ready to be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub name: String,
    /// Original encoded bytes.
    pub data: Vec<u8>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Resolves an [`ImageSource`] to image bytes and dimensions.
pub trait ImageLoader {
    fn load(&self, source: &ImageSource) -> Result<LoadedImage, AssetError>;
}

/// Loader that reads files and decodes them with the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodingImageLoader;

impl DecodingImageLoader {
    fn read(path: &Path) -> Result<Vec<u8>, AssetError> {
        std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn detect_format(source: &ImageSource, data: &[u8]) -> Option<ImageFormat> {
        ImageFormat::from_magic_bytes(data).or_else(|| match source {
            ImageSource::Path(path) => path
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension),
            ImageSource::Bytes { name, .. } => Path::new(name)
                .extension()
                .and_then(|ext| ext.to_str())
                .and_then(ImageFormat::from_extension),
        })
    }
}

impl ImageLoader for DecodingImageLoader {
    fn load(&self, source: &ImageSource) -> Result<LoadedImage, AssetError> {
        let data = match source {
            ImageSource::Path(path) => Self::read(path)?,
            ImageSource::Bytes { data, .. } => data.clone(),
        };
        let name = source.name();
        let format =
            Self::detect_format(source, &data).ok_or_else(|| AssetError::UnsupportedFormat(name.clone()))?;
        let decoded = image::load_from_memory_with_format(&data, format.as_image_crate())?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(AssetError::Empty(name));
        }
        log::debug!(
            "Loaded image {name}: {}x{} {:?}",
            decoded.width(),
            decoded.height(),
            format
        );
        Ok(LoadedImage {
            name,
            width: decoded.width(),
            height: decoded.height(),
            data,
            format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn tiny_png(width: u32, height: u32) -> Vec<u8> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, width, height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer
                .write_image_data(&vec![255u8; (width * height * 4) as usize])
                .unwrap();
        }
        png_data
    }

    #[test]
    fn test_load_png_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&tiny_png(3, 2))
            .unwrap();

        let loaded = DecodingImageLoader.load(&ImageSource::Path(path)).unwrap();
        assert_eq!(loaded.name, "dot.png");
        assert_eq!(loaded.format, ImageFormat::Png);
        assert_eq!((loaded.width, loaded.height), (3, 2));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DecodingImageLoader
            .load(&ImageSource::Path(dir.path().join("nope.png")))
            .unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }

    #[test]
    fn test_unknown_bytes_are_unsupported() {
        let source = ImageSource::Bytes {
            name: "notes.txt".to_string(),
            data: b"hello world".to_vec(),
        };
        assert!(matches!(
            DecodingImageLoader.load(&source),
            Err(AssetError::UnsupportedFormat(name)) if name == "notes.txt"
        ));
    }

    #[test]
    fn test_corrupt_png_is_decode_error() {
        let mut data = tiny_png(2, 2);
        data.truncate(20);
        let source = ImageSource::Bytes {
            name: "broken.png".to_string(),
            data,
        };
        assert!(matches!(
            DecodingImageLoader.load(&source),
            Err(AssetError::Decode(_))
        ));
    }
}
