//! Image reading, validation and encoding utilities.
//!
//! This module turns caller-provided sources into decoded images and turns
//! the flattened canvas back into encoded bytes for download or for the
//! downstream mockup renderer.
//!
//! # Sources
//!
//! The engine decodes what it is given. Uploading and fetching remote
//! resources belong to the caller, so only local paths, `file://` URLs and
//! in-memory bytes are accepted here.

use crate::error::{AppError, Result};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use url::Url;

/// File extensions accepted for uploaded images.
pub const ALLOWED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Where an image comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    /// A file on the local filesystem.
    Path(PathBuf),
    /// Raw encoded bytes (a blob handed over by the caller).
    Bytes(Vec<u8>),
    /// A URL. Only the `file` scheme is resolved by the engine.
    Url(Url),
}

impl ImageSource {
    /// Short description used in log lines and notifications.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            ImageSource::Url(url) => url.to_string(),
        }
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::Path(path)
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        ImageSource::Bytes(bytes)
    }
}

/// Encoding used when exporting the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
        }
    }

    /// Picks the format from a file extension, defaulting to PNG.
    pub fn from_path(path: &Path) -> Self {
        match extension_of(path).as_deref() {
            Some("jpg") | Some("jpeg") => ExportFormat::Jpeg,
            _ => ExportFormat::Png,
        }
    }
}

/// Image reading and encoding helpers.
pub struct ImageProcessor;

impl ImageProcessor {
    /// Reads and decodes an image source.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnsupportedSource`] for non-`file` URLs,
    /// [`AppError::FileTooLarge`] when the data exceeds `max_bytes`, and
    /// [`AppError::ImageDecode`] when the bytes are not a readable image.
    pub fn load(source: &ImageSource, max_bytes: u64) -> Result<DynamicImage> {
        let bytes = Self::read_source(source, max_bytes)?;
        let image = Self::decode(&bytes)?;
        log::info!(
            "Decoded {} ({}x{})",
            source.describe(),
            image.width(),
            image.height()
        );
        Ok(image)
    }

    /// Resolves a source to its encoded bytes, enforcing the size ceiling.
    pub fn read_source(source: &ImageSource, max_bytes: u64) -> Result<Vec<u8>> {
        match source {
            ImageSource::Bytes(bytes) => {
                Self::validate_upload(bytes.len() as u64, None, max_bytes)?;
                Ok(bytes.clone())
            }
            ImageSource::Path(path) => Self::read_path(path, max_bytes),
            ImageSource::Url(url) => {
                if url.scheme() != "file" {
                    return Err(AppError::UnsupportedSource(format!(
                        "{} (fetch remote images before handing them to the editor)",
                        url
                    )));
                }
                let path = url
                    .to_file_path()
                    .map_err(|_| AppError::UnsupportedSource(url.to_string()))?;
                Self::read_path(&path, max_bytes)
            }
        }
    }

    fn read_path(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
        let size = fs::metadata(path)?.len();
        let name = path.file_name().and_then(|n| n.to_str());
        Self::validate_upload(size, name, max_bytes)?;
        Ok(fs::read(path)?)
    }

    /// Checks an upload against the size ceiling and extension list.
    ///
    /// `file_name` is optional because blobs carry no name; the decoder
    /// still rejects anything that is not an image.
    pub fn validate_upload(size: u64, file_name: Option<&str>, max_bytes: u64) -> Result<()> {
        if size > max_bytes {
            return Err(AppError::FileTooLarge {
                size,
                max: max_bytes,
            });
        }
        if let Some(name) = file_name {
            let allowed = extension_of(Path::new(name))
                .map(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false);
            if !allowed {
                return Err(AppError::decode(format!(
                    "Invalid file type for {}. Allowed types: {}",
                    name,
                    ALLOWED_IMAGE_EXTENSIONS.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Decodes encoded bytes, guessing the format from the content.
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| AppError::decode(format!("Failed to decode image: {}", e)))?;
        if image.width() == 0 || image.height() == 0 {
            return Err(AppError::decode("Image has zero width or height"));
        }
        Ok(image)
    }

    /// Encodes an RGBA image.
    ///
    /// JPEG has no alpha channel, so the image is flattened onto white first.
    pub fn encode(image: &RgbaImage, format: ExportFormat) -> Result<Vec<u8>> {
        let mut buffer: Vec<u8> = Vec::new();
        let mut cursor = Cursor::new(&mut buffer);

        let result = match format {
            ExportFormat::Png => image.write_to(&mut cursor, ImageFormat::Png),
            ExportFormat::Jpeg => {
                Self::flatten_onto_white(image).write_to(&mut cursor, ImageFormat::Jpeg)
            }
        };
        result.map_err(|e| AppError::encode(format!("Failed to encode image: {}", e)))?;

        Ok(buffer)
    }

    fn flatten_onto_white(image: &RgbaImage) -> RgbImage {
        RgbImage::from_fn(image.width(), image.height(), |x, y| {
            let [r, g, b, a] = image.get_pixel(x, y).0;
            let a = a as u32;
            let over = |c: u8| ((c as u32 * a + 255 * (255 - a)) / 255) as u8;
            Rgb([over(r), over(g), over(b)])
        })
    }

    /// Encodes an image as a base64 `data:` URL.
    pub fn encode_to_data_url(image: &RgbaImage, format: ExportFormat) -> Result<String> {
        let bytes = Self::encode(image, format)?;
        Ok(format!(
            "data:{};base64,{}",
            format.mime_type(),
            BASE64.encode(bytes)
        ))
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 3, image::Rgba([10, 20, 30, 255]));
        ImageProcessor::encode(&img, ExportFormat::Png).unwrap()
    }

    #[test]
    fn test_decode_bytes_source() {
        let image = ImageProcessor::load(&ImageSource::Bytes(png_bytes()), 1 << 20).unwrap();
        assert_eq!((image.width(), image.height()), (4, 3));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = ImageProcessor::decode(b"definitely not an image");
        assert!(matches!(result, Err(AppError::ImageDecode(_))));
    }

    #[test]
    fn test_size_ceiling() {
        let bytes = png_bytes();
        let result = ImageProcessor::load(&ImageSource::Bytes(bytes), 8);
        assert!(matches!(result, Err(AppError::FileTooLarge { max: 8, .. })));
    }

    #[test]
    fn test_extension_check() {
        assert!(ImageProcessor::validate_upload(10, Some("logo.PNG"), 100).is_ok());
        assert!(ImageProcessor::validate_upload(10, Some("logo.webp"), 100).is_ok());
        assert!(ImageProcessor::validate_upload(10, Some("logo.gif"), 100).is_err());
        assert!(ImageProcessor::validate_upload(10, Some("logo"), 100).is_err());
    }

    #[test]
    fn test_remote_url_rejected() {
        let url = Url::parse("https://example.com/logo.png").unwrap();
        let result = ImageProcessor::read_source(&ImageSource::Url(url), 100);
        assert!(matches!(result, Err(AppError::UnsupportedSource(_))));
    }

    #[test]
    fn test_jpeg_export_flattens_alpha() {
        let img = RgbaImage::from_pixel(8, 8, image::Rgba([0, 0, 0, 0]));
        let bytes = ImageProcessor::encode(&img, ExportFormat::Jpeg).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = ImageProcessor::decode(&bytes).unwrap().to_rgb8();
        assert!(decoded.get_pixel(4, 4).0.iter().all(|c| *c > 240));
    }

    #[test]
    fn test_data_url_prefix() {
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 0, 255]));
        let url = ImageProcessor::encode_to_data_url(&img, ExportFormat::Png).unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(ExportFormat::from_path(Path::new("out.JPG")), ExportFormat::Jpeg);
        assert_eq!(ExportFormat::from_path(Path::new("out.png")), ExportFormat::Png);
        assert_eq!(ExportFormat::from_path(Path::new("out")), ExportFormat::Png);
    }
}
