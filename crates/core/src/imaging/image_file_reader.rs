use std::io::Read;
use std::path::Path;

use thiserror::Error;

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum ReadImageError {
    #[error("unsupported image type '{0}', expected one of: jpg, jpeg, png")]
    UnsupportedType(String),
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

/// Decodes uploaded photos into RGB frames.
pub struct ImageFileReader;

impl ImageFileReader {
    /// Decode a `.jpg`, `.jpeg` or `.png` file.
    pub fn read_path(path: &Path) -> Result<Frame, ReadImageError> {
        if !is_supported_image(path) {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_string();
            return Err(ReadImageError::UnsupportedType(ext));
        }
        let bytes = std::fs::read(path)?;
        Self::read_bytes(&bytes)
    }

    /// Decode an image piped in from another program, format sniffed from its header.
    pub fn read_stream(mut input: impl Read) -> Result<Frame, ReadImageError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        Self::read_bytes(&bytes)
    }

    pub fn read_bytes(bytes: &[u8]) -> Result<Frame, ReadImageError> {
        let img = image::load_from_memory(bytes)?.to_rgb8();
        log::debug!("Decoded {}x{} image", img.width(), img.height());
        Ok(Frame::from_rgb_image(img))
    }
}

pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
