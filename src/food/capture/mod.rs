pub mod camera;
pub mod file_picker;
pub mod snapshot;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::food::error::CaptureError;

pub use camera::{CameraBackend, CaptureSession, Frame, ImageAcquisition, StreamConstraints, VideoStream};
pub use file_picker::pick_file;
pub use snapshot::SnapshotCamera;

/// Which physical camera a capture session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front camera, facing the user.
    User,
    /// Back camera, facing the scene.
    Environment,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }
}

impl Default for FacingMode {
    fn default() -> Self {
        FacingMode::User
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::User => write!(f, "front"),
            FacingMode::Environment => write!(f, "back"),
        }
    }
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "front" | "user" => Ok(FacingMode::User),
            "back" | "rear" | "environment" => Ok(FacingMode::Environment),
            other => Err(format!("Unknown facing mode '{}'. Use front or back.", other)),
        }
    }
}

/// Still image ready to be sent for recognition.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
    pub file_name: String,
}

impl ImagePayload {
    /// Wraps raw bytes, rejecting anything that is not a supported image.
    pub fn from_bytes(bytes: Vec<u8>, file_name: impl Into<String>) -> Result<Self, CaptureError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(CaptureError::NoFileSelected(format!("{} is empty", file_name)));
        }

        let format = image::guess_format(&bytes)
            .map_err(|e| CaptureError::NoFileSelected(format!("{} is not an image: {}", file_name, e)))?;

        match format {
            ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::WebP | ImageFormat::Gif => Ok(Self {
                bytes,
                format,
                file_name,
            }),
            other => Err(CaptureError::NoFileSelected(format!(
                "{} has unsupported image format {:?}",
                file_name, other
            ))),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self.format {
            ImageFormat::Png => "image/png",
            ImageFormat::WebP => "image/webp",
            ImageFormat::Gif => "image/gif",
            _ => "image/jpeg",
        }
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggling_twice_returns_original_mode() {
        assert_eq!(FacingMode::User.toggled().toggled(), FacingMode::User);
        assert_eq!(FacingMode::Environment.toggled(), FacingMode::User);
    }

    #[test]
    fn test_parse_facing_mode() {
        assert_eq!("front".parse::<FacingMode>().unwrap(), FacingMode::User);
        assert_eq!("BACK".parse::<FacingMode>().unwrap(), FacingMode::Environment);
        assert!("sideways".parse::<FacingMode>().is_err());
    }

    #[test]
    fn test_payload_rejects_non_image_bytes() {
        let result = ImagePayload::from_bytes(b"definitely not an image".to_vec(), "notes.txt");
        assert!(matches!(result, Err(CaptureError::NoFileSelected(_))));
    }

    #[test]
    fn test_payload_sniffs_png() {
        let png_magic = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
        let payload = ImagePayload::from_bytes(png_magic, "plate.png").unwrap();
        assert_eq!(payload.mime_type(), "image/png");
        assert!(!payload.to_base64().is_empty());
    }
}
