use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageFormat};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{FacingMode, ImagePayload};
use crate::food::error::CaptureError;

pub const CAPTURE_FILE_NAME: &str = "camera-capture.jpg";
const JPEG_QUALITY: u8 = 90;

/// What a stream request asks the camera hardware for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: FacingMode,
    pub ideal_width: u32,
    pub ideal_height: u32,
}

impl StreamConstraints {
    pub fn new(facing: FacingMode) -> Self {
        Self {
            facing,
            ideal_width: 1280,
            ideal_height: 720,
        }
    }
}

/// One decoded video frame, RGB8 packed row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[async_trait]
pub trait VideoStream: Send + Sync {
    fn facing_mode(&self) -> FacingMode;

    /// Current frame dimensions; `(0, 0)` until the stream has produced metadata.
    fn dimensions(&self) -> (u32, u32);

    async fn read_frame(&mut self) -> Result<Frame, CaptureError>;

    /// Releases the underlying device. Must be idempotent.
    fn stop(&mut self);
}

#[async_trait]
pub trait CameraBackend: Send + Sync {
    async fn open(&self, constraints: StreamConstraints) -> Result<Box<dyn VideoStream>, CaptureError>;
}

/// A live camera stream. Stopping happens on capture, explicit close, or drop.
pub struct CaptureSession {
    stream: Box<dyn VideoStream>,
    active: bool,
    facing: FacingMode,
}

impl CaptureSession {
    fn new(stream: Box<dyn VideoStream>) -> Self {
        let facing = stream.facing_mode();
        Self {
            stream,
            active: true,
            facing,
        }
    }

    pub fn facing_mode(&self) -> FacingMode {
        self.facing
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    fn stop(&mut self) {
        if self.active {
            self.stream.stop();
            self.active = false;
            debug!(facing = %self.facing, "camera stream stopped");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Obtains still images from a live camera. Holds at most one session.
pub struct ImageAcquisition {
    backend: Arc<dyn CameraBackend>,
    session: Option<CaptureSession>,
}

impl ImageAcquisition {
    pub fn new(backend: Arc<dyn CameraBackend>) -> Self {
        Self {
            backend,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&CaptureSession> {
        self.session.as_ref().filter(|s| s.is_active())
    }

    pub fn is_camera_open(&self) -> bool {
        self.session().is_some()
    }

    pub async fn open_camera(&mut self, facing: FacingMode) -> Result<&CaptureSession, CaptureError> {
        // Camera hardware is exclusive: release the old stream before asking again.
        self.close_camera();

        let stream = self.backend.open(StreamConstraints::new(facing)).await.map_err(|e| {
            warn!(%facing, error = %e, "error accessing camera");
            match e {
                CaptureError::CameraUnavailable(_) => e,
                other => CaptureError::CameraUnavailable(other.to_string()),
            }
        })?;

        info!(%facing, "camera opened");
        let session: &CaptureSession = self.session.insert(CaptureSession::new(stream));
        Ok(session)
    }

    pub fn close_camera(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
    }

    /// Grabs the current frame as a JPEG and closes the camera.
    pub async fn capture_frame(&mut self) -> Result<ImagePayload, CaptureError> {
        let session = self
            .session
            .as_mut()
            .filter(|s| s.is_active())
            .ok_or_else(|| CaptureError::CaptureFailed("camera not initialized".to_string()))?;

        let (width, height) = session.stream.dimensions();
        if width == 0 || height == 0 {
            return Err(CaptureError::CaptureFailed("could not get video dimensions".to_string()));
        }

        let frame = session.stream.read_frame().await.map_err(|e| match e {
            CaptureError::CaptureFailed(_) => e,
            other => CaptureError::CaptureFailed(other.to_string()),
        })?;
        let bytes = encode_jpeg(&frame, JPEG_QUALITY)?;

        self.close_camera();
        info!(width = frame.width, height = frame.height, size = bytes.len(), "frame captured");

        Ok(ImagePayload {
            bytes,
            format: ImageFormat::Jpeg,
            file_name: CAPTURE_FILE_NAME.to_string(),
        })
    }

    /// Tears down the current stream and opens the other camera.
    ///
    /// When the other camera cannot be opened the original facing mode is
    /// re-acquired before `SwitchUnavailable` is reported.
    pub async fn switch_camera(&mut self) -> Result<FacingMode, CaptureError> {
        let current = self
            .session()
            .map(CaptureSession::facing_mode)
            .ok_or_else(|| CaptureError::SwitchUnavailable("camera is not open".to_string()))?;
        let target = current.toggled();

        self.close_camera();

        match self.backend.open(StreamConstraints::new(target)).await {
            Ok(stream) => {
                let session = self.session.insert(CaptureSession::new(stream));
                info!(from = %current, to = %session.facing_mode(), "camera switched");
                Ok(session.facing_mode())
            }
            Err(e) => {
                warn!(from = %current, to = %target, error = %e, "error switching camera");
                match self.backend.open(StreamConstraints::new(current)).await {
                    Ok(stream) => {
                        self.session = Some(CaptureSession::new(stream));
                        debug!(facing = %current, "restored previous camera");
                    }
                    Err(fallback) => {
                        warn!(facing = %current, error = %fallback, "could not restore previous camera");
                    }
                }
                Err(CaptureError::SwitchUnavailable(
                    "device may only have one camera".to_string(),
                ))
            }
        }
    }
}

fn encode_jpeg(frame: &Frame, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let expected = (frame.width as usize)
        .checked_mul(frame.height as usize)
        .and_then(|n| n.checked_mul(3));
    if frame.width == 0 || frame.height == 0 || expected != Some(frame.pixels.len()) {
        return Err(CaptureError::CaptureFailed(format!(
            "malformed frame {}x{} with {} bytes",
            frame.width,
            frame.height,
            frame.pixels.len()
        )));
    }

    let mut bytes = Vec::new();
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
        encoder
            .encode(&frame.pixels, frame.width, frame.height, ColorType::Rgb8)
            .map_err(|e| CaptureError::CaptureFailed(format!("failed to create image: {}", e)))?;
    }
    Ok(bytes)
}
