use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::camera::{CameraBackend, Frame, StreamConstraints, VideoStream};
use super::FacingMode;
use crate::food::error::CaptureError;

/// Camera backend fed by a capture daemon that keeps overwriting the latest
/// frame of each device in a snapshot file.
///
/// Each device can be held by one stream at a time.
#[derive(Clone, Default)]
pub struct SnapshotCamera {
    devices: HashMap<FacingMode, PathBuf>,
    held: Arc<Mutex<HashSet<FacingMode>>>,
}

impl SnapshotCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_device(mut self, facing: FacingMode, snapshot: impl Into<PathBuf>) -> Self {
        self.devices.insert(facing, snapshot.into());
        self
    }

    /// Devices from `CAMERA_FRONT_SNAPSHOT` and `CAMERA_BACK_SNAPSHOT`.
    pub fn from_env() -> Self {
        let mut camera = Self::new();
        if let Ok(path) = env::var("CAMERA_FRONT_SNAPSHOT") {
            camera = camera.with_device(FacingMode::User, path);
        }
        if let Ok(path) = env::var("CAMERA_BACK_SNAPSHOT") {
            camera = camera.with_device(FacingMode::Environment, path);
        }
        camera
    }

    pub fn has_devices(&self) -> bool {
        !self.devices.is_empty()
    }
}

#[async_trait]
impl CameraBackend for SnapshotCamera {
    async fn open(&self, constraints: StreamConstraints) -> Result<Box<dyn VideoStream>, CaptureError> {
        let facing = constraints.facing;
        let path = self
            .devices
            .get(&facing)
            .cloned()
            .ok_or_else(|| CaptureError::CameraUnavailable(format!("no {} camera found", facing)))?;

        if !self.held.lock().insert(facing) {
            return Err(CaptureError::CameraUnavailable(format!("{} camera is busy", facing)));
        }

        let mut stream = SnapshotStream {
            path,
            facing,
            dimensions: (0, 0),
            held: self.held.clone(),
            live: true,
        };

        // Probing the first frame doubles as the permission/device check.
        match stream.read_frame().await {
            Ok(frame) => {
                stream.dimensions = (frame.width, frame.height);
                debug!(
                    %facing,
                    width = frame.width,
                    height = frame.height,
                    ideal_width = constraints.ideal_width,
                    ideal_height = constraints.ideal_height,
                    "snapshot stream ready"
                );
                Ok(Box::new(stream))
            }
            Err(e) => Err(CaptureError::CameraUnavailable(e.to_string())),
        }
    }
}

struct SnapshotStream {
    path: PathBuf,
    facing: FacingMode,
    dimensions: (u32, u32),
    held: Arc<Mutex<HashSet<FacingMode>>>,
    live: bool,
}

async fn decode_snapshot(path: &Path) -> Result<Frame, CaptureError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CaptureError::CaptureFailed(format!("cannot read {}: {}", path.display(), e)))?;
    let image = image::load_from_memory(&bytes)
        .map_err(|e| CaptureError::CaptureFailed(format!("cannot decode {}: {}", path.display(), e)))?
        .to_rgb8();
    let (width, height) = image.dimensions();
    Ok(Frame {
        width,
        height,
        pixels: image.into_raw(),
    })
}

#[async_trait]
impl VideoStream for SnapshotStream {
    fn facing_mode(&self) -> FacingMode {
        self.facing
    }

    fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    async fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        if !self.live {
            return Err(CaptureError::CaptureFailed("stream is stopped".to_string()));
        }
        let frame = decode_snapshot(&self.path).await?;
        self.dimensions = (frame.width, frame.height);
        Ok(frame)
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.held.lock().remove(&self.facing);
        }
    }
}

impl Drop for SnapshotStream {
    fn drop(&mut self) {
        self.stop();
    }
}
