use std::path::Path;
use tracing::info;

use super::ImagePayload;
use crate::food::error::CaptureError;

/// Reads the image the user picked. `None` means the picker was dismissed.
pub async fn pick_file(path: Option<&Path>) -> Result<ImagePayload, CaptureError> {
    let path = path.ok_or_else(|| CaptureError::NoFileSelected("no file chosen".to_string()))?;

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| CaptureError::NoFileSelected(format!("cannot read {}: {}", path.display(), e)))?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let payload = ImagePayload::from_bytes(bytes, file_name)?;
    info!(file = %payload.file_name, mime = payload.mime_type(), size = payload.bytes.len(), "image selected");
    Ok(payload)
}
