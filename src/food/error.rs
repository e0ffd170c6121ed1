use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("Could not access camera: {0}")]
    CameraUnavailable(String),
    #[error("Could not capture image: {0}")]
    CaptureFailed(String),
    #[error("Could not switch camera: {0}")]
    SwitchUnavailable(String),
    #[error("No image selected: {0}")]
    NoFileSelected(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    #[error("Food detection failed{}: {reason}", .status.map(|s| format!(" (status {})", s)).unwrap_or_default())]
    RecognitionFailed { status: Option<u16>, reason: String },
}

impl RecognitionError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::RecognitionFailed {
            status: None,
            reason: reason.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RecognitionFailed { status, .. } => *status,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Couldn't get food information: {0}")]
    LookupFailed(String),
    #[error("Failed to parse food information: {0}")]
    ParseFailed(String),
}

/// Failure of one end-to-end analysis, tagged by the stage that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Recognition(#[from] RecognitionError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}
