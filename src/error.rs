use thiserror::Error;

/// Camera acquisition failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
    /// The user or platform refused camera access
    #[error("{0}")]
    PermissionDenied(String),
    /// No usable camera device
    #[error("{0}")]
    Unavailable(String),
    /// Anything else the media layer reported
    #[error("{0}")]
    Other(String),
}

impl CameraError {
    /// Underlying reason reported by the media layer
    pub fn reason(&self) -> &str {
        match self {
            CameraError::PermissionDenied(reason)
            | CameraError::Unavailable(reason)
            | CameraError::Other(reason) => reason,
        }
    }

    /// Text shown in the scan result container
    pub fn user_message(&self) -> String {
        format!("Camera error: {}", self.reason())
    }
}

/// Failure to copy a video frame into the raster surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    /// Video has not buffered enough data
    #[error("video not ready")]
    NotReady,
    /// Source reported a zero-sized frame
    #[error("video frame is empty")]
    EmptyFrame,
    /// Platform drawing call failed
    #[error("capture failed: {0}")]
    Backend(String),
}

/// Failure on the upload path before decoding
///
/// Never shown to the user; the upload result container stays untouched.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Reading the selected file failed
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),
    /// The bytes are not a decodable image
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Failure to render a payload as a QR code
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Payload does not fit any QR version
    #[error("failed to encode payload: {0}")]
    Qr(#[from] qrcode::types::QrError),
    /// Scale factor must be at least one pixel per module
    #[error("scale must be at least 1")]
    ZeroScale,
}
