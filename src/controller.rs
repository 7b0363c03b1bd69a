//! Scan UI controller
//!
//! Owns the decode function, both result containers, the attached video
//! source and the offscreen raster. Two independent paths write results:
//!
//! - camera: [`ScanController::start_camera`] once, then
//!   [`ScanController::tick`] every frame; only successful decodes are shown
//! - upload: [`ScanController::handle_file_selection`] once per selection;
//!   shows either a link or [`NO_CODE_FOUND`]
//!
//! Each path writes only its own container.

use crate::camera::{CameraProvider, ReadyState, VideoSource};
use crate::config::ScanConfig;
use crate::decoder::Decoder;
use crate::error::{CameraError, CaptureError, UploadError};
use crate::models::{FrameBuffer, Payload};
use crate::render::{NO_CODE_FOUND, ResultContent, ResultSurface};
use crate::tools::frame_from_image_bytes;
use crate::upload::SelectedFile;
use tracing::{debug, info, warn};

/// Result of one frame tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// No camera attached yet
    Idle,
    /// Video has not buffered enough data; tick skipped
    NotReady,
    /// Frame sampled, nothing decoded; scan result untouched
    NoCode,
    /// Frame decoded and rendered
    Decoded(Payload),
    /// Copying the frame failed; treated as a skipped tick
    CaptureFailed(CaptureError),
}

/// Result of handling a file selection
#[derive(Debug)]
pub enum UploadOutcome {
    /// Selection was empty; nothing read or decoded
    Empty,
    /// Payload rendered as a link
    Decoded(Payload),
    /// "No QR code found." rendered
    NotFound,
    /// Read or image decode failed; nothing rendered
    Failed(UploadError),
}

/// Scan UI controller
pub struct ScanController<D, R, V> {
    decoder: D,
    scan_result: R,
    upload_result: R,
    video: Option<V>,
    canvas: FrameBuffer,
    config: ScanConfig,
}

impl<D, R, V> ScanController<D, R, V>
where
    D: Decoder,
    R: ResultSurface,
    V: VideoSource,
{
    /// Create a controller with injected decoder and result containers
    pub fn new(decoder: D, scan_result: R, upload_result: R) -> Self {
        Self {
            decoder,
            scan_result,
            upload_result,
            video: None,
            canvas: FrameBuffer::default(),
            config: ScanConfig::default(),
        }
    }

    /// Replace the scan settings
    pub fn with_config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Scan settings in use
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Acquire a camera stream and attach it
    ///
    /// On failure the scan result shows `Camera error: <reason>`. There is
    /// no retry and no fallback camera.
    pub fn start_camera<P>(&mut self, provider: &mut P) -> Result<(), CameraError>
    where
        P: CameraProvider<Source = V>,
    {
        let constraints = self.config.camera_constraints();
        info!(facing = %constraints.facing, "requesting camera");
        let result = provider.acquire(&constraints);
        self.attach_camera(result)
    }

    /// Attach the outcome of a camera request made elsewhere
    ///
    /// Used when acquisition is asynchronous (the browser permission prompt).
    pub fn attach_camera(&mut self, result: Result<V, CameraError>) -> Result<(), CameraError> {
        match result {
            Ok(source) => {
                info!("camera attached");
                self.video = Some(source);
                Ok(())
            }
            Err(err) => {
                warn!(reason = err.reason(), "camera acquisition failed");
                self.scan_result
                    .render(&ResultContent::message(err.user_message()));
                Err(err)
            }
        }
    }

    /// True once a camera stream is attached
    pub fn has_camera(&self) -> bool {
        self.video.is_some()
    }

    /// Attached video source
    pub fn video(&self) -> Option<&V> {
        self.video.as_ref()
    }

    /// Sample the current video frame and try to decode it
    ///
    /// Never blocks. A tick without enough buffered video is skipped; a tick
    /// that decodes nothing leaves the previous result in place.
    pub fn tick(&mut self) -> TickOutcome {
        let Some(video) = self.video.as_mut() else {
            return TickOutcome::Idle;
        };
        if video.ready_state() != ReadyState::HaveEnoughData {
            return TickOutcome::NotReady;
        }

        let (width, height) = video.frame_size();
        if width == 0 || height == 0 {
            warn!("video reported a zero-sized frame");
            return TickOutcome::CaptureFailed(CaptureError::EmptyFrame);
        }
        self.canvas.resize(width, height);
        if let Err(err) = video.draw_frame(&mut self.canvas) {
            warn!(%err, "frame capture failed");
            return TickOutcome::CaptureFailed(err);
        }

        match self.decoder.decode(&self.canvas) {
            Some(payload) => {
                info!(payload = payload.as_str(), "camera frame decoded");
                self.scan_result.render(&ResultContent::link(payload.clone()));
                TickOutcome::Decoded(payload)
            }
            None => {
                debug!(width, height, "no code in frame");
                TickOutcome::NoCode
            }
        }
    }

    /// Handle a file selection
    ///
    /// Only the first file is used. An empty selection does nothing. Read and
    /// image decode failures are logged and returned but never rendered.
    pub fn handle_file_selection<F, I>(&mut self, files: I) -> UploadOutcome
    where
        F: SelectedFile,
        I: IntoIterator<Item = F>,
    {
        let Some(mut file) = files.into_iter().next() else {
            debug!("empty file selection");
            return UploadOutcome::Empty;
        };

        let bytes = match file.read() {
            Ok(bytes) => bytes,
            Err(err) => {
                debug!(file = file.name(), %err, "failed to read selected file");
                return UploadOutcome::Failed(UploadError::Read(err));
            }
        };
        debug!(file = file.name(), bytes = bytes.len(), "selected file read");
        self.handle_image_bytes(&bytes)
    }

    /// Decode an already-read image file and render the upload result
    pub fn handle_image_bytes(&mut self, bytes: &[u8]) -> UploadOutcome {
        let frame = match frame_from_image_bytes(bytes, self.config.max_dim) {
            Ok(frame) => frame,
            Err(err) => {
                debug!(%err, "selected file is not a decodable image");
                return UploadOutcome::Failed(UploadError::Image(err));
            }
        };
        self.canvas = frame;

        match self.decoder.decode(&self.canvas) {
            Some(payload) => {
                info!(payload = payload.as_str(), "uploaded image decoded");
                self.upload_result
                    .render(&ResultContent::link(payload.clone()));
                UploadOutcome::Decoded(payload)
            }
            None => {
                debug!("no QR code in uploaded image");
                self.upload_result
                    .render(&ResultContent::message(NO_CODE_FOUND));
                UploadOutcome::NotFound
            }
        }
    }

    /// Container written by the camera path
    pub fn scan_result(&self) -> &R {
        &self.scan_result
    }

    /// Container written by the upload path
    pub fn upload_result(&self) -> &R {
        &self.upload_result
    }

    /// Offscreen raster holding the last capture
    pub fn canvas(&self) -> &FrameBuffer {
        &self.canvas
    }

    /// Decode function in use
    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}
