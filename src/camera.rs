//! Camera acquisition and live video sources

use crate::error::{CameraError, CaptureError};
use crate::models::FrameBuffer;
use crate::tools::{collect_images, load_rgba};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, warn};

/// How much media data a video element has buffered
///
/// Mirrors `HTMLMediaElement.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    /// No information about the media
    HaveNothing = 0,
    /// Dimensions known, no frame data
    HaveMetadata = 1,
    /// Data for the current position only
    HaveCurrentData = 2,
    /// Current position plus a little ahead
    HaveFutureData = 3,
    /// Enough data to sample frames
    HaveEnoughData = 4,
}

impl ReadyState {
    /// Map the numeric DOM value; unknown values count as `HaveNothing`
    pub fn from_u16(value: u16) -> Self {
        match value {
            1 => ReadyState::HaveMetadata,
            2 => ReadyState::HaveCurrentData,
            3 => ReadyState::HaveFutureData,
            4 => ReadyState::HaveEnoughData,
            _ => ReadyState::HaveNothing,
        }
    }
}

/// Which camera to ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    /// Rear-facing camera
    #[default]
    Environment,
    /// Front-facing camera
    User,
}

impl FacingMode {
    /// Value for the `facingMode` media constraint
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::Environment => "environment",
            FacingMode::User => "user",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "environment" | "rear" | "back" => Ok(FacingMode::Environment),
            "user" | "front" => Ok(FacingMode::User),
            other => Err(format!("unknown facing mode: {other}")),
        }
    }
}

/// Constraints passed with a camera request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraConstraints {
    /// Preferred camera; a hint, not a requirement
    pub facing: FacingMode,
}

/// A live video feed that can be sampled frame by frame
pub trait VideoSource {
    /// Current buffering state
    fn ready_state(&self) -> ReadyState;

    /// Native resolution of the current frame
    fn frame_size(&self) -> (u32, u32);

    /// Copy the current frame into `target`
    ///
    /// `target` has already been resized to [`VideoSource::frame_size`].
    fn draw_frame(&mut self, target: &mut FrameBuffer) -> Result<(), CaptureError>;
}

impl<V: VideoSource + ?Sized> VideoSource for Box<V> {
    fn ready_state(&self) -> ReadyState {
        (**self).ready_state()
    }

    fn frame_size(&self) -> (u32, u32) {
        (**self).frame_size()
    }

    fn draw_frame(&mut self, target: &mut FrameBuffer) -> Result<(), CaptureError> {
        (**self).draw_frame(target)
    }
}

/// Permission-gated access to a camera device
pub trait CameraProvider {
    /// Stream type handed out on success
    type Source: VideoSource;

    /// Request a camera stream
    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<Self::Source, CameraError>;
}

/// Camera provider that plays back pre-recorded frames
///
/// Stands in for a device on targets without a media stack: frames come from
/// images in a directory (sorted by path) or from memory.
#[derive(Debug, Clone)]
pub enum FrameReplayCamera {
    /// Load every image under a directory at acquisition time
    Directory {
        /// Directory holding the frames
        root: PathBuf,
        /// Downscale frames whose longest side exceeds this
        max_dim: Option<u32>,
        /// Start over after the last frame
        repeat: bool,
    },
    /// Frames already in memory
    Frames {
        /// Frames in playback order
        frames: Vec<FrameBuffer>,
        /// Start over after the last frame
        repeat: bool,
    },
}

impl FrameReplayCamera {
    /// Replay images from `root`, looping forever
    pub fn from_dir<P: AsRef<Path>>(root: P) -> Self {
        FrameReplayCamera::Directory {
            root: root.as_ref().to_path_buf(),
            max_dim: None,
            repeat: true,
        }
    }

    /// Replay in-memory frames once
    pub fn from_frames(frames: Vec<FrameBuffer>) -> Self {
        FrameReplayCamera::Frames {
            frames,
            repeat: false,
        }
    }

    /// Set whether playback loops
    pub fn repeat(mut self, value: bool) -> Self {
        match &mut self {
            FrameReplayCamera::Directory { repeat, .. } | FrameReplayCamera::Frames { repeat, .. } => {
                *repeat = value
            }
        }
        self
    }

    /// Set the downscale limit for directory frames
    pub fn max_dim(mut self, value: Option<u32>) -> Self {
        if let FrameReplayCamera::Directory { max_dim, .. } = &mut self {
            *max_dim = value;
        }
        self
    }
}

impl CameraProvider for FrameReplayCamera {
    type Source = ReplaySource;

    fn acquire(&mut self, constraints: &CameraConstraints) -> Result<ReplaySource, CameraError> {
        debug!(facing = %constraints.facing, "replay camera ignores facing mode");
        match self {
            FrameReplayCamera::Frames { frames, repeat } => {
                if frames.is_empty() {
                    return Err(CameraError::Unavailable("no frames to replay".to_string()));
                }
                Ok(ReplaySource::new(frames.clone(), *repeat))
            }
            FrameReplayCamera::Directory {
                root,
                max_dim,
                repeat,
            } => {
                if !root.is_dir() {
                    return Err(CameraError::Unavailable(format!(
                        "frame directory not found: {}",
                        root.display()
                    )));
                }
                let mut paths = collect_images(root);
                paths.sort();
                let mut frames = Vec::with_capacity(paths.len());
                for path in paths {
                    match load_rgba(&path, *max_dim) {
                        Ok(frame) => frames.push(frame),
                        Err(err) => warn!(path = %path.display(), %err, "skipping unreadable frame"),
                    }
                }
                if frames.is_empty() {
                    return Err(CameraError::Unavailable(format!(
                        "no readable frames in {}",
                        root.display()
                    )));
                }
                Ok(ReplaySource::new(frames, *repeat))
            }
        }
    }
}

/// Video source handed out by [`FrameReplayCamera`]
#[derive(Debug, Clone)]
pub struct ReplaySource {
    frames: Vec<FrameBuffer>,
    next: usize,
    repeat: bool,
}

impl ReplaySource {
    fn new(frames: Vec<FrameBuffer>, repeat: bool) -> Self {
        Self {
            frames,
            next: 0,
            repeat,
        }
    }

    /// True once a non-looping replay has played every frame
    pub fn ended(&self) -> bool {
        !self.repeat && self.next >= self.frames.len()
    }
}

impl VideoSource for ReplaySource {
    fn ready_state(&self) -> ReadyState {
        if self.frames.is_empty() || self.ended() {
            ReadyState::HaveNothing
        } else {
            ReadyState::HaveEnoughData
        }
    }

    fn frame_size(&self) -> (u32, u32) {
        self.frames
            .get(self.next % self.frames.len().max(1))
            .map(|f| (f.width(), f.height()))
            .unwrap_or((0, 0))
    }

    fn draw_frame(&mut self, target: &mut FrameBuffer) -> Result<(), CaptureError> {
        if self.ready_state() != ReadyState::HaveEnoughData {
            return Err(CaptureError::NotReady);
        }
        let frame = &self.frames[self.next % self.frames.len()];
        if !target.draw_rgba(frame.width(), frame.height(), frame.data()) {
            return Err(CaptureError::Backend("frame size mismatch".to_string()));
        }
        self.next += 1;
        if self.repeat && self.next >= self.frames.len() {
            self.next = 0;
        }
        Ok(())
    }
}
