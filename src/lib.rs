//! qr_scan - QR scan front end
//!
//! Wires two image sources to a QR decode function and renders what it finds
//! as a clickable link:
//!
//! - a live camera feed, sampled once per frame tick
//! - a user-selected image file
//!
//! Decoding sits behind the [`Decoder`] trait; [`RqrrDecoder`] is the default.
//! On `wasm32` the [`web`] module binds the controller to page elements.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Camera acquisition and live video sources
pub mod camera;
/// Scan UI controller driving both scan paths
pub mod controller;
/// Scan settings from the environment
pub mod config;
/// The decode function seam
pub mod decoder;
/// Payload to QR raster rendering
pub mod encode;
/// Error types
pub mod error;
/// Core data structures (FrameBuffer, Payload)
pub mod models;
/// Result containers and escaped rendering
pub mod render;
/// Frame-tick loop and stop handle
pub mod scheduler;
/// Image loading and dataset iteration helpers
pub mod tools;
/// User-selected files
pub mod upload;
/// Utility functions (grayscale, HTML escaping)
pub mod utils;
/// Browser bindings
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use camera::{CameraConstraints, CameraProvider, FacingMode, FrameReplayCamera, ReadyState, VideoSource};
pub use config::ScanConfig;
pub use controller::{ScanController, TickOutcome, UploadOutcome};
pub use decoder::{Decoder, RqrrDecoder};
pub use error::{CameraError, CaptureError, EncodeError, UploadError};
pub use models::{FrameBuffer, Payload};
pub use render::{NO_CODE_FOUND, ResultContent, ResultPanel, ResultSurface};
pub use scheduler::{FrameClock, FrameLoop, IntervalClock, StopHandle};
pub use upload::{BytesFile, PathFile, SelectedFile};

/// Decode a QR code from raw RGBA samples with the default decoder
///
/// # Arguments
/// * `rgba` - Raw RGBA bytes (4 bytes per pixel)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Returns
/// The first decoded payload, or `None` when no code is found or the buffer
/// does not match the dimensions
pub fn scan_rgba(rgba: &[u8], width: u32, height: u32) -> Option<Payload> {
    let frame = FrameBuffer::from_rgba(width, height, rgba.to_vec())?;
    RqrrDecoder::new().decode(&frame)
}
