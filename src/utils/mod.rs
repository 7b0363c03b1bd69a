//! Utility functions shared by the scan paths
//!
//! - Grayscale conversion (RGBA to luminance) for the decoder
//! - HTML escaping for rendered results

pub mod grayscale;
pub mod html;
