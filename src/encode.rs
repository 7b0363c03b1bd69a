//! Render payloads as scannable QR rasters
//!
//! Used to produce pay-link codes and to feed known frames into the scan
//! paths.

use crate::error::EncodeError;
use crate::models::{FrameBuffer, Payload};
use qrcode::{Color, QrCode};

/// Light modules around the symbol, as the QR standard requires
pub const QUIET_ZONE: u32 = 4;

/// Render `payload` as black-on-white RGBA, `scale` pixels per module
pub fn render_payload(payload: &Payload, scale: u32) -> Result<FrameBuffer, EncodeError> {
    if scale == 0 {
        return Err(EncodeError::ZeroScale);
    }
    let code = QrCode::new(payload.as_str().as_bytes())?;
    let modules = code.width() as u32;
    let colors = code.to_colors();

    let side = (modules + 2 * QUIET_ZONE) * scale;
    let mut luma = vec![255u8; side as usize * side as usize];
    for (i, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = i as u32 % modules + QUIET_ZONE;
        let my = i as u32 / modules + QUIET_ZONE;
        for y in my * scale..(my + 1) * scale {
            let row = y as usize * side as usize;
            for x in mx * scale..(mx + 1) * scale {
                luma[row + x as usize] = 0;
            }
        }
    }

    FrameBuffer::from_luma(side, side, &luma).ok_or(EncodeError::ZeroScale)
}
