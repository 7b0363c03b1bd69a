//! RGBA to luminance conversion for the decoder
//!
//! Y = 0.299*R + 0.587*G + 0.114*B, using integer arithmetic:
//! Y = (76*R + 150*G + 29*B) >> 8. Alpha is ignored, matching what a canvas
//! `getImageData` consumer sees for opaque video frames.

use rayon::prelude::*;

const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

/// Frames at or above this many pixels are converted row-parallel
pub const PARALLEL_THRESHOLD: usize = 640 * 480;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert RGBA samples to grayscale
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    rgba_to_grayscale_with_buffer(rgba, width, height, &mut gray);
    gray
}

/// Convert RGBA to grayscale into a pre-allocated buffer
///
/// # Returns
/// Number of pixels written (`width * height`, clamped to what both buffers hold)
pub fn rgba_to_grayscale_with_buffer(
    rgba: &[u8],
    width: usize,
    height: usize,
    output: &mut [u8],
) -> usize {
    let pixel_count = (width * height).min(output.len()).min(rgba.len() / 4);
    for (out, px) in output[..pixel_count]
        .iter_mut()
        .zip(rgba.chunks_exact(4))
    {
        *out = luma(px[0], px[1], px[2]);
    }
    pixel_count
}

/// Convert RGBA to grayscale, processing rows in parallel
pub fn rgba_to_grayscale_parallel(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }

    gray.par_chunks_mut(width)
        .zip(rgba.par_chunks(width * 4))
        .for_each(|(row, src)| {
            for (out, px) in row.iter_mut().zip(src.chunks_exact(4)) {
                *out = luma(px[0], px[1], px[2]);
            }
        });

    gray
}

/// Pick the serial or parallel conversion based on frame size
pub fn rgba_to_grayscale_auto(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    if width * height >= PARALLEL_THRESHOLD {
        rgba_to_grayscale_parallel(rgba, width, height)
    } else {
        rgba_to_grayscale(rgba, width, height)
    }
}
