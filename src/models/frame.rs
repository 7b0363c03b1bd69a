/// Bytes per RGBA sample
pub const RGBA_CHANNELS: usize = 4;

/// Offscreen RGBA raster surface
///
/// Plays the role of the hidden canvas: every capture resizes it to the
/// source's native resolution and overwrites its samples. The decoder reads
/// from it and nothing else keeps a reference to the pixels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameBuffer {
    /// Create a zeroed (fully transparent black) frame
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0u8; Self::byte_len(width, height)],
        }
    }

    /// Wrap existing RGBA samples
    ///
    /// Returns `None` when `data` is not exactly `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != Self::byte_len(width, height) {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Build a frame from grayscale samples (one byte per pixel)
    pub fn from_luma(width: u32, height: u32, luma: &[u8]) -> Option<Self> {
        if luma.len() != width as usize * height as usize {
            return None;
        }
        let mut data = Vec::with_capacity(luma.len() * RGBA_CHANNELS);
        for &v in luma {
            data.extend_from_slice(&[v, v, v, 255]);
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * RGBA_CHANNELS
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA samples, row-major
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable RGBA samples, for sources that draw directly into the surface
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// True when the frame holds no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Resize the surface, keeping the allocation when possible
    ///
    /// Like assigning `canvas.width`, this clears the previous contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(Self::byte_len(width, height), 0);
    }

    /// Resize to `width`x`height` and copy `rgba` into the surface
    ///
    /// Returns `false` (leaving the surface resized but blank) when the sample
    /// count does not match the dimensions.
    pub fn draw_rgba(&mut self, width: u32, height: u32, rgba: &[u8]) -> bool {
        self.resize(width, height);
        if rgba.len() != self.data.len() {
            return false;
        }
        self.data.copy_from_slice(rgba);
        true
    }

    /// RGBA sample at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * RGBA_CHANNELS;
        let px = &self.data[idx..idx + RGBA_CHANNELS];
        Some([px[0], px[1], px[2], px[3]])
    }
}
