//! The decode function seam
//!
//! The scan paths never look inside a decoder: they hand over a raster of raw
//! RGBA samples and get back a payload or nothing.

/// Grid-detecting decoder backed by `rqrr`
pub mod grid;

pub use grid::RqrrDecoder;

use crate::models::{FrameBuffer, Payload};

/// Opaque routine turning raw pixel samples into a payload
pub trait Decoder {
    /// Decode the first QR code found in `frame`, if any
    fn decode(&self, frame: &FrameBuffer) -> Option<Payload>;
}

impl<F> Decoder for F
where
    F: Fn(&FrameBuffer) -> Option<Payload>,
{
    fn decode(&self, frame: &FrameBuffer) -> Option<Payload> {
        self(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_is_a_decoder() {
        let decoder = |frame: &FrameBuffer| Payload::new(format!("{}x{}", frame.width(), frame.height()));
        let frame = FrameBuffer::new(4, 3);
        assert_eq!(decoder.decode(&frame).unwrap().as_str(), "4x3");
    }

    #[test]
    fn test_trait_object_decoder() {
        let never = |_: &FrameBuffer| -> Option<Payload> { None };
        let decoder: &dyn Decoder = &never;
        assert!(decoder.decode(&FrameBuffer::new(1, 1)).is_none());
    }
}
