use super::Decoder;
use crate::models::{FrameBuffer, Payload};
use crate::utils::grayscale::rgba_to_grayscale_auto;
use tracing::debug;

/// Default decode function: luma conversion followed by `rqrr` grid detection
///
/// Returns the first detected grid that decodes to a non-empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    /// Create a decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode every QR code in the frame, in detection order
    pub fn decode_all(&self, frame: &FrameBuffer) -> Vec<Payload> {
        scan_grids(frame, |payloads| payloads.collect())
    }
}

impl Decoder for RqrrDecoder {
    fn decode(&self, frame: &FrameBuffer) -> Option<Payload> {
        // grids are decoded lazily; stop at the first that yields a payload
        scan_grids(frame, |payloads| payloads.next())
    }
}

/// Detect grids in `frame` and hand `consume` a lazy iterator over the
/// payloads they decode to
fn scan_grids<T>(
    frame: &FrameBuffer,
    consume: impl FnOnce(&mut dyn Iterator<Item = Payload>) -> T,
) -> T {
    if frame.is_empty() {
        return consume(&mut std::iter::empty::<Payload>());
    }
    let (width, height) = (frame.width() as usize, frame.height() as usize);
    let gray = rgba_to_grayscale_auto(frame.data(), width, height);

    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| gray[y * width + x]);
    let grids = prepared.detect_grids();
    debug!(grids = grids.len(), width, height, "grid detection");

    let mut payloads = grids.iter().filter_map(|grid| payload_from(grid.decode()));
    consume(&mut payloads)
}

fn payload_from<M>(result: Result<(M, String), rqrr::DeQRError>) -> Option<Payload> {
    match result {
        Ok((_meta, content)) => Payload::new(content),
        Err(err) => {
            debug!(?err, "grid failed to decode");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::render_payload;

    fn side_by_side(left: &FrameBuffer, right: &FrameBuffer) -> FrameBuffer {
        assert_eq!(left.height(), right.height());
        let (lw, rw) = (left.width() as usize * 4, right.width() as usize * 4);
        let mut data = Vec::with_capacity(left.data().len() + right.data().len());
        for y in 0..left.height() as usize {
            data.extend_from_slice(&left.data()[y * lw..(y + 1) * lw]);
            data.extend_from_slice(&right.data()[y * rw..(y + 1) * rw]);
        }
        FrameBuffer::from_rgba(left.width() + right.width(), left.height(), data).unwrap()
    }

    #[test]
    fn test_blank_frame_has_no_code() {
        let frame = FrameBuffer::from_luma(64, 64, &[255u8; 64 * 64]).unwrap();
        assert!(RqrrDecoder::new().decode(&frame).is_none());
        assert!(RqrrDecoder::new().decode_all(&frame).is_empty());
    }

    #[test]
    fn test_empty_frame_has_no_code() {
        assert!(RqrrDecoder::new().decode(&FrameBuffer::default()).is_none());
    }

    #[test]
    fn test_decode_returns_first_of_several_codes() {
        let left = render_payload(&Payload::new("LEFT").unwrap(), 4).unwrap();
        let right = render_payload(&Payload::new("RIGHT").unwrap(), 4).unwrap();
        let frame = side_by_side(&left, &right);
        let decoder = RqrrDecoder::new();

        let all = decoder.decode_all(&frame);
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|p| p.as_str() == "LEFT"));
        assert!(all.iter().any(|p| p.as_str() == "RIGHT"));

        assert_eq!(decoder.decode(&frame).as_ref(), all.first());
    }
}
