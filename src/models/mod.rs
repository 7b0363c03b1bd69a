pub mod frame;
pub mod payload;

pub use frame::{FrameBuffer, RGBA_CHANNELS};
pub use payload::Payload;
