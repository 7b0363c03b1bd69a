use crate::camera::{CameraConstraints, FacingMode};
use std::time::Duration;

/// Default tick rate, one tick per display frame
pub const DEFAULT_FPS: u32 = 60;

fn parse_env_u32(name: &str) -> Option<u32> {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
}

fn nonzero(value: Option<u32>) -> Option<u32> {
    value.filter(|&v| v != 0)
}

/// Frame interval for a tick rate; zero falls back to [`DEFAULT_FPS`]
pub fn frame_interval_for_fps(fps: u32) -> Duration {
    let fps = if fps == 0 { DEFAULT_FPS } else { fps };
    Duration::from_nanos(1_000_000_000 / fps as u64)
}

/// Scan settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanConfig {
    /// Camera to request
    pub facing: FacingMode,
    /// Time between frame ticks
    pub frame_interval: Duration,
    /// Downscale uploads whose longest side exceeds this
    pub max_dim: Option<u32>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            facing: FacingMode::Environment,
            frame_interval: frame_interval_for_fps(DEFAULT_FPS),
            max_dim: None,
        }
    }
}

impl ScanConfig {
    /// Read `QR_SCAN_FACING`, `QR_SCAN_FPS` and `QR_MAX_DIM`
    ///
    /// Missing, unparsable or zero values keep the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let facing = std::env::var("QR_SCAN_FACING")
            .ok()
            .and_then(|v| v.parse::<FacingMode>().ok())
            .unwrap_or(defaults.facing);
        let frame_interval = nonzero(parse_env_u32("QR_SCAN_FPS"))
            .map(frame_interval_for_fps)
            .unwrap_or(defaults.frame_interval);
        let max_dim = nonzero(parse_env_u32("QR_MAX_DIM"));

        Self {
            facing,
            frame_interval,
            max_dim,
        }
    }

    /// Constraints for the camera request
    pub fn camera_constraints(&self) -> CameraConstraints {
        CameraConstraints {
            facing: self.facing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScanConfig::default();
        assert_eq!(config.facing, FacingMode::Environment);
        assert_eq!(config.max_dim, None);
        assert_eq!(config.camera_constraints().facing, FacingMode::Environment);
    }

    #[test]
    fn test_frame_interval() {
        assert_eq!(frame_interval_for_fps(10), Duration::from_millis(100));
        assert_eq!(frame_interval_for_fps(0), frame_interval_for_fps(DEFAULT_FPS));
    }

    #[test]
    fn test_nonzero_filter() {
        assert_eq!(nonzero(Some(0)), None);
        assert_eq!(nonzero(Some(5)), Some(5));
        assert_eq!(nonzero(None), None);
    }
}
