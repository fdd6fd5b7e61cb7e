//! Capability boundary between the session and a camera driver.

use super::types::{CameraConfig, CameraError, Frame};

/// A single physical (or simulated) camera.
///
/// Implementations own whatever acquisition machinery they need. The
/// session only ever calls these methods from its control thread, and
/// `latest_frame` must return immediately.
pub trait CameraHandle {
    /// Start streaming frames.
    fn start(&mut self) -> Result<(), CameraError>;

    /// Stop streaming and release the device. Must be safe to call on a
    /// handle that never started or is in an error state.
    fn stop(&mut self);

    /// Apply a complete configuration. On error the device is expected to
    /// keep its previous configuration.
    fn apply_config(&mut self, config: &CameraConfig) -> Result<(), CameraError>;

    /// The most recent frame, or `CameraError::FrameUnavailable` when no new
    /// frame is ready. Never blocks on camera I/O.
    fn latest_frame(&mut self) -> Result<Frame, CameraError>;
}

impl<T: CameraHandle + ?Sized> CameraHandle for Box<T> {
    fn start(&mut self) -> Result<(), CameraError> {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn apply_config(&mut self, config: &CameraConfig) -> Result<(), CameraError> {
        (**self).apply_config(config)
    }

    fn latest_frame(&mut self) -> Result<Frame, CameraError> {
        (**self).latest_frame()
    }
}
