//! Error taxonomy for the session controller.
//!
//! Only `InvalidOptions`, `HardwareOpenFailure` and `Terminal` end a
//! session; everything else is reported to the operator and the control
//! loop carries on.

use std::fmt;

use crate::camera::{CameraError, CameraId};
use crate::capture::CaptureError;

/// A capture that failed to persist.
#[derive(Debug)]
pub struct WriteFailure {
    pub camera: CameraId,
    pub source: CaptureError,
}

impl fmt::Display for WriteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.camera, self.source)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The options enumeration breaks an invariant. Fatal, nothing opened.
    #[error("invalid camera options: {0}")]
    InvalidOptions(String),

    /// A camera could not be opened or started. Fatal.
    #[error("{camera} failed to open: {source}")]
    HardwareOpenFailure {
        camera: CameraId,
        #[source]
        source: CameraError,
    },

    /// The device refused a reconfiguration; state was rolled back.
    #[error("{camera} rejected the change: {source}")]
    HardwareRejected {
        camera: CameraId,
        #[source]
        source: CameraError,
    },

    /// No frame has ever been received from the camera.
    #[error("{camera} has not produced a frame yet")]
    FrameUnavailable { camera: CameraId },

    /// One or more captures failed to persist. Lists only the failures.
    #[error("capture failed for {}", join_failures(.0))]
    WriteError(Vec<WriteFailure>),

    /// The display or keyboard stopped working. Fatal.
    #[error("terminal I/O failed: {0}")]
    Terminal(#[from] std::io::Error),
}

impl SessionError {
    /// Whether the control loop may continue after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            SessionError::InvalidOptions(_)
                | SessionError::HardwareOpenFailure { .. }
                | SessionError::Terminal(_)
        )
    }

    /// Cameras whose captures failed, for `WriteError`.
    pub fn failed_cameras(&self) -> Vec<CameraId> {
        match self {
            SessionError::WriteError(failures) => failures.iter().map(|f| f.camera).collect(),
            _ => Vec::new(),
        }
    }
}

fn join_failures(failures: &[WriteFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_write_error_names_failed_camera_only() {
        let err = SessionError::WriteError(vec![WriteFailure {
            camera: CameraId::Two,
            source: CaptureError::InvalidFrame {
                path: PathBuf::from("camera_captures/camera2.png"),
            },
        }]);
        let msg = err.to_string();
        assert!(msg.contains("Camera 2"));
        assert!(!msg.contains("Camera 1"));
        assert_eq!(err.failed_cameras(), vec![CameraId::Two]);
    }

    #[test]
    fn test_recoverability() {
        let open = SessionError::HardwareOpenFailure {
            camera: CameraId::One,
            source: CameraError::NoDevices,
        };
        let rejected = SessionError::HardwareRejected {
            camera: CameraId::One,
            source: CameraError::Rejected("busy".to_string()),
        };
        assert!(!open.is_recoverable());
        assert!(!SessionError::InvalidOptions("empty".to_string()).is_recoverable());
        assert!(rejected.is_recoverable());
        assert!(SessionError::FrameUnavailable { camera: CameraId::Two }.is_recoverable());
    }

    #[test]
    fn test_open_failure_display() {
        let err = SessionError::HardwareOpenFailure {
            camera: CameraId::Two,
            source: CameraError::DeviceNotFound(3),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Camera 2 failed to open"));
        assert!(msg.contains("3"));
    }
}
