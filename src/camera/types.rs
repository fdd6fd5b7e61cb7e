//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

use serde::Serialize;

/// One of the two cameras driven by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraId {
    One,
    Two,
}

impl CameraId {
    /// Both cameras, in display order (left, right).
    pub const ALL: [CameraId; 2] = [CameraId::One, CameraId::Two];

    /// Slot index (0 for camera one, 1 for camera two).
    pub fn index(self) -> usize {
        match self {
            CameraId::One => 0,
            CameraId::Two => 1,
        }
    }

    /// Label used in capture file names.
    pub fn label(self) -> &'static str {
        match self {
            CameraId::One => "camera1",
            CameraId::Two => "camera2",
        }
    }
}

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Camera {}", self.index() + 1)
    }
}

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Camera resolution in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Full hardware configuration pushed to a camera in one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraConfig {
    pub resolution: Resolution,
    /// Exposure compensation level
    pub exposure: i32,
    /// Brightness offset
    pub brightness: i32,
}

/// A captured camera frame (RGB, 3 bytes per pixel).
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in RGB format
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Camera that produced the frame
    pub camera: CameraId,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

/// Software gain added per exposure compensation step.
pub const EXPOSURE_GAIN_PER_STEP: f32 = 0.1;

impl Frame {
    /// Bytes per pixel (always RGB).
    pub const BYTES_PER_PIXEL: usize = 3;

    /// Create a frame filled with a single color.
    pub fn solid(camera: CameraId, width: u32, height: u32, rgb: [u8; 3]) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * Self::BYTES_PER_PIXEL)
            .collect();
        Self {
            data,
            width,
            height,
            camera,
            timestamp: Instant::now(),
        }
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Whether the buffer length matches the frame dimensions.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == self.width as usize * self.height as usize * Self::BYTES_PER_PIXEL
    }

    /// Scale every channel by the exposure gain, then add the brightness
    /// offset, saturating at 0 and 255.
    pub fn apply_levels(&mut self, exposure: i32, brightness: i32) {
        if exposure == 0 && brightness == 0 {
            return;
        }
        let gain = 1.0 + exposure as f32 * EXPOSURE_GAIN_PER_STEP;
        let offset = brightness as f32;
        for channel in self.data.iter_mut() {
            *channel = (*channel as f32 * gain + offset).round().clamp(0.0, 255.0) as u8;
        }
    }

    /// RGB value at (x, y). Callers must stay in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * Self::BYTES_PER_PIXEL;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug)]
pub enum CameraError {
    /// No cameras found on the system
    NoDevices,
    /// Failed to query camera devices
    QueryFailed(String),
    /// Failed to open camera
    OpenFailed(String),
    /// Camera device not found at specified index
    DeviceNotFound(u32),
    /// Failed to start video stream
    StreamFailed(String),
    /// The device refused a configuration change
    Rejected(String),
    /// No new frame is ready yet
    FrameUnavailable,
    /// Capture thread is already running
    AlreadyRunning,
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::NoDevices => write!(f, "No cameras found"),
            CameraError::QueryFailed(msg) => write!(f, "Failed to query cameras: {}", msg),
            CameraError::OpenFailed(msg) => write!(f, "Failed to open camera: {}", msg),
            CameraError::DeviceNotFound(index) => {
                write!(
                    f,
                    "Camera device {} not found. Run 'list-cameras' to see available devices",
                    index
                )
            }
            CameraError::StreamFailed(msg) => write!(f, "Failed to start camera stream: {}", msg),
            CameraError::Rejected(msg) => write!(f, "Camera rejected configuration: {}", msg),
            CameraError::FrameUnavailable => write!(f, "No frame available"),
            CameraError::AlreadyRunning => write!(f, "Capture thread is already running"),
        }
    }
}

impl std::error::Error for CameraError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_id_index() {
        assert_eq!(CameraId::One.index(), 0);
        assert_eq!(CameraId::Two.index(), 1);
    }

    #[test]
    fn test_camera_id_display_and_label() {
        assert_eq!(format!("{}", CameraId::One), "Camera 1");
        assert_eq!(CameraId::Two.label(), "camera2");
    }

    #[test]
    fn test_camera_info_display() {
        let info = CameraInfo {
            index: 0,
            name: "Test Camera".to_string(),
            description: "Built-in".to_string(),
        };
        assert_eq!(format!("{}", info), "[0] Test Camera (Built-in)");
    }

    #[test]
    fn test_resolution_display() {
        assert_eq!(Resolution::new(1280, 720).to_string(), "1280x720");
    }

    #[test]
    fn test_apply_levels_offsets_and_saturates() {
        let mut frame = Frame::solid(CameraId::One, 2, 1, [10, 128, 250]);
        frame.apply_levels(0, 20);
        assert_eq!(frame.pixel(0, 0), [30, 148, 255]);

        frame.apply_levels(0, -40);
        assert_eq!(frame.pixel(1, 0), [0, 108, 215]);
    }

    #[test]
    fn test_apply_levels_exposure_gain() {
        let mut frame = Frame::solid(CameraId::Two, 1, 1, [100, 200, 0]);
        frame.apply_levels(2, 0);
        assert_eq!(frame.pixel(0, 0), [120, 240, 0]);

        let mut darker = Frame::solid(CameraId::Two, 1, 1, [100, 200, 0]);
        darker.apply_levels(-8, 0);
        assert_eq!(darker.pixel(0, 0), [20, 40, 0]);
    }

    #[test]
    fn test_apply_levels_neutral_is_identity() {
        let mut frame = Frame::solid(CameraId::One, 3, 2, [7, 77, 177]);
        let before = frame.data.clone();
        frame.apply_levels(0, 0);
        assert_eq!(frame.data, before);
    }

    #[test]
    fn test_solid_frame() {
        let frame = Frame::solid(CameraId::Two, 2, 1, [1, 2, 3]);
        assert_eq!(frame.data, vec![1, 2, 3, 1, 2, 3]);
        assert!(frame.is_consistent());
        assert_eq!(frame.pixel(1, 0), [1, 2, 3]);
        assert_eq!(frame.camera, CameraId::Two);
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(format!("{}", CameraError::NoDevices), "No cameras found");
        assert_eq!(
            format!("{}", CameraError::OpenFailed("test".to_string())),
            "Failed to open camera: test"
        );
        assert!(format!("{}", CameraError::DeviceNotFound(5)).contains("5"));
        assert_eq!(
            format!("{}", CameraError::Rejected("busy".to_string())),
            "Camera rejected configuration: busy"
        );
    }
}
