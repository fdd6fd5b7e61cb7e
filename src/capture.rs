//! Still-image capture to timestamped PNG files.
//!
//! Files are named `<label>_<YYYYmmdd_HHMMSS_mmm>.png`. Millisecond
//! timestamps plus the camera label keep names unique for a single
//! operator, including the two files written by one save-both command.

mod errors;

pub use errors::CaptureError;

use chrono::{DateTime, Local};
use image::{ImageBuffer, Rgb};
use std::path::{Path, PathBuf};

use crate::camera::Frame;

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "camera_captures";

/// Timestamp layout used in capture file names (millisecond granularity).
const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

/// Destination for captured frames.
pub trait FrameSink {
    /// Persist `frame` under a name derived from `label`, returning the path.
    fn save(&self, frame: &Frame, label: &str) -> Result<PathBuf, CaptureError>;
}

/// Writes PNG files into a fixed directory, creating it when absent.
#[derive(Debug, Clone)]
pub struct CaptureWriter {
    output_dir: PathBuf,
}

impl Default for CaptureWriter {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_DIR)
    }
}

impl CaptureWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Ensure the output directory exists.
    pub fn ensure_dir_exists(&self) -> Result<(), CaptureError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| CaptureError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })
    }

    /// Path a capture taken at `at` would be written to.
    pub fn path_for(&self, label: &str, at: DateTime<Local>) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.png", label, at.format(FILE_TIMESTAMP_FORMAT)))
    }

    /// Write `frame` using an explicit timestamp.
    pub fn save_at(
        &self,
        frame: &Frame,
        label: &str,
        at: DateTime<Local>,
    ) -> Result<PathBuf, CaptureError> {
        // Recreated on every save in case it was removed mid-session
        self.ensure_dir_exists()?;
        let path = self.path_for(label, at);

        let image: ImageBuffer<Rgb<u8>, &[u8]> =
            ImageBuffer::from_raw(frame.width, frame.height, frame.data.as_slice())
                .filter(|_| frame.is_consistent())
                .ok_or_else(|| CaptureError::InvalidFrame { path: path.clone() })?;

        image
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|source| CaptureError::Encode {
                path: path.clone(),
                source,
            })?;

        log::info!("Image saved as {}", path.display());
        Ok(path)
    }
}

impl FrameSink for CaptureWriter {
    fn save(&self, frame: &Frame, label: &str) -> Result<PathBuf, CaptureError> {
        self.save_at(frame, label, Local::now())
    }
}

impl<T: FrameSink + ?Sized> FrameSink for Box<T> {
    fn save(&self, frame: &Frame, label: &str) -> Result<PathBuf, CaptureError> {
        (**self).save(frame, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraId;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
            + chrono::Duration::milliseconds(42)
    }

    #[test]
    fn test_path_for_encodes_label_and_millis() {
        let writer = CaptureWriter::new("camera_captures");
        let path = writer.path_for("camera1", fixed_time());
        assert_eq!(
            path,
            PathBuf::from("camera_captures/camera1_20240309_140507_042.png")
        );
    }

    #[test]
    fn test_same_instant_different_labels_do_not_collide() {
        let writer = CaptureWriter::default();
        assert_ne!(
            writer.path_for("camera1", fixed_time()),
            writer.path_for("camera2", fixed_time())
        );
    }

    #[test]
    fn test_save_creates_directory_and_png() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let writer = CaptureWriter::new(temp_dir.path().join("nested").join("captures"));
        let frame = Frame::solid(CameraId::One, 4, 3, [200, 10, 10]);

        let path = writer.save_at(&frame, "camera1", fixed_time()).unwrap();

        assert!(path.exists());
        let decoded = image::open(&path).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0).0, [200, 10, 10]);
    }

    #[test]
    fn test_save_fails_when_directory_is_a_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let blocker = temp_dir.path().join("captures");
        std::fs::write(&blocker, b"not a directory").unwrap();
        let writer = CaptureWriter::new(&blocker);
        let frame = Frame::solid(CameraId::Two, 2, 2, [0, 0, 0]);

        let err = writer.save(&frame, "camera2").unwrap_err();
        assert!(matches!(err, CaptureError::CreateDir { .. }));
    }

    #[test]
    fn test_save_rejects_inconsistent_frame() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let writer = CaptureWriter::new(temp_dir.path());
        let mut frame = Frame::solid(CameraId::One, 2, 2, [1, 2, 3]);
        frame.data.truncate(5);

        let err = writer.save(&frame, "camera1").unwrap_err();
        assert!(matches!(err, CaptureError::InvalidFrame { .. }));
    }
}
