//! Error types for still-image capture.

use std::path::PathBuf;

/// Errors that can occur while persisting a captured frame.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The output directory could not be created
    #[error("cannot create capture directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Encoding or writing the image failed
    #[error("cannot write '{}': {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// The frame buffer does not match its dimensions
    #[error("frame for '{}' has an inconsistent buffer", path.display())]
    InvalidFrame { path: PathBuf },
}
