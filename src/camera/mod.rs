//! Camera access for the dual-camera session.
//!
//! This module provides:
//! - The [`CameraHandle`] capability trait the session drives
//! - [`SyntheticCamera`], a test-pattern camera that needs no hardware
//! - [`ScriptedCamera`], a deterministic fake with scripted frames and failures
//! - `NativeCamera`, real devices through nokhwa (`native` feature)

mod handle;
mod scripted;
mod synthetic;
mod types;

#[cfg(feature = "native")]
pub mod native;

pub use handle::CameraHandle;
pub use scripted::ScriptedCamera;
pub use synthetic::{SyntheticCamera, DEFAULT_FRAME_INTERVAL};
pub use types::{CameraConfig, CameraError, CameraId, CameraInfo, Frame, Resolution};
