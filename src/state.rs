//! Per-camera and per-session state.
//!
//! `CameraState` values only change through the adjustment methods, which
//! push the new configuration to the camera before committing it and roll
//! back when the device refuses.

use crate::camera::{CameraConfig, CameraHandle, CameraId};
use crate::error::SessionError;
use crate::options::CameraOptions;

/// Direction of a single exposure or brightness adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Up,
    Down,
}

impl Step {
    pub fn sign(self) -> i32 {
        match self {
            Step::Up => 1,
            Step::Down => -1,
        }
    }
}

/// Configuration record for one camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraState {
    camera: CameraId,
    resolution_index: usize,
    exposure: i32,
    brightness: i32,
}

impl CameraState {
    /// Fresh state: first resolution, exposure and brightness at their midpoints.
    pub fn new(camera: CameraId, options: &CameraOptions) -> Self {
        Self {
            camera,
            resolution_index: 0,
            exposure: options.default_exposure(),
            brightness: options.default_brightness(),
        }
    }

    pub fn camera(&self) -> CameraId {
        self.camera
    }

    pub fn resolution_index(&self) -> usize {
        self.resolution_index
    }

    pub fn exposure(&self) -> i32 {
        self.exposure
    }

    pub fn brightness(&self) -> i32 {
        self.brightness
    }

    /// The hardware configuration this state describes.
    pub fn config(&self, options: &CameraOptions) -> CameraConfig {
        CameraConfig {
            resolution: options.resolution(self.resolution_index),
            exposure: self.exposure,
            brightness: self.brightness,
        }
    }

    /// Move exposure one step, clamped to the configured range.
    ///
    /// Returns `Ok(false)` without touching the device when already at the
    /// bound in that direction.
    pub fn adjust_exposure<H>(
        &mut self,
        step: Step,
        options: &CameraOptions,
        handle: &mut H,
    ) -> Result<bool, SessionError>
    where
        H: CameraHandle + ?Sized,
    {
        let (min, max) = options.exposure_range;
        let target = (self.exposure + step.sign() * options.exposure_step).clamp(min, max);
        self.commit(options, handle, |state| {
            let changed = state.exposure != target;
            state.exposure = target;
            changed
        })
    }

    /// Move brightness one step, clamped to the configured range.
    pub fn adjust_brightness<H>(
        &mut self,
        step: Step,
        options: &CameraOptions,
        handle: &mut H,
    ) -> Result<bool, SessionError>
    where
        H: CameraHandle + ?Sized,
    {
        let (min, max) = options.brightness_range;
        let target = (self.brightness + step.sign() * options.brightness_step).clamp(min, max);
        self.commit(options, handle, |state| {
            let changed = state.brightness != target;
            state.brightness = target;
            changed
        })
    }

    /// Advance to the next resolution, wrapping after the last one.
    pub fn cycle_resolution<H>(
        &mut self,
        options: &CameraOptions,
        handle: &mut H,
    ) -> Result<bool, SessionError>
    where
        H: CameraHandle + ?Sized,
    {
        let next = (self.resolution_index + 1) % options.resolutions.len();
        self.commit(options, handle, |state| {
            state.resolution_index = next;
            true
        })
    }

    /// Apply `change`, push the result to the device, and restore the
    /// previous state if the device refuses it.
    fn commit<H, F>(
        &mut self,
        options: &CameraOptions,
        handle: &mut H,
        change: F,
    ) -> Result<bool, SessionError>
    where
        H: CameraHandle + ?Sized,
        F: FnOnce(&mut Self) -> bool,
    {
        let previous = *self;
        if !change(self) {
            return Ok(false);
        }
        match handle.apply_config(&self.config(options)) {
            Ok(()) => Ok(true),
            Err(source) => {
                *self = previous;
                Err(SessionError::HardwareRejected {
                    camera: self.camera,
                    source,
                })
            }
        }
    }
}

/// Everything the session controller tracks between iterations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub active_camera: CameraId,
    pub preview_enabled: bool,
    cameras: [CameraState; 2],
}

impl SessionState {
    /// Initial state: camera one active, preview on, both cameras at defaults.
    pub fn new(options: &CameraOptions) -> Self {
        Self {
            active_camera: CameraId::One,
            preview_enabled: true,
            cameras: CameraId::ALL.map(|id| CameraState::new(id, options)),
        }
    }

    pub fn camera(&self, id: CameraId) -> &CameraState {
        &self.cameras[id.index()]
    }

    pub fn camera_mut(&mut self, id: CameraId) -> &mut CameraState {
        &mut self.cameras[id.index()]
    }

    pub fn active(&self) -> &CameraState {
        self.camera(self.active_camera)
    }
}
