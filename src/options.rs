//! Compiled-in camera options shared by both cameras.
//!
//! The resolution menu and the exposure/brightness bounds are fixed at
//! build time. Each camera keeps its own index into the same menu.

use serde::Serialize;

use crate::camera::Resolution;

/// Resolution menu offered to both cameras, lowest first.
pub const RESOLUTIONS: [Resolution; 4] = [
    Resolution::new(640, 480),
    Resolution::new(1280, 720),
    Resolution::new(1920, 1080),
    Resolution::new(2592, 1944),
];

/// Exposure compensation bounds (EV steps).
pub const EXPOSURE_RANGE: (i32, i32) = (-8, 8);
pub const EXPOSURE_STEP: i32 = 1;

/// Brightness offset bounds.
pub const BRIGHTNESS_RANGE: (i32, i32) = (-100, 100);
pub const BRIGHTNESS_STEP: i32 = 5;

/// The fixed options enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CameraOptions {
    pub exposure_range: (i32, i32),
    pub exposure_step: i32,
    pub brightness_range: (i32, i32),
    pub brightness_step: i32,
    // Last so it serializes as a trailing array of tables
    pub resolutions: Vec<Resolution>,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            exposure_range: EXPOSURE_RANGE,
            exposure_step: EXPOSURE_STEP,
            brightness_range: BRIGHTNESS_RANGE,
            brightness_step: BRIGHTNESS_STEP,
            resolutions: RESOLUTIONS.to_vec(),
        }
    }
}

impl CameraOptions {
    /// Check the invariants the session relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.resolutions.is_empty() {
            return Err("resolution menu must not be empty".to_string());
        }
        if let Some(r) = self.resolutions.iter().find(|r| r.width == 0 || r.height == 0) {
            return Err(format!("resolution {} has a zero dimension", r));
        }
        if self.exposure_range.0 > self.exposure_range.1 {
            return Err(format!("invalid exposure range {:?}", self.exposure_range));
        }
        if self.brightness_range.0 > self.brightness_range.1 {
            return Err(format!("invalid brightness range {:?}", self.brightness_range));
        }
        if self.exposure_step <= 0 || self.brightness_step <= 0 {
            return Err("adjustment steps must be positive".to_string());
        }
        Ok(())
    }

    /// Resolution at `index`, wrapping past the end of the menu.
    pub fn resolution(&self, index: usize) -> Resolution {
        self.resolutions[index % self.resolutions.len()]
    }

    /// Midpoint of the exposure range, the starting value for each camera.
    pub fn default_exposure(&self) -> i32 {
        midpoint(self.exposure_range)
    }

    /// Midpoint of the brightness range, the starting value for each camera.
    pub fn default_brightness(&self) -> i32 {
        midpoint(self.brightness_range)
    }

    /// Render the options as TOML for the `options` subcommand.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn midpoint((min, max): (i32, i32)) -> i32 {
    min + (max - min) / 2
}
