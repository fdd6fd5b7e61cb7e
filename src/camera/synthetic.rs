//! Test-pattern camera that needs no hardware.
//!
//! Renders a tinted gradient with a moving bar at a fixed frame interval.
//! Exposure and brightness are applied in software so their effect is
//! visible in the preview.

use std::time::{Duration, Instant};

use super::handle::CameraHandle;
use super::types::{
    CameraConfig, CameraError, CameraId, Frame, Resolution, EXPOSURE_GAIN_PER_STEP,
};

/// Default interval between synthetic frames (~15 FPS).
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(67);

/// Camera that synthesizes frames on demand.
#[derive(Debug)]
pub struct SyntheticCamera {
    id: CameraId,
    config: CameraConfig,
    frame_interval: Duration,
    running: bool,
    last_frame_at: Option<Instant>,
    sequence: u32,
}

impl SyntheticCamera {
    pub fn new(id: CameraId, frame_interval: Duration) -> Self {
        Self {
            id,
            config: CameraConfig {
                resolution: Resolution::new(640, 480),
                exposure: 0,
                brightness: 0,
            },
            frame_interval,
            running: false,
            last_frame_at: None,
            sequence: 0,
        }
    }

    fn tint(&self) -> [f32; 3] {
        match self.id {
            CameraId::One => [0.55, 0.75, 1.0],
            CameraId::Two => [1.0, 0.7, 0.45],
        }
    }

    fn render(&self) -> Frame {
        let Resolution { width, height } = self.config.resolution;
        let tint = self.tint();
        let gain = 1.0 + self.config.exposure as f32 * EXPOSURE_GAIN_PER_STEP;
        let offset = self.config.brightness as f32;
        let bar_width = (width / 16).max(1);
        let bar_x = self.sequence.wrapping_mul(8) % width.max(1);

        let mut data = Vec::with_capacity(width as usize * height as usize * Frame::BYTES_PER_PIXEL);
        for y in 0..height {
            for x in 0..width {
                let base = if x >= bar_x && x < bar_x + bar_width {
                    255.0
                } else {
                    // Diagonal gradient in the 32..224 range
                    let t = (x as f32 / width as f32 + y as f32 / height as f32) / 2.0;
                    32.0 + t * 192.0
                };
                for channel in tint {
                    let value = base * channel * gain + offset;
                    data.push(value.clamp(0.0, 255.0) as u8);
                }
            }
        }

        Frame {
            data,
            width,
            height,
            camera: self.id,
            timestamp: Instant::now(),
        }
    }
}

impl CameraHandle for SyntheticCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        if self.running {
            return Err(CameraError::AlreadyRunning);
        }
        self.running = true;
        self.last_frame_at = None;
        log::info!("{} started (synthetic, {})", self.id, self.config.resolution);
        Ok(())
    }

    fn stop(&mut self) {
        if self.running {
            log::info!("{} stopped", self.id);
        }
        self.running = false;
    }

    fn apply_config(&mut self, config: &CameraConfig) -> Result<(), CameraError> {
        let Resolution { width, height } = config.resolution;
        if width == 0 || height == 0 {
            return Err(CameraError::Rejected(format!(
                "unsupported mode {}",
                config.resolution
            )));
        }
        self.config = *config;
        // Deliver a frame in the new mode right away
        self.last_frame_at = None;
        Ok(())
    }

    fn latest_frame(&mut self) -> Result<Frame, CameraError> {
        if !self.running {
            return Err(CameraError::FrameUnavailable);
        }
        let now = Instant::now();
        if let Some(last) = self.last_frame_at {
            if now.duration_since(last) < self.frame_interval {
                return Err(CameraError::FrameUnavailable);
            }
        }
        self.last_frame_at = Some(now);
        self.sequence = self.sequence.wrapping_add(1);
        Ok(self.render())
    }
}
