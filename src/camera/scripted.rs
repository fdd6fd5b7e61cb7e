//! Deterministic camera for tests: scripted frames and scripted failures.
//!
//! `ScriptedCamera` is cheap to clone; clones share the same script, so a
//! test can keep one clone to inspect what the session did with the other.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use super::handle::CameraHandle;
use super::types::{CameraConfig, CameraError, CameraId, Frame};

#[derive(Debug, Default)]
struct Script {
    frames: VecDeque<Frame>,
    fail_start: bool,
    rejections: usize,
    applied: Vec<CameraConfig>,
    running: bool,
    start_calls: usize,
    stop_calls: usize,
}

/// Fake camera driven by a script instead of hardware.
#[derive(Debug, Clone)]
pub struct ScriptedCamera {
    id: CameraId,
    script: Arc<Mutex<Script>>,
}

impl ScriptedCamera {
    pub fn new(id: CameraId) -> Self {
        Self {
            id,
            script: Arc::new(Mutex::new(Script::default())),
        }
    }

    /// A camera whose `start` always fails, as an unplugged device would.
    pub fn failing_start(id: CameraId) -> Self {
        let camera = Self::new(id);
        camera.script().fail_start = true;
        camera
    }

    pub fn id(&self) -> CameraId {
        self.id
    }

    /// Queue a frame to be returned by a later `latest_frame` call.
    pub fn push_frame(&self, frame: Frame) {
        self.script().frames.push_back(frame);
    }

    /// Queue a solid-color frame of the given size.
    pub fn push_solid(&self, width: u32, height: u32, rgb: [u8; 3]) {
        self.push_frame(Frame::solid(self.id, width, height, rgb));
    }

    /// Reject the next `count` calls to `apply_config`.
    pub fn reject_next_configs(&self, count: usize) {
        self.script().rejections = count;
    }

    /// Every configuration the camera accepted, oldest first.
    pub fn applied_configs(&self) -> Vec<CameraConfig> {
        self.script().applied.clone()
    }

    /// The configuration currently in effect on the "device".
    pub fn current_config(&self) -> Option<CameraConfig> {
        self.script().applied.last().copied()
    }

    pub fn is_running(&self) -> bool {
        self.script().running
    }

    pub fn start_calls(&self) -> usize {
        self.script().start_calls
    }

    pub fn stop_calls(&self) -> usize {
        self.script().stop_calls
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CameraHandle for ScriptedCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        let mut script = self.script();
        script.start_calls += 1;
        if script.fail_start {
            return Err(CameraError::OpenFailed(format!("{} is not connected", self.id)));
        }
        if script.running {
            return Err(CameraError::AlreadyRunning);
        }
        script.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        let mut script = self.script();
        script.stop_calls += 1;
        script.running = false;
    }

    fn apply_config(&mut self, config: &CameraConfig) -> Result<(), CameraError> {
        let mut script = self.script();
        if script.rejections > 0 {
            script.rejections -= 1;
            return Err(CameraError::Rejected("device busy".to_string()));
        }
        script.applied.push(*config);
        Ok(())
    }

    fn latest_frame(&mut self) -> Result<Frame, CameraError> {
        self.script()
            .frames
            .pop_front()
            .ok_or(CameraError::FrameUnavailable)
    }
}
