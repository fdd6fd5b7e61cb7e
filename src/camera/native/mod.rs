//! Hardware cameras through nokhwa.
//!
//! Each `NativeCamera` runs a background thread that continuously captures
//! frames into a single-slot buffer; `latest_frame` only takes from that slot.

mod capture_loop;
mod device;

pub use device::list_devices;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use capture_loop::{run_capture_loop, CaptureCommand, LoopSettings};

use super::handle::CameraHandle;
use super::types::{CameraConfig, CameraError, CameraId, Frame, Resolution};

/// How long a reconfiguration may take before it counts as rejected.
const CONFIGURE_TIMEOUT: Duration = Duration::from_secs(3);

/// Camera capture handle backed by a nokhwa device.
pub struct NativeCamera {
    id: CameraId,
    device_index: u32,
    fps: u32,
    config: CameraConfig,
    /// Latest captured frame (shared with capture thread)
    frame_buffer: Arc<Mutex<Option<Frame>>>,
    capture_thread: Option<JoinHandle<()>>,
    command_tx: Option<Sender<CaptureCommand>>,
    stop_signal: Arc<AtomicBool>,
}

impl std::fmt::Debug for NativeCamera {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeCamera")
            .field("id", &self.id)
            .field("device_index", &self.device_index)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl NativeCamera {
    /// Validate that the device exists. The stream is not opened until
    /// `start()`, inside the capture thread.
    pub fn open(id: CameraId, device_index: u32) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if !devices.iter().any(|d| d.index == device_index) {
            return Err(CameraError::DeviceNotFound(device_index));
        }

        Ok(Self {
            id,
            device_index,
            fps: 30,
            config: CameraConfig {
                resolution: Resolution::new(640, 480),
                exposure: 0,
                brightness: 0,
            },
            frame_buffer: Arc::new(Mutex::new(None)),
            capture_thread: None,
            command_tx: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    fn join_thread(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(h) = self.capture_thread.take() {
            let _ = h.join();
        }
    }
}

impl CameraHandle for NativeCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        self.stop_signal.store(false, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel();
        self.command_tx = Some(tx);

        let buffer = Arc::clone(&self.frame_buffer);
        let stop = Arc::clone(&self.stop_signal);
        let settings = LoopSettings {
            camera: self.id,
            device_index: self.device_index,
            fps: self.fps,
            config: self.config,
        };
        let (info_tx, info_rx) = mpsc::channel();

        self.capture_thread = Some(std::thread::spawn(move || {
            run_capture_loop(settings, buffer, stop, rx, info_tx);
        }));

        // Wait for the thread to report success or failure
        match info_rx.recv() {
            Ok(Ok(res)) => {
                log::info!("{} started on device {} at {}", self.id, self.device_index, res);
                if res != self.config.resolution {
                    log::warn!(
                        "{} asked for {} but the device negotiated {}",
                        self.id,
                        self.config.resolution,
                        res
                    );
                }
                Ok(())
            }
            Ok(Err(e)) => {
                self.join_thread();
                Err(e)
            }
            Err(_) => {
                self.join_thread();
                Err(CameraError::StreamFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    fn stop(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(CaptureCommand::Stop);
        }
        if let Some(handle) = self.capture_thread.take() {
            let _ = handle.join();
            log::info!("{} stopped", self.id);
        }
    }

    fn apply_config(&mut self, config: &CameraConfig) -> Result<(), CameraError> {
        let Some(tx) = self.command_tx.as_ref().filter(|_| self.is_running()) else {
            // Not streaming yet: the capture thread picks it up on start
            self.config = *config;
            return Ok(());
        };

        let (reply_tx, reply_rx) = mpsc::channel();
        tx.send(CaptureCommand::Configure(*config, reply_tx))
            .map_err(|_| CameraError::StreamFailed("capture thread is gone".to_string()))?;
        match reply_rx.recv_timeout(CONFIGURE_TIMEOUT) {
            Ok(Ok(())) => {
                self.config = *config;
                Ok(())
            }
            Ok(Err(e)) => Err(e),
            Err(_) => Err(CameraError::Rejected("device did not respond".to_string())),
        }
    }

    fn latest_frame(&mut self) -> Result<Frame, CameraError> {
        self.frame_buffer
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or(CameraError::FrameUnavailable)
    }
}

impl Drop for NativeCamera {
    fn drop(&mut self) {
        self.stop();
    }
}
