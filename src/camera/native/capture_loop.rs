//! Background capture thread implementation.
//!
//! Only the resolution is pushed to the device. Exposure compensation and
//! brightness are applied to each decoded frame, so previews and captures
//! both carry them and the device never holds a value the session doesn't.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::camera::types::{CameraConfig, CameraError, CameraId, Frame, Resolution};

/// Commands sent to the capture thread.
pub enum CaptureCommand {
    Stop,
    Configure(CameraConfig, Sender<Result<(), CameraError>>),
}

/// Everything the capture thread needs to open its device.
pub struct LoopSettings {
    pub camera: CameraId,
    pub device_index: u32,
    pub fps: u32,
    pub config: CameraConfig,
}

/// Run the capture loop in a background thread.
pub fn run_capture_loop(
    settings: LoopSettings,
    buffer: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
    rx: Receiver<CaptureCommand>,
    info_tx: Sender<Result<Resolution, CameraError>>,
) {
    let index = CameraIndex::Index(settings.device_index);

    let mut camera = match open_camera_with_fallback(&index, &settings) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = info_tx.send(Err(CameraError::StreamFailed(e.to_string())));
        return;
    }

    let res = camera.resolution();
    let _ = info_tx.send(Ok(Resolution::new(res.width(), res.height())));

    let mut current = settings.config;
    while !stop.load(Ordering::Relaxed) {
        match rx.try_recv() {
            Ok(CaptureCommand::Stop) => break,
            Ok(CaptureCommand::Configure(config, reply)) => {
                let result = reconfigure(&mut camera, &current, &config);
                if result.is_ok() {
                    current = config;
                }
                let _ = reply.send(result);
            }
            Err(_) => {}
        }

        if let Ok(raw_frame) = camera.frame() {
            // Frames that fail to decode are skipped
            if let Some(mut frame) = convert_to_rgb(&raw_frame, settings.camera) {
                frame.apply_levels(current.exposure, current.brightness);
                if let Ok(mut buf) = buffer.lock() {
                    *buf = Some(frame);
                }
            }
        }

        thread::sleep(Duration::from_millis(1));
    }

    let _ = camera.stop_stream();
}

/// Switch to the new resolution, restoring the previous mode if the device
/// refuses it. Level changes need no device call.
fn reconfigure(
    camera: &mut Camera,
    current: &CameraConfig,
    next: &CameraConfig,
) -> Result<(), CameraError> {
    if next.resolution == current.resolution {
        return Ok(());
    }

    let _ = camera.stop_stream();
    let switched = camera
        .set_resolution(to_nokhwa_resolution(next.resolution))
        .map_err(|e| CameraError::Rejected(e.to_string()));
    if let Err(e) = switched {
        let _ = camera.set_resolution(to_nokhwa_resolution(current.resolution));
        let _ = camera.open_stream();
        return Err(e);
    }
    camera
        .open_stream()
        .map_err(|e| CameraError::StreamFailed(e.to_string()))
}

fn to_nokhwa_resolution(resolution: Resolution) -> nokhwa::utils::Resolution {
    nokhwa::utils::Resolution::new(resolution.width, resolution.height)
}

/// Convert a nokhwa buffer to our RGB Frame format.
///
/// Returns `None` if the conversion fails (unsupported format or corrupt data).
fn convert_to_rgb(buffer: &nokhwa::Buffer, camera: CameraId) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        camera,
        timestamp: Instant::now(),
    })
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &LoopSettings,
) -> Result<Camera, CameraError> {
    let resolution = to_nokhwa_resolution(settings.config.resolution);
    // MJPEG first (widely supported), then YUYV, then whatever the camera prefers
    let format_attempts: Vec<RequestedFormat> = vec![
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            resolution,
            NokhwaFrameFormat::YUYV,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = None;
    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => last_error = Some(e),
        }
    }

    Err(CameraError::OpenFailed(
        last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no usable format".to_string()),
    ))
}
