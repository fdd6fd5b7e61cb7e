//! Session controller: owns both cameras and drives the control loop.
//!
//! One iteration polls the keyboard, applies the resulting command, pulls
//! the latest frame from each camera and hands the composite to the
//! screen. Recoverable errors become the status-bar notice; only open
//! failures and terminal I/O errors end the session.

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::camera::{CameraError, CameraHandle, CameraId};
use crate::capture::FrameSink;
use crate::compositor::{CompositeBuffer, Compositor};
use crate::error::{SessionError, WriteFailure};
use crate::input::{self, Command, HELP_SHORT};
use crate::options::CameraOptions;
use crate::signal;
use crate::state::SessionState;

/// Default wait for a key before refreshing the preview.
pub const DEFAULT_TICK: Duration = Duration::from_millis(33);

/// How long a notice replaces the key help in the status bar.
pub const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Whether the control loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Source of operator keystrokes.
pub trait KeySource {
    /// Wait up to `timeout` for a key. `Ok(None)` when none arrived.
    fn next_key(&mut self, timeout: Duration) -> io::Result<Option<char>>;
}

/// Where composites are shown.
pub trait Screen {
    fn show(&mut self, buffer: &CompositeBuffer, status: &StatusLine) -> io::Result<()>;
}

/// Summary line shown under the preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub active_camera: CameraId,
    pub preview_enabled: bool,
    pub notice: Option<String>,
}

impl StatusLine {
    pub fn format(&self) -> String {
        let preview = if self.preview_enabled {
            "live"
        } else {
            "PAUSED"
        };
        let tail = self.notice.as_deref().unwrap_or(HELP_SHORT);
        format!(" {} | {} | {}", self.active_camera, preview, tail)
    }
}

/// A running dual-camera session.
///
/// Both cameras are stopped when the session is dropped, whichever way the
/// loop ended.
pub struct Session<C: CameraHandle, S: FrameSink> {
    cameras: [C; 2],
    options: CameraOptions,
    state: SessionState,
    compositor: Compositor,
    sink: S,
    notice: Option<(String, Instant)>,
    tick: Duration,
    released: bool,
}

impl<C: CameraHandle, S: FrameSink> Session<C, S> {
    /// Configure and start both cameras.
    ///
    /// Invalid `options` are refused before any camera is touched. If
    /// either camera fails to start, every camera is stopped again before
    /// the error is returned.
    pub fn open(cameras: [C; 2], options: CameraOptions, sink: S) -> Result<Self, SessionError> {
        options.validate().map_err(SessionError::InvalidOptions)?;
        let mut cameras = cameras;
        let state = SessionState::new(&options);

        for id in CameraId::ALL {
            let config = state.camera(id).config(&options);
            let camera = &mut cameras[id.index()];
            let result = camera.apply_config(&config).and_then(|()| camera.start());
            if let Err(source) = result {
                log::error!("{} failed to open: {}", id, source);
                for camera in cameras.iter_mut() {
                    camera.stop();
                }
                return Err(SessionError::HardwareOpenFailure { camera: id, source });
            }
            log::info!("{} opened at {}", id, config.resolution);
        }

        Ok(Self {
            cameras,
            compositor: Compositor::new(options.clone()),
            options,
            state,
            sink,
            notice: None,
            tick: DEFAULT_TICK,
            released: false,
        })
    }

    /// Set how long the loop waits for a key per iteration.
    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn options(&self) -> &CameraOptions {
        &self.options
    }

    pub fn camera(&self, id: CameraId) -> &C {
        &self.cameras[id.index()]
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    /// Last message for the operator, if any, however old.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_ref().map(|(message, _)| message.as_str())
    }

    pub fn status(&self) -> StatusLine {
        self.status_at(Instant::now())
    }

    /// Status line as of `now`. Notices older than [`NOTICE_TTL`] give way
    /// to the key help.
    pub fn status_at(&self, now: Instant) -> StatusLine {
        let notice = self
            .notice
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < NOTICE_TTL)
            .map(|(message, _)| message.clone());
        StatusLine {
            active_camera: self.state.active_camera,
            preview_enabled: self.state.preview_enabled,
            notice,
        }
    }

    /// Apply one command.
    ///
    /// On error the session state is exactly as it was before the command
    /// (except for captures that did succeed during a save-both).
    pub fn apply(&mut self, command: Command) -> Result<Flow, SessionError> {
        let active = self.state.active_camera;
        match command {
            Command::Quit => {
                log::info!("Quit requested");
                return Ok(Flow::Quit);
            }
            Command::NoOp => {}
            Command::SelectCamera(id) => {
                self.state.active_camera = id;
                self.set_notice(format!("{} selected", id));
            }
            Command::TogglePreview => {
                self.state.preview_enabled = !self.state.preview_enabled;
                let message = if self.state.preview_enabled {
                    "Preview resumed"
                } else {
                    "Preview paused"
                };
                self.set_notice(message.to_string());
            }
            Command::AdjustExposure(step) => {
                let changed = self.state.camera_mut(active).adjust_exposure(
                    step,
                    &self.options,
                    &mut self.cameras[active.index()],
                )?;
                let value = self.state.camera(active).exposure();
                self.set_notice(with_limit(
                    format!("{} exposure compensation: {}", active, value),
                    changed,
                ));
            }
            Command::AdjustBrightness(step) => {
                let changed = self.state.camera_mut(active).adjust_brightness(
                    step,
                    &self.options,
                    &mut self.cameras[active.index()],
                )?;
                let value = self.state.camera(active).brightness();
                self.set_notice(with_limit(
                    format!("{} brightness: {}", active, value),
                    changed,
                ));
            }
            Command::CycleResolution => {
                self.state
                    .camera_mut(active)
                    .cycle_resolution(&self.options, &mut self.cameras[active.index()])?;
                let resolution = self
                    .options
                    .resolution(self.state.camera(active).resolution_index());
                self.set_notice(format!("{} resolution changed to {}", active, resolution));
            }
            Command::SaveActive => {
                let path = self.save(active)?;
                self.set_notice(format!("Image saved as {}", path.display()));
            }
            Command::SaveBoth => self.save_both()?,
        }
        Ok(Flow::Continue)
    }

    /// Pull the newest frames and build the buffer to display.
    pub fn refresh(&mut self) -> &CompositeBuffer {
        let mut frames = [None, None];
        for id in CameraId::ALL {
            match self.cameras[id.index()].latest_frame() {
                Ok(frame) => frames[id.index()] = Some(frame),
                Err(CameraError::FrameUnavailable) => log::trace!("{}: no new frame", id),
                Err(err) => log::debug!("{}: {}", id, err),
            }
        }
        let [one, two] = frames;
        self.compositor.compose(one, two, &self.state)
    }

    /// Run until the operator quits or an interrupt arrives.
    ///
    /// Cameras are released before this returns, on every path.
    pub fn run<K, D>(mut self, keys: &mut K, screen: &mut D) -> Result<(), SessionError>
    where
        K: KeySource + ?Sized,
        D: Screen + ?Sized,
    {
        log::info!("Session started");
        let result = self.run_loop(keys, screen);
        self.release();
        log::info!("Session ended");
        result
    }

    fn run_loop<K, D>(&mut self, keys: &mut K, screen: &mut D) -> Result<(), SessionError>
    where
        K: KeySource + ?Sized,
        D: Screen + ?Sized,
    {
        loop {
            if signal::interrupted() {
                log::info!("Interrupted");
                return Ok(());
            }

            let command = keys
                .next_key(self.tick)?
                .map(input::dispatch)
                .unwrap_or(Command::NoOp);

            match self.apply(command) {
                Ok(Flow::Quit) => return Ok(()),
                Ok(Flow::Continue) => {}
                Err(err) if err.is_recoverable() => {
                    log::warn!("{}", err);
                    self.set_notice(err.to_string());
                }
                Err(err) => return Err(err),
            }

            let status = self.status();
            let buffer = self.refresh();
            screen.show(buffer, &status)?;
        }
    }

    /// Capture one camera's most recent frame to the sink.
    fn save(&mut self, id: CameraId) -> Result<PathBuf, SessionError> {
        if let Ok(frame) = self.cameras[id.index()].latest_frame() {
            self.compositor.offer(id, frame);
        }
        let frame = self
            .compositor
            .last_good(id)
            .ok_or(SessionError::FrameUnavailable { camera: id })?;
        self.sink
            .save(frame, id.label())
            .map_err(|source| SessionError::WriteError(vec![WriteFailure { camera: id, source }]))
    }

    /// Save both cameras independently; one failing never blocks the other.
    fn save_both(&mut self) -> Result<(), SessionError> {
        let mut saved = Vec::new();
        let mut failures = Vec::new();
        let mut missing = None;
        for id in CameraId::ALL {
            match self.save(id) {
                Ok(path) => saved.push(path.display().to_string()),
                Err(SessionError::WriteError(mut failed)) => failures.append(&mut failed),
                Err(err) => {
                    missing.get_or_insert(err);
                }
            }
        }

        if !saved.is_empty() {
            self.set_notice(format!("Images saved as {}", saved.join(", ")));
        }
        if !failures.is_empty() {
            return Err(SessionError::WriteError(failures));
        }
        match missing {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn set_notice(&mut self, message: String) {
        log::info!("{}", message);
        self.notice = Some((message, Instant::now()));
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        for id in CameraId::ALL {
            self.cameras[id.index()].stop();
            log::info!("{} released", id);
        }
        self.released = true;
    }
}

impl<C: CameraHandle, S: FrameSink> Drop for Session<C, S> {
    fn drop(&mut self) {
        self.release();
    }
}

fn with_limit(message: String, changed: bool) -> String {
    if changed {
        message
    } else {
        format!("{} (limit)", message)
    }
}
