//! Side-by-side compositing of the two camera feeds.
//!
//! Camera one fills the left half and camera two the right half. Each half
//! is as large as the larger frame; a smaller frame is centered on black
//! rather than scaled, so the operator sees the true captured size. The
//! active camera's half gets a darkened info box, text overlay and a green
//! border.

use chrono::{DateTime, Local};

use crate::camera::{CameraId, Frame, Resolution};
use crate::options::CameraOptions;
use crate::state::SessionState;

/// Fill for a camera that has never delivered a frame.
pub const PLACEHOLDER_COLOR: [u8; 3] = [48, 48, 48];
/// Fill around a letterboxed frame.
pub const PADDING_COLOR: [u8; 3] = [0, 0, 0];
/// Border drawn around the active camera's half.
pub const ACTIVE_BORDER_COLOR: [u8; 3] = [0, 255, 0];
const ACTIVE_BORDER_WIDTH: u32 = 2;

/// Top-left of the info box and overlay text, relative to the half.
pub const OVERLAY_ANCHOR: (u32, u32) = (10, 10);
/// Bottom-right corner of the info box, relative to the half.
const OVERLAY_BOX_END: (u32, u32) = (300, 110);

/// Axis-aligned rectangle in composite pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Where one camera landed in the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub camera: CameraId,
    /// The camera's whole half
    pub bounds: Rect,
    /// The area covered by the frame (or placeholder) inside `bounds`
    pub content: Rect,
    /// True when no frame has ever arrived for this camera
    pub placeholder: bool,
}

/// Text drawn over the active camera's half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub camera: CameraId,
    /// Absolute pixel position of the first line
    pub origin: (u32, u32),
    pub lines: Vec<String>,
}

/// One rendered display buffer (RGB, 3 bytes per pixel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeBuffer {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub regions: [Region; 2],
    pub overlay: Overlay,
}

impl CompositeBuffer {
    /// RGB value at (x, y). Callers must stay in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn region(&self, camera: CameraId) -> &Region {
        &self.regions[camera.index()]
    }
}

/// Builds composites and remembers what it needs between iterations: the
/// last good frame per camera and the last buffer (for paused preview).
#[derive(Debug)]
pub struct Compositor {
    options: CameraOptions,
    last_good: [Option<Frame>; 2],
    last: Option<CompositeBuffer>,
}

impl Compositor {
    pub fn new(options: CameraOptions) -> Self {
        Self {
            options,
            last_good: [None, None],
            last: None,
        }
    }

    /// Compose the latest frames using the current wall-clock time.
    pub fn compose(
        &mut self,
        camera_one: Option<Frame>,
        camera_two: Option<Frame>,
        state: &SessionState,
    ) -> &CompositeBuffer {
        self.compose_at(camera_one, camera_two, state, Local::now())
    }

    /// Compose the latest frames, stamping the overlay with `now`.
    ///
    /// `None` means the camera had no new frame; its last good frame is
    /// reused. While preview is disabled the previous buffer is returned
    /// unchanged, though incoming frames still refresh the cache.
    pub fn compose_at(
        &mut self,
        camera_one: Option<Frame>,
        camera_two: Option<Frame>,
        state: &SessionState,
        now: DateTime<Local>,
    ) -> &CompositeBuffer {
        if let Some(frame) = camera_one {
            self.offer(CameraId::One, frame);
        }
        if let Some(frame) = camera_two {
            self.offer(CameraId::Two, frame);
        }

        if state.preview_enabled {
            self.last = None;
        }
        let buffer = match self.last.take() {
            Some(frozen) => frozen,
            None => self.render(state, now),
        };
        self.last.insert(buffer)
    }

    /// Most recent frame received from `camera`, if any.
    pub fn last_good(&self, camera: CameraId) -> Option<&Frame> {
        self.last_good[camera.index()].as_ref()
    }

    /// Store `frame` as the last good frame for `camera`. Malformed frames
    /// are dropped and the previous one kept.
    pub fn offer(&mut self, camera: CameraId, frame: Frame) {
        if frame.is_consistent() && frame.width > 0 && frame.height > 0 {
            self.last_good[camera.index()] = Some(frame);
        } else {
            log::debug!(
                "{}: dropping malformed {}x{} frame",
                camera,
                frame.width,
                frame.height
            );
        }
    }

    /// Size of what will be drawn for `camera`: its frame, or a placeholder
    /// at the configured resolution.
    fn content_size(&self, camera: CameraId, state: &SessionState) -> Resolution {
        match self.last_good(camera) {
            Some(frame) => frame.resolution(),
            None => self
                .options
                .resolution(state.camera(camera).resolution_index()),
        }
    }

    fn render(&self, state: &SessionState, now: DateTime<Local>) -> CompositeBuffer {
        let sizes = CameraId::ALL.map(|id| self.content_size(id, state));
        let half_width = sizes.iter().map(|s| s.width).max().unwrap_or(0);
        let half_height = sizes.iter().map(|s| s.height).max().unwrap_or(0);

        let mut canvas = Canvas::new(half_width * 2, half_height, PADDING_COLOR);
        let regions = CameraId::ALL.map(|id| {
            let size = sizes[id.index()];
            let bounds = Rect {
                x: id.index() as u32 * half_width,
                y: 0,
                width: half_width,
                height: half_height,
            };
            let content = Rect {
                x: bounds.x + (half_width - size.width) / 2,
                y: (half_height - size.height) / 2,
                width: size.width,
                height: size.height,
            };
            match self.last_good(id) {
                Some(frame) => canvas.blit(frame, content.x, content.y),
                None => canvas.fill(content, PLACEHOLDER_COLOR),
            }
            Region {
                camera: id,
                bounds,
                content,
                placeholder: self.last_good(id).is_none(),
            }
        });

        let active = regions[state.active_camera.index()];
        let info_box = Rect {
            x: active.bounds.x + OVERLAY_ANCHOR.0,
            y: active.bounds.y + OVERLAY_ANCHOR.1,
            width: OVERLAY_BOX_END.0.min(half_width).saturating_sub(OVERLAY_ANCHOR.0),
            height: OVERLAY_BOX_END.1.min(half_height).saturating_sub(OVERLAY_ANCHOR.1),
        };
        canvas.darken(info_box);
        canvas.outline(active.bounds, ACTIVE_BORDER_WIDTH, ACTIVE_BORDER_COLOR);

        let overlay = Overlay {
            camera: state.active_camera,
            origin: (info_box.x, info_box.y),
            lines: overlay_lines(state, sizes[state.active_camera.index()], now),
        };

        CompositeBuffer {
            width: canvas.width,
            height: canvas.height,
            data: canvas.data,
            regions,
            overlay,
        }
    }
}

/// Info text for the active camera.
pub fn overlay_lines(state: &SessionState, resolution: Resolution, now: DateTime<Local>) -> Vec<String> {
    let camera = state.active();
    vec![
        format!("{} (ACTIVE)", camera.camera()),
        format!("Time: {}", now.format("%Y-%m-%d %H:%M:%S")),
        format!("Resolution: {}", resolution),
        format!("Exposure: {}", camera.exposure()),
        format!("Brightness: {}", camera.brightness()),
    ]
}

/// Minimal RGB drawing surface.
struct Canvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Canvas {
    fn new(width: u32, height: u32, color: [u8; 3]) -> Self {
        let data = color
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 3)
            .collect();
        Self { width, height, data }
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 3
    }

    fn blit(&mut self, frame: &Frame, x: u32, y: u32) {
        let row_len = frame.width as usize * 3;
        for (row, src) in frame.data.chunks_exact(row_len).enumerate() {
            let start = self.offset(x, y + row as u32);
            self.data[start..start + row_len].copy_from_slice(src);
        }
    }

    fn fill(&mut self, rect: Rect, color: [u8; 3]) {
        self.apply(rect, |px| px.copy_from_slice(&color));
    }

    fn darken(&mut self, rect: Rect) {
        self.apply(rect, |px| px.iter_mut().for_each(|c| *c /= 2));
    }

    fn outline(&mut self, rect: Rect, thickness: u32, color: [u8; 3]) {
        let t = thickness.min(rect.width).min(rect.height);
        let edges = [
            Rect { height: t, ..rect },
            Rect {
                y: rect.y + rect.height - t,
                height: t,
                ..rect
            },
            Rect { width: t, ..rect },
            Rect {
                x: rect.x + rect.width - t,
                width: t,
                ..rect
            },
        ];
        for edge in edges {
            self.fill(edge, color);
        }
    }

    /// Run `f` on every pixel of `rect`, clipped to the canvas.
    fn apply(&mut self, rect: Rect, mut f: impl FnMut(&mut [u8])) {
        let x_end = (rect.x + rect.width).min(self.width);
        let y_end = (rect.y + rect.height).min(self.height);
        for y in rect.y..y_end {
            for x in rect.x..x_end {
                let i = self.offset(x, y);
                f(&mut self.data[i..i + 3]);
            }
        }
    }
}
