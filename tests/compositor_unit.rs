//! Unit tests for side-by-side compositing through the public API.

use chrono::{Local, TimeZone};
use dualcam::camera::{CameraId, Frame};
use dualcam::compositor::{
    Compositor, Rect, ACTIVE_BORDER_COLOR, PADDING_COLOR, PLACEHOLDER_COLOR,
};
use dualcam::options::CameraOptions;
use dualcam::state::SessionState;

fn setup() -> (Compositor, SessionState) {
    let options = CameraOptions::default();
    let state = SessionState::new(&options);
    (Compositor::new(options), state)
}

fn solid(camera: CameraId, width: u32, height: u32, rgb: [u8; 3]) -> Option<Frame> {
    Some(Frame::solid(camera, width, height, rgb))
}

#[test]
fn test_camera_one_left_camera_two_right() {
    let (mut compositor, state) = setup();
    let buffer = compositor.compose(
        solid(CameraId::One, 40, 30, [255, 0, 0]),
        solid(CameraId::Two, 40, 30, [0, 0, 255]),
        &state,
    );

    assert_eq!((buffer.width, buffer.height), (80, 30));
    assert_eq!(
        buffer.region(CameraId::One).bounds,
        Rect {
            x: 0,
            y: 0,
            width: 40,
            height: 30
        }
    );
    assert_eq!(buffer.region(CameraId::Two).bounds.x, 40);
    // Inactive half has no border or info box
    assert_eq!(buffer.pixel(41, 1), [0, 0, 255]);
    assert_eq!(buffer.pixel(79, 29), [0, 0, 255]);
}

#[test]
fn test_smaller_frame_is_centered_not_scaled() {
    let (mut compositor, state) = setup();
    let buffer = compositor.compose(
        solid(CameraId::One, 40, 30, [255, 0, 0]),
        solid(CameraId::Two, 20, 10, [0, 0, 255]),
        &state,
    );

    let content = buffer.region(CameraId::Two).content;
    assert_eq!(
        content,
        Rect {
            x: 50,
            y: 10,
            width: 20,
            height: 10
        }
    );
    assert_eq!(buffer.pixel(45, 15), PADDING_COLOR);
    assert_eq!(buffer.pixel(60, 15), [0, 0, 255]);
    assert_eq!(buffer.pixel(60, 25), PADDING_COLOR);
}

#[test]
fn test_missing_frame_reuses_last_good() {
    let (mut compositor, state) = setup();
    compositor.compose(
        solid(CameraId::One, 40, 30, [9, 9, 9]),
        solid(CameraId::Two, 40, 30, [0, 200, 0]),
        &state,
    );
    let buffer = compositor.compose(None, None, &state);

    assert!(!buffer.region(CameraId::Two).placeholder);
    assert_eq!(buffer.pixel(60, 15), [0, 200, 0]);
}

#[test]
fn test_never_seen_camera_gets_placeholder() {
    let (mut compositor, state) = setup();
    let buffer = compositor.compose(solid(CameraId::One, 640, 480, [1, 1, 1]), None, &state);

    let region = buffer.region(CameraId::Two);
    assert!(region.placeholder);
    assert_eq!(region.content.width, 640);
    assert_eq!(buffer.pixel(region.content.x + 320, 240), PLACEHOLDER_COLOR);
}

#[test]
fn test_active_half_has_border_and_overlay() {
    let (mut compositor, mut state) = setup();
    state.active_camera = CameraId::Two;
    let buffer = compositor.compose(
        solid(CameraId::One, 320, 240, [100, 100, 100]),
        solid(CameraId::Two, 320, 240, [100, 100, 100]),
        &state,
    );

    assert_eq!(buffer.pixel(320, 200), ACTIVE_BORDER_COLOR);
    assert_eq!(buffer.pixel(0, 200), [100, 100, 100]);
    // Info box darkens by half
    assert_eq!(buffer.pixel(320 + 50, 50), [50, 50, 50]);
    assert_eq!(buffer.overlay.camera, CameraId::Two);
    assert_eq!(buffer.overlay.origin, (330, 10));
    assert_eq!(buffer.overlay.lines[0], "Camera 2 (ACTIVE)");
}

#[test]
fn test_paused_buffer_is_byte_identical() {
    let (mut compositor, mut state) = setup();
    let t0 = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    let t1 = Local.with_ymd_and_hms(2024, 1, 1, 12, 0, 5).unwrap();

    let live = compositor
        .compose_at(
            solid(CameraId::One, 40, 30, [255, 0, 0]),
            solid(CameraId::Two, 40, 30, [255, 0, 0]),
            &state,
            t0,
        )
        .clone();

    state.preview_enabled = false;
    let paused = compositor
        .compose_at(
            solid(CameraId::One, 40, 30, [0, 255, 0]),
            solid(CameraId::Two, 40, 30, [0, 255, 0]),
            &state,
            t1,
        )
        .clone();
    assert_eq!(paused, live);
    assert_eq!(compositor.last_good(CameraId::Two).unwrap().data[1], 255);

    state.preview_enabled = true;
    let resumed = compositor.compose_at(None, None, &state, t1);
    assert_eq!(resumed.pixel(60, 15), [0, 255, 0]);
    assert_eq!(resumed.overlay.lines[1], "Time: 2024-01-01 12:00:05");
}
