//! Drawing a composite into terminal cells.
//!
//! Each cell shows two stacked pixels with the upper half-block glyph:
//! foreground is the top pixel, background the bottom one. The picture is
//! scaled to fit above the status bar, keeping its aspect ratio.

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use std::io::{self, Write};

use crate::compositor::CompositeBuffer;
use crate::session::StatusLine;

const HALF_BLOCK: char = '▀';
const OVERLAY_FG: Color = Color::Rgb { r: 0, g: 255, b: 0 };
const OVERLAY_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };

/// Where the picture sits on screen, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLayout {
    /// Left column of the picture
    pub x: u16,
    pub cols: u16,
    pub rows: u16,
}

impl PreviewLayout {
    /// Largest picture with the buffer's aspect ratio that fits the
    /// terminal minus its last row, centered horizontally.
    pub fn fit(buffer_width: u32, buffer_height: u32, term_cols: u16, term_rows: u16) -> Self {
        let avail_rows = term_rows.saturating_sub(1);
        if buffer_width == 0 || buffer_height == 0 || term_cols == 0 || avail_rows == 0 {
            return Self {
                x: 0,
                cols: 0,
                rows: 0,
            };
        }

        let (w, h) = (buffer_width as u64, buffer_height as u64);
        let max_pixel_rows = avail_rows as u64 * 2;
        let cols_at_full_height = (max_pixel_rows * w / h).max(1);
        let (cols, pixel_rows) = if cols_at_full_height <= term_cols as u64 {
            (cols_at_full_height, max_pixel_rows)
        } else {
            let cols = term_cols as u64;
            (cols, (cols * h / w).max(1))
        };

        Self {
            x: ((term_cols as u64 - cols) / 2) as u16,
            cols: cols as u16,
            rows: pixel_rows.div_ceil(2) as u16,
        }
    }

    pub fn pixel_rows(&self) -> u16 {
        self.rows * 2
    }

    /// Cell covering buffer pixel (px, py).
    pub fn cell_for(&self, buffer: &CompositeBuffer, px: u32, py: u32) -> (u16, u16) {
        let col = px as u64 * self.cols as u64 / buffer.width.max(1) as u64;
        let pixel_row = py as u64 * self.pixel_rows() as u64 / buffer.height.max(1) as u64;
        (self.x + col as u16, (pixel_row / 2) as u16)
    }
}

/// Average the buffer down to `cols` x `pixel_rows` colors, row-major.
///
/// Every output pixel samples at least one source pixel, so upscaling a
/// small buffer repeats pixels rather than leaving gaps.
pub fn downsample_into(
    buffer: &CompositeBuffer,
    cols: u16,
    pixel_rows: u16,
    out: &mut Vec<[u8; 3]>,
) -> usize {
    out.clear();

    let (img_width, img_height) = (buffer.width, buffer.height);
    if cols == 0 || pixel_rows == 0 || img_width == 0 || img_height == 0 {
        return 0;
    }

    let output_size = cols as usize * pixel_rows as usize;
    out.reserve(output_size);

    let cell_w = img_width as f32 / cols as f32;
    let cell_h = img_height as f32 / pixel_rows as f32;

    for cy in 0..pixel_rows as u32 {
        let start_y = ((cy as f32 * cell_h) as u32).min(img_height - 1);
        let end_y = (((cy + 1) as f32 * cell_h) as u32).clamp(start_y + 1, img_height);
        for cx in 0..cols as u32 {
            let start_x = ((cx as f32 * cell_w) as u32).min(img_width - 1);
            let end_x = (((cx + 1) as f32 * cell_w) as u32).clamp(start_x + 1, img_width);

            let mut sum = [0u32; 3];
            let mut count = 0u32;
            for py in start_y..end_y {
                for px in start_x..end_x {
                    let pixel = buffer.pixel(px, py);
                    for (acc, channel) in sum.iter_mut().zip(pixel) {
                        *acc += channel as u32;
                    }
                    count += 1;
                }
            }
            out.push(sum.map(|s| (s / count) as u8));
        }
    }

    output_size
}

/// Queue one full screen update: picture, overlay text and status bar.
pub fn draw<W: Write>(
    out: &mut W,
    buffer: &CompositeBuffer,
    status: &StatusLine,
    term_cols: u16,
    term_rows: u16,
) -> io::Result<()> {
    let layout = PreviewLayout::fit(buffer.width, buffer.height, term_cols, term_rows);
    let mut colors = Vec::new();
    downsample_into(buffer, layout.cols, layout.pixel_rows(), &mut colors);

    let cols = layout.cols as usize;
    for row in 0..layout.rows {
        queue!(out, MoveTo(layout.x, row))?;
        let top = row as usize * 2 * cols;
        for col in 0..cols {
            queue!(
                out,
                SetForegroundColor(rgb(colors[top + col])),
                SetBackgroundColor(rgb(colors[top + cols + col])),
                Print(HALF_BLOCK)
            )?;
        }
    }

    draw_overlay(out, buffer, &layout)?;

    let status_row = term_rows.saturating_sub(1);
    queue!(
        out,
        MoveTo(0, status_row),
        SetForegroundColor(Color::Black),
        SetBackgroundColor(Color::White),
        Print(fit_width(&status.format(), term_cols as usize)),
        ResetColor
    )?;
    out.flush()
}

/// Overlay lines start at the info box and stay inside the active half.
fn draw_overlay<W: Write>(
    out: &mut W,
    buffer: &CompositeBuffer,
    layout: &PreviewLayout,
) -> io::Result<()> {
    let overlay = &buffer.overlay;
    let bounds = buffer.region(overlay.camera).bounds;
    let (col, row) = layout.cell_for(buffer, overlay.origin.0, overlay.origin.1);
    let (right, _) = layout.cell_for(buffer, bounds.x + bounds.width, 0);
    let width = right.saturating_sub(col) as usize;
    if width == 0 {
        return Ok(());
    }

    for (i, line) in overlay.lines.iter().enumerate() {
        let y = row + i as u16;
        if y >= layout.rows {
            break;
        }
        let text: String = line.chars().take(width).collect();
        queue!(
            out,
            MoveTo(col, y),
            SetForegroundColor(OVERLAY_FG),
            SetBackgroundColor(OVERLAY_BG),
            Print(text)
        )?;
    }
    Ok(())
}

/// Truncate or pad `text` to exactly `width` characters.
fn fit_width(text: &str, width: usize) -> String {
    let mut fitted: String = text.chars().take(width).collect();
    let len = fitted.chars().count();
    fitted.extend(std::iter::repeat(' ').take(width - len));
    fitted
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb { r, g, b }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraId, Frame};
    use crate::compositor::Compositor;
    use crate::options::CameraOptions;
    use crate::state::SessionState;

    fn composite(one: Frame, two: Frame) -> CompositeBuffer {
        let options = CameraOptions::default();
        let state = SessionState::new(&options);
        let mut compositor = Compositor::new(options);
        compositor.compose(Some(one), Some(two), &state).clone()
    }

    #[test]
    fn test_fit_wide_buffer_is_width_limited() {
        let layout = PreviewLayout::fit(1280, 480, 80, 25);
        assert_eq!(layout.x, 0);
        assert_eq!(layout.cols, 80);
        assert_eq!(layout.rows, 15);
    }

    #[test]
    fn test_fit_tall_buffer_is_centered() {
        let layout = PreviewLayout::fit(640, 480, 200, 25);
        assert_eq!(layout.cols, 64);
        assert_eq!(layout.rows, 24);
        assert_eq!(layout.x, 68);
    }

    #[test]
    fn test_fit_degenerate_sizes() {
        assert_eq!(PreviewLayout::fit(640, 480, 80, 1).cols, 0);
        assert_eq!(PreviewLayout::fit(0, 480, 80, 25).rows, 0);
    }

    #[test]
    fn test_downsample_keeps_halves_apart() {
        let buffer = composite(
            Frame::solid(CameraId::One, 40, 20, [200, 0, 0]),
            Frame::solid(CameraId::Two, 40, 20, [0, 0, 200]),
        );
        let mut colors = Vec::new();
        assert_eq!(downsample_into(&buffer, 8, 4, &mut colors), 32);
        // Second row sits clear of the info box and border
        assert_eq!(colors[8 + 2], [200, 0, 0]);
        assert_eq!(colors[8 + 6], [0, 0, 200]);
    }

    #[test]
    fn test_downsample_upscales_without_gaps() {
        let buffer = composite(
            Frame::solid(CameraId::One, 2, 2, [9, 9, 9]),
            Frame::solid(CameraId::Two, 2, 2, [9, 9, 9]),
        );
        let mut colors = Vec::new();
        downsample_into(&buffer, 16, 8, &mut colors);
        assert_eq!(colors.len(), 128);
    }

    #[test]
    fn test_draw_writes_picture_and_status() {
        let buffer = composite(
            Frame::solid(CameraId::One, 64, 48, [10, 10, 10]),
            Frame::solid(CameraId::Two, 64, 48, [20, 20, 20]),
        );
        let status = StatusLine {
            active_camera: CameraId::One,
            preview_enabled: true,
            notice: Some("Image saved as x.png".to_string()),
        };
        let mut out = Vec::new();
        draw(&mut out, &buffer, &status, 40, 12).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains(HALF_BLOCK));
        assert!(text.contains("Image saved as x.png"));
    }

    #[test]
    fn test_fit_width_pads_and_truncates() {
        assert_eq!(fit_width("abc", 5), "abc  ");
        assert_eq!(fit_width("abcdef", 3), "abc");
    }
}
