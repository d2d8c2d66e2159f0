//! Draw a text block back into a greyscale bitmap.

use crate::{LutsciiError, Result};
use fontdue::Font;
use image::{GrayImage, Luma};

pub const DEFAULT_BACKGROUND: u8 = 20;
pub const DEFAULT_FOREGROUND: u8 = 255;
pub const DEFAULT_FONT_SIZE: f32 = 10.0;

/// Extra pixels between rendered rows.
const ROW_PADDING: u32 = 1;

/// Pixel size of one character cell: `(width, height)`.
///
/// The width is the widest advance among the glyphs in `text`, so wide
/// palettes get double-width cells.
pub fn cell_size(text: &str, font: &Font, font_size: f32) -> Result<(u32, u32)> {
    let line = font
        .horizontal_line_metrics(font_size)
        .ok_or_else(|| LutsciiError::Font("font has no horizontal line metrics".into()))?;
    let advance = text
        .chars()
        .filter(|&c| c != '\n')
        .map(|c| font.metrics(c, font_size).advance_width)
        .fold(font.metrics(' ', font_size).advance_width, f32::max);
    let width = (advance.ceil() as u32).max(1);
    let height = (line.new_line_size.ceil() as u32).max(1) + ROW_PADDING;
    Ok((width, height))
}

/// Render `text` with one glyph per cell on a flat background.
pub fn text_to_image(
    text: &str,
    font: &Font,
    font_size: f32,
    background: u8,
    foreground: u8,
) -> Result<GrayImage> {
    let (cell_w, cell_h) = cell_size(text, font, font_size)?;
    let rows: Vec<&str> = text.lines().collect();
    let cols = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0) as u32;

    let mut img = GrayImage::from_pixel(
        (cols * cell_w).max(1),
        (rows.len() as u32 * cell_h).max(1),
        Luma([background]),
    );
    let ascent = font
        .horizontal_line_metrics(font_size)
        .map_or(font_size, |m| m.ascent)
        .ceil() as i32;

    for (row, line) in rows.iter().enumerate() {
        let baseline = row as i32 * cell_h as i32 + ascent;
        for (col, ch) in line.chars().enumerate() {
            let (metrics, bitmap) = font.rasterize(ch, font_size);
            if metrics.width == 0 || metrics.height == 0 {
                continue;
            }
            let x_offset = col as i32 * cell_w as i32 + metrics.xmin;
            let y_offset = baseline - metrics.height as i32 - metrics.ymin;

            for sy in 0..metrics.height {
                for sx in 0..metrics.width {
                    let tx = x_offset + sx as i32;
                    let ty = y_offset + sy as i32;
                    if tx >= 0 && tx < img.width() as i32 && ty >= 0 && ty < img.height() as i32 {
                        let coverage = bitmap[sy * metrics.width + sx] as i32;
                        let bg = background as i32;
                        let val = bg + (foreground as i32 - bg) * coverage / 255;
                        img.put_pixel(tx as u32, ty as u32, Luma([val as u8]));
                    }
                }
            }
        }
    }

    Ok(img)
}

/// Pixel size of the rendered image, without drawing it.
pub fn image_size(text: &str, font: &Font, font_size: f32) -> Result<(u32, u32)> {
    let (cell_w, cell_h) = cell_size(text, font, font_size)?;
    let (rows, cols) = crate::convert::text_size(text);
    Ok(((cols as u32 * cell_w).max(1), (rows as u32 * cell_h).max(1)))
}
