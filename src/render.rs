// src/render.rs
//! Leaderboard → PNG.
//!
//! Fixed-width canvas, 8×8 bitmap glyphs scaled up (no font files needed at runtime).
//! Layout: title, "Player" / count-label header, then one row per entry with
//! rank, name and a right-aligned count; every second row sits on a darker band.
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};

use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{ImageFormat, Rgba, RgbaImage};

use crate::board::Leaderboard;
use crate::config::RenderOptions;
use crate::error::RenderError;
use crate::file;

pub const WIDTH: u32 = 900;
pub const HEADER_LABEL: &str = "Player";

const GLYPH: u32 = 8;
const MARGIN_X: u32 = 24;
const TITLE_Y: u32 = 18;
const TITLE_SCALE: u32 = 4;
const HEADER_Y: u32 = 80;
const ROW_SCALE: u32 = 3;
pub const FIRST_ROW_Y: u32 = HEADER_Y + 42;
pub const ROW_STEP: u32 = 48;
const TEXT_DY: u32 = 4;
const BAND_TOP: u32 = 6;
const BAND_BOTTOM: u32 = 38;
pub const BAND_INSET: u32 = 16;
const BOTTOM_PAD: u32 = 18;
const COUNT_RIGHT: u32 = WIDTH - 40;
const COUNT_LABEL_X: u32 = WIDTH - 220;
const NAME_GAP: u32 = 16;

/// Height of a header-only image.
pub const MIN_HEIGHT: u32 = FIRST_ROW_Y + BOTTOM_PAD;

pub const BG: Rgba<u8> = Rgba([18, 18, 22, 255]);
pub const BAND: Rgba<u8> = Rgba([32, 32, 38, 255]);
const FG: Rgba<u8> = Rgba([255, 255, 255, 255]);
const HEADER_FG: Rgba<u8> = Rgba([200, 200, 200, 255]);

pub fn image_height(rows: usize) -> u32 {
    MIN_HEIGHT + rows as u32 * ROW_STEP
}

pub fn render(board: &Leaderboard, opts: &RenderOptions) -> RgbaImage {
    let rows = &board.rows()[..board.len().min(opts.max_rows)];
    let mut img = RgbaImage::from_pixel(WIDTH, image_height(rows.len()), BG);

    let title = clip(&opts.title, TITLE_SCALE, WIDTH - 2 * MARGIN_X);
    draw_text(&mut img, MARGIN_X, TITLE_Y, &title, TITLE_SCALE, FG);

    draw_text(&mut img, MARGIN_X, HEADER_Y, HEADER_LABEL, ROW_SCALE, HEADER_FG);
    let label = clip(&opts.count_label, ROW_SCALE, COUNT_RIGHT - COUNT_LABEL_X);
    draw_text(&mut img, COUNT_LABEL_X, HEADER_Y, &label, ROW_SCALE, HEADER_FG);

    let mut y = FIRST_ROW_Y;
    for (i, row) in rows.iter().enumerate() {
        let rank = i + 1;
        if rank % 2 == 0 {
            fill_rect(&mut img, BAND_INSET, y - BAND_TOP, WIDTH - BAND_INSET, y + BAND_BOTTOM, BAND);
        }

        let count = row.count.to_string();
        let count_x = COUNT_RIGHT.saturating_sub(text_width(&count, ROW_SCALE));
        let room = count_x.saturating_sub(MARGIN_X + NAME_GAP);
        let label = clip(&format!("{rank:>2}. {}", row.name), ROW_SCALE, room);

        draw_text(&mut img, MARGIN_X, y + TEXT_DY, &label, ROW_SCALE, FG);
        draw_text(&mut img, count_x, y + TEXT_DY, &count, ROW_SCALE, FG);
        y += ROW_STEP;
    }
    img
}

pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)?;
    Ok(buf.into_inner())
}

/// Render, encode, and atomically replace the artifact at `opts.out_path`.
/// On any error the previous artifact is left untouched.
pub fn write_artifact(board: &Leaderboard, opts: &RenderOptions) -> Result<PathBuf, RenderError> {
    let bytes = encode_png(&render(board, opts))?;
    file::write_atomic(&opts.out_path, &bytes)
        .map_err(|source| RenderError::Write { path: opts.out_path.clone(), source })?;
    Ok(opts.out_path.clone())
}

/// Current artifact bytes, `None` before anything was written.
pub fn current_artifact(path: &Path) -> io::Result<Option<Vec<u8>>> {
    match std::fs::read(path) {
        Ok(b) => Ok(Some(b)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Operator override: replace the artifact outside the refresh cycle.
/// The next successful cycle overwrites it again.
pub fn replace_artifact(path: &Path, bytes: &[u8]) -> io::Result<()> {
    file::write_atomic(path, bytes)
}

pub fn text_width(text: &str, scale: u32) -> u32 {
    text.chars().count() as u32 * GLYPH * scale
}

/// Cut `text` to `max_w` pixels, marking the cut with "..".
fn clip(text: &str, scale: u32, max_w: u32) -> String {
    let fit = (max_w / (GLYPH * scale)) as usize;
    let n = text.chars().count();
    if n <= fit {
        return text.to_string();
    }
    if fit < 3 {
        return text.chars().take(fit).collect();
    }
    let mut out: String = text.chars().take(fit - 2).collect();
    out.push_str("..");
    out
}

fn glyph(c: char) -> [u8; 8] {
    let c = match c {
        '\u{2013}' | '\u{2014}' => '-',
        '\u{2018}' | '\u{2019}' => '\'',
        '\u{201C}' | '\u{201D}' => '"',
        other => other,
    };
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}

fn draw_text(img: &mut RgbaImage, x: u32, y: u32, text: &str, scale: u32, color: Rgba<u8>) {
    let mut pen = x;
    for c in text.chars() {
        for (gy, bits) in glyph(c).iter().enumerate() {
            for gx in 0..GLYPH {
                if bits & (1 << gx) != 0 {
                    let px = pen + gx * scale;
                    let py = y + gy as u32 * scale;
                    fill_rect(img, px, py, px + scale, py + scale, color);
                }
            }
        }
        pen += GLYPH * scale;
    }
}

/// Half-open `[x0, x1) × [y0, y1)`, clipped to the canvas.
fn fill_rect(img: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    for py in y0.min(h)..y1.min(h) {
        for px in x0.min(w)..x1.min(w) {
            img.put_pixel(px, py, color);
        }
    }
}
