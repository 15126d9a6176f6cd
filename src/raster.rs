//! Rasterization of measured diagram text onto an RGB canvas.

use ab_glyph::{Font, ScaleFont};
use image::{Rgb, RgbImage};

use crate::error::Error;
use crate::font::FontHandle;
use crate::layout::{layout_line, Metrics, DEFAULT_LINE_SPACING};

/// Default margin on all four sides of the canvas, in pixels.
pub const DEFAULT_PADDING: u32 = 30;

/// Largest accepted padding, in pixels.
pub const MAX_PADDING: u32 = 1_000;

/// Largest canvas allocated for one diagram (about 800 MB of RGB).
pub const MAX_CANVAS_PIXELS: u64 = 1 << 28;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Canvas layout and colours shared by every conversion in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    pub padding: u32,
    pub line_spacing: u32,
    pub foreground: Rgb<u8>,
    pub background: Rgb<u8>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            line_spacing: DEFAULT_LINE_SPACING,
            foreground: BLACK,
            background: WHITE,
        }
    }
}

impl RenderSettings {
    /// Canvas size for the given metrics: `(width, height)` including padding.
    ///
    /// Fails when either side overflows `u32` or the area exceeds
    /// [`MAX_CANVAS_PIXELS`].
    pub fn canvas_size(&self, metrics: &Metrics) -> Result<(u32, u32), Error> {
        let margin = 2 * u64::from(self.padding);
        let width = u64::from(metrics.max_width) + margin;
        let height = u64::from(metrics.total_height) + margin;

        let area = width.checked_mul(height);
        if area.map_or(true, |a| a > MAX_CANVAS_PIXELS) {
            return Err(Error::CanvasTooLarge { width, height });
        }
        match (u32::try_from(width), u32::try_from(height)) {
            (Ok(w), Ok(h)) => Ok((w, h)),
            _ => Err(Error::CanvasTooLarge { width, height }),
        }
    }
}

/// Draw `lines` onto a fresh canvas.
///
/// Lines are left-aligned at `padding`; the first line box starts at
/// `padding` from the top and each following one `line_height` lower.
/// Glyph pixels falling outside the canvas are dropped.
pub fn rasterize(
    font: &FontHandle,
    lines: &[&str],
    metrics: &Metrics,
    settings: &RenderSettings,
) -> Result<RgbImage, Error> {
    let (width, height) = settings.canvas_size(metrics)?;
    let mut canvas = RgbImage::from_pixel(width, height, settings.background);

    let ascent = font.scaled().ascent();
    let left = settings.padding as f32;

    for (row, line) in lines.iter().enumerate() {
        let top = settings.padding + row as u32 * metrics.line_height;
        let (glyphs, _) = layout_line(font, line, left, top as f32 + ascent);

        for glyph in glyphs {
            let Some(outlined) = font.font().outline_glyph(glyph) else {
                continue; // whitespace
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i64 + i64::from(gx);
                let y = bounds.min.y as i64 + i64::from(gy);
                if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                    return;
                }
                let pixel = canvas.get_pixel_mut(x as u32, y as u32);
                *pixel = blend(*pixel, settings.foreground, coverage);
            });
        }
    }

    Ok(canvas)
}

/// Mix `ink` over `base` by glyph coverage (0.0 = untouched, 1.0 = solid ink).
fn blend(base: Rgb<u8>, ink: Rgb<u8>, coverage: f32) -> Rgb<u8> {
    let c = coverage.clamp(0.0, 1.0);
    let mix = |b: u8, i: u8| (f32::from(b) + (f32::from(i) - f32::from(b)) * c).round() as u8;
    Rgb([
        mix(base[0], ink[0]),
        mix(base[1], ink[1]),
        mix(base[2], ink[2]),
    ])
}
