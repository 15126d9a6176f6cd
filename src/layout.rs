//! Line splitting and text measurement for monospaced diagrams.

use ab_glyph::{point, Font, Glyph, GlyphId, ScaleFont};

use crate::error::Error;
use crate::font::FontHandle;

/// Default vertical gap between lines, in pixels.
pub const DEFAULT_LINE_SPACING: u32 = 4;

/// Largest accepted line spacing, in pixels.
pub const MAX_LINE_SPACING: u32 = 1_000;

/// Glyph pair whose bounding box defines the line box height.
pub const REFERENCE_GLYPHS: &str = "Hg";

/// Returns true for characters treated as line terminators.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split text into lines with terminators removed.
///
/// `\r\n` counts as a single break and a trailing break does not produce an
/// empty final line. Text with no lines at all yields a single empty line,
/// so a diagram is never zero rows tall.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        let mut end = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                end = j + 1;
                chars.next();
            }
        }
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    if lines.is_empty() {
        lines.push("");
    }
    lines
}

/// Position the glyphs of one line starting at `x` on `baseline`.
///
/// Returns the glyphs and the horizontal advance of the whole line
/// (advances plus pair kerning).
pub fn layout_line(font: &FontHandle, line: &str, x: f32, baseline: f32) -> (Vec<Glyph>, f32) {
    let scaled = font.scaled();
    let mut glyphs = Vec::with_capacity(line.len());
    let mut caret = x;
    let mut previous: Option<GlyphId> = None;

    for c in line.chars() {
        let mut glyph = scaled.scaled_glyph(c);
        if let Some(prev) = previous {
            caret += scaled.kern(prev, glyph.id);
        }
        glyph.position = point(caret, baseline);
        caret += scaled.h_advance(glyph.id);
        previous = Some(glyph.id);
        glyphs.push(glyph);
    }

    (glyphs, caret - x)
}

/// Rendered width of a single line in pixels.
pub fn line_width(font: &FontHandle, line: &str) -> f32 {
    layout_line(font, line, 0.0, 0.0).1
}

/// Distance from the ascender line to the lowest inked pixel of
/// [`REFERENCE_GLYPHS`].
pub fn reference_height(font: &FontHandle) -> u32 {
    let scaled = font.scaled();
    let baseline = scaled.ascent();
    let (glyphs, _) = layout_line(font, REFERENCE_GLYPHS, 0.0, baseline);

    let bottom = glyphs
        .into_iter()
        .filter_map(|glyph| font.font().outline_glyph(glyph))
        .map(|outlined| outlined.px_bounds().max.y)
        .fold(None, |acc: Option<f32>, y| Some(acc.map_or(y, |a| a.max(y))))
        // Fonts without outlines for the reference pair fall back to the
        // full ascent-to-descent height.
        .unwrap_or_else(|| scaled.ascent() - scaled.descent());

    bottom.ceil().max(0.0) as u32
}

/// Pixel dimensions of a measured diagram (without padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    /// Width of the widest line, truncated to whole pixels.
    pub max_width: u32,
    /// Height of one line box including the inter-line spacing.
    pub line_height: u32,
    /// `line_height * line_count`.
    pub total_height: u32,
    pub line_count: u32,
}

/// Measure a sequence of lines.
///
/// An empty slice is measured as one empty line. Fails with
/// [`Error::CanvasTooLarge`] when a dimension does not fit in `u32`.
pub fn measure(font: &FontHandle, lines: &[&str], line_spacing: u32) -> Result<Metrics, Error> {
    let line_count = lines.len().max(1) as u64;
    let widest = lines
        .iter()
        .map(|line| line_width(font, line))
        .fold(0.0_f32, f32::max);
    // Fractional widths are cut, not rounded up.
    let max_width = widest.max(0.0) as u64;
    let line_height = u64::from(reference_height(font)) + u64::from(line_spacing);
    let total_height = line_height.saturating_mul(line_count);

    let too_large = || Error::CanvasTooLarge {
        width: max_width,
        height: total_height,
    };
    Ok(Metrics {
        max_width: u32::try_from(max_width).map_err(|_| too_large())?,
        line_height: u32::try_from(line_height).map_err(|_| too_large())?,
        total_height: u32::try_from(total_height).map_err(|_| too_large())?,
        line_count: u32::try_from(line_count).map_err(|_| too_large())?,
    })
}
