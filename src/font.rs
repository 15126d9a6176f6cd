//! Monospaced font loading.
//!
//! Fonts are resolved through an ordered chain of [`FontSource`]s: the first
//! source that yields a parseable TrueType/OpenType font wins. When the chain
//! is exhausted the caller gets [`Error::FontNotFound`] and no rendering
//! happens.

use std::fmt;
use std::path::PathBuf;

use ab_glyph::{Font, FontArc, PxScale, PxScaleFont};

use crate::error::Error;

/// Default font size in points.
pub const DEFAULT_POINT_SIZE: f32 = 14.0;

/// Bundled DejaVu Sans Mono, used only when the embedded fallback is enabled.
const EMBEDDED_FONT: &[u8] = include_bytes!("../fonts/DejaVuSansMono.ttf");

/// A place a font can be loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A font file on disk.
    File(PathBuf),
    /// The bundled DejaVu Sans Mono.
    Embedded,
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontSource::File(path) => write!(f, "{}", path.display()),
            FontSource::Embedded => write!(f, "<embedded DejaVu Sans Mono>"),
        }
    }
}

/// Why a single source was skipped.
#[derive(Debug, thiserror::Error)]
pub enum FontLoadError {
    #[error("cannot read font file: {0}")]
    Unreadable(#[from] std::io::Error),
    #[error("not a valid TrueType/OpenType font")]
    Invalid,
}

impl FontSource {
    fn load(&self) -> Result<FontArc, FontLoadError> {
        match self {
            FontSource::File(path) => {
                let data = std::fs::read(path)?;
                FontArc::try_from_vec(data).map_err(|_| FontLoadError::Invalid)
            }
            FontSource::Embedded => {
                FontArc::try_from_slice(EMBEDDED_FONT).map_err(|_| FontLoadError::Invalid)
            }
        }
    }
}

/// A loaded font at a fixed size.
///
/// Built once per run and passed by reference to measurement and
/// rasterization. Read-only after construction.
#[derive(Clone)]
pub struct FontHandle {
    font: FontArc,
    scale: PxScale,
    point_size: f32,
    source: FontSource,
}

impl fmt::Debug for FontHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontHandle")
            .field("source", &self.source)
            .field("point_size", &self.point_size)
            .field("scale", &self.scale)
            .finish()
    }
}

impl FontHandle {
    /// Load a font from a single source.
    pub fn from_source(source: &FontSource, point_size: f32) -> Result<Self, FontLoadError> {
        let font = source.load()?;
        let scale = em_scale(&font, point_size);
        Ok(Self {
            font,
            scale,
            point_size,
            source: source.clone(),
        })
    }

    pub fn font(&self) -> &FontArc {
        &self.font
    }

    pub fn scale(&self) -> PxScale {
        self.scale
    }

    /// The font paired with its pixel scale, for metrics and glyph layout.
    pub fn scaled(&self) -> PxScaleFont<&FontArc> {
        self.font.as_scaled(self.scale)
    }

    pub fn point_size(&self) -> f32 {
        self.point_size
    }

    pub fn source(&self) -> &FontSource {
        &self.source
    }
}

/// Size the font so one em spans `point_size` pixels.
///
/// `PxScale` is expressed in terms of the ascent-to-descent height, so the
/// em size has to be converted through the font's own units.
fn em_scale(font: &FontArc, point_size: f32) -> PxScale {
    let height = font.height_unscaled();
    let units_per_em = font.units_per_em().unwrap_or(height);
    PxScale::from(point_size * height / units_per_em)
}

/// Load the first usable font from `sources`, in order.
pub fn load_font(sources: &[FontSource], point_size: f32) -> Result<FontHandle, Error> {
    let mut tried = Vec::with_capacity(sources.len());

    for source in sources {
        match FontHandle::from_source(source, point_size) {
            Ok(handle) => {
                log::info!("Using font {} at {}pt", source, point_size);
                return Ok(handle);
            }
            Err(e) => {
                log::debug!("Skipping font {}: {}", source, e);
                tried.push(source.to_string());
            }
        }
    }

    Err(Error::FontNotFound { tried })
}
