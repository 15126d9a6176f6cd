//! Configuration file handling for diagram2png.
//!
//! Settings are read from `diagram2png.toml` in the project root, or from a
//! path given with `--config`. Every key is optional; missing keys take the
//! built-in defaults.

use image::Rgb;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::convert::BatchPaths;
use crate::font::{FontSource, DEFAULT_POINT_SIZE};
use crate::layout::{DEFAULT_LINE_SPACING, MAX_LINE_SPACING};
use crate::raster::{RenderSettings, DEFAULT_PADDING, MAX_PADDING};

/// File name looked up in the project root when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "diagram2png.toml";

pub const DEFAULT_SOURCE_DIR: &str = "docs/public/diagrams";
pub const DEFAULT_OUTPUT_DIR: &str = "docs/public/images";

/// Font files tried in order when the config does not list any.
pub const DEFAULT_FONT_CANDIDATES: &[&str] = &[
    "resources/fonts/AdwaitaMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/Library/Fonts/DejaVuSansMono.ttf",
];

/// Configuration file structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub font: FontConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct PathsConfig {
    /// Directory scanned for `*.txt` diagrams, relative to the project root.
    pub source_dir: PathBuf,
    /// Directory PNGs are written to, relative to the project root.
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FontConfig {
    /// Font files tried in order; relative paths resolve against the root.
    pub candidates: Vec<PathBuf>,
    /// Font size in points (pixels per em).
    pub size: f32,
    /// Fall back to the bundled DejaVu Sans Mono after all candidates.
    pub embedded_fallback: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
            size: DEFAULT_POINT_SIZE,
            embedded_fallback: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    pub padding: u32,
    pub line_spacing: u32,
    /// Text colour as `#rrggbb`.
    pub foreground: String,
    /// Canvas colour as `#rrggbb`.
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            line_spacing: DEFAULT_LINE_SPACING,
            foreground: "#000000".to_string(),
            background: "#ffffff".to_string(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid font size {0}: must be a positive number")]
    InvalidFontSize(f32),
    #[error("Invalid padding {0}: must be at most {max} px", max = MAX_PADDING)]
    InvalidPadding(u32),
    #[error("Invalid line spacing {0}: must be at most {max} px", max = MAX_LINE_SPACING)]
    InvalidLineSpacing(u32),
    #[error("Invalid colour '{0}': expected #rrggbb")]
    InvalidColor(String),
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `<root>/diagram2png.toml`
    /// is used if present, otherwise the defaults.
    pub fn load(path: Option<&Path>, root: &Path) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let local = default_path(root);
                if !local.exists() {
                    log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, root.display());
                    return Ok(Config::default());
                }
                local
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::ParseError { source, .. } => ConfigError::ParseError {
                path: path.clone(),
                source,
            },
            other => other,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate TOML content.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.font.size.is_finite() && self.font.size > 0.0) {
            return Err(ConfigError::InvalidFontSize(self.font.size));
        }
        if self.render.padding > MAX_PADDING {
            return Err(ConfigError::InvalidPadding(self.render.padding));
        }
        if self.render.line_spacing > MAX_LINE_SPACING {
            return Err(ConfigError::InvalidLineSpacing(self.render.line_spacing));
        }
        self.render_settings().map(|_| ())
    }

    /// Font sources in resolution order.
    pub fn font_sources(&self, root: &Path) -> Vec<FontSource> {
        let mut sources: Vec<FontSource> = self
            .font
            .candidates
            .iter()
            .map(|p| FontSource::File(root.join(p)))
            .collect();
        if self.font.embedded_fallback {
            sources.push(FontSource::Embedded);
        }
        sources
    }

    pub fn render_settings(&self) -> Result<RenderSettings, ConfigError> {
        Ok(RenderSettings {
            padding: self.render.padding,
            line_spacing: self.render.line_spacing,
            foreground: parse_color(&self.render.foreground)?,
            background: parse_color(&self.render.background)?,
        })
    }

    /// Source and output directories resolved against `root`.
    pub fn batch_paths(&self, root: &Path) -> BatchPaths {
        BatchPaths {
            root: root.to_path_buf(),
            source_dir: root.join(&self.paths.source_dir),
            output_dir: root.join(&self.paths.output_dir),
        }
    }
}

/// Parse `#rrggbb` (the leading `#` is optional).
pub fn parse_color(s: &str) -> Result<Rgb<u8>, ConfigError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidColor(s.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ConfigError::InvalidColor(s.to_string()))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

/// Get the default config file path for a project root.
pub fn default_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Commented template written by `diagram2png config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r##"# diagram2png configuration

[paths]
# Directory scanned for *.txt diagrams (relative to the project root)
source_dir = "docs/public/diagrams"
# Directory PNG images are written to
output_dir = "docs/public/images"

[font]
# Monospaced font files, tried in order; the first one that loads is used
candidates = [
    "resources/fonts/AdwaitaMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
]
# Font size in points
size = 14.0
# Use the bundled DejaVu Sans Mono if no candidate loads
embedded_fallback = false

[render]
# Margin around the diagram in pixels
padding = 30
# Extra pixels between lines
line_spacing = 4
foreground = "#000000"
background = "#ffffff"
"##;
