//! Error types for diagram conversion.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Font families suggested when no candidate font could be loaded.
pub const SUGGESTED_FONTS: &[&str] = &["NotoSansMono", "DejaVuSansMono"];

/// Errors that abort a conversion run.
///
/// There is no partial-failure policy: the first error ends the batch.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No font source in the candidate chain could be loaded.
    #[error("{}", font_not_found_message(.tried))]
    FontNotFound { tried: Vec<String> },

    /// Reading an input, creating the output directory or writing a PNG failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image encoder rejected the canvas.
    #[error("Failed to encode PNG '{}': {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The measured diagram does not fit in a canvas we are willing to allocate.
    #[error(
        "Diagram canvas of {width}x{height} px exceeds the limit of {} pixels",
        crate::raster::MAX_CANVAS_PIXELS
    )]
    CanvasTooLarge { width: u64, height: u64 },

    /// Progress notices could not be written.
    #[error("Failed to write progress notice: {0}")]
    Console(#[source] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

fn font_not_found_message(tried: &[String]) -> String {
    let mut msg = String::from("No suitable monospaced font found.\n");
    if !tried.is_empty() {
        msg.push_str("Tried:\n");
        for source in tried {
            msg.push_str(&format!("  - {}\n", source));
        }
    }
    msg.push_str("Install one of:\n");
    for name in SUGGESTED_FONTS {
        msg.push_str(&format!("  • {}\n", name));
    }
    msg.push_str("Or add a font path to [font] candidates in diagram2png.toml (or pass --font)");
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_not_found_lists_tried_sources() {
        let err = Error::FontNotFound {
            tried: vec!["/a/Mono.ttf".to_string(), "/b/Mono.otf".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("No suitable monospaced font found."));
        assert!(msg.contains("  - /a/Mono.ttf"));
        assert!(msg.contains("  - /b/Mono.otf"));
        assert!(msg.contains("NotoSansMono"));
        assert!(msg.contains("DejaVuSansMono"));
        assert!(msg.contains("[font] candidates"));
    }

    #[test]
    fn test_font_not_found_without_sources() {
        let msg = Error::FontNotFound { tried: vec![] }.to_string();
        assert!(!msg.contains("Tried:"));
        assert!(msg.contains("Install one of:"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = Error::io(
            "/tmp/missing.txt",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.txt"));
        assert!(msg.contains("gone"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
