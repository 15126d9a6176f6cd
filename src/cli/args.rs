//! CLI argument parsing with clap.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use diagram2png::config::Config;
use diagram2png::raster::MAX_PADDING;

/// Parse and validate a font size in points (> 0)
fn parse_point_size(s: &str) -> Result<f32, String> {
    let size: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(size.is_finite() && size > 0.0) {
        return Err(format!("Font size must be greater than 0, got {}", size));
    }
    Ok(size)
}

/// Parse and validate padding in pixels (0-MAX_PADDING)
fn parse_padding(s: &str) -> Result<u32, String> {
    let padding: u32 = s.parse().map_err(|_| format!("'{}' is not a valid pixel count", s))?;
    if padding > MAX_PADDING {
        return Err(format!(
            "Padding must be at most {} px, got {}",
            MAX_PADDING, padding
        ));
    }
    Ok(padding)
}

/// Render ASCII diagram text files into PNG images
#[derive(Parser, Debug)]
#[command(name = "diagram2png")]
#[command(version, about = "Render ASCII diagram text files into PNG images", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Convert docs/public/diagrams/*.txt into docs/public/images/*.png
    diagram2png

    # Use a specific font first
    diagram2png --font resources/fonts/AdwaitaMono-Regular.ttf

    # Write a commented diagram2png.toml into the project root
    diagram2png config init")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project root that relative paths resolve against (default: current directory)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Config file path (default: <root>/diagram2png.toml if present)
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Directory containing *.txt diagrams
    #[arg(long)]
    pub source: Option<PathBuf>,

    /// Directory PNG images are written to
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Font file to try before the configured candidates (repeatable)
    #[arg(long = "font", value_name = "PATH")]
    pub fonts: Vec<PathBuf>,

    /// Font size in points
    #[arg(long, value_parser = parse_point_size)]
    pub font_size: Option<f32>,

    /// Margin around each diagram in pixels
    #[arg(long, value_parser = parse_padding)]
    pub padding: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show the resolved configuration
    Show,
    /// Create a default diagram2png.toml in the project root
    Init,
}

impl Args {
    /// Apply command-line overrides on top of file configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.paths.source_dir = source.clone();
        }
        if let Some(output) = &self.output {
            config.paths.output_dir = output.clone();
        }
        if !self.fonts.is_empty() {
            let mut candidates = self.fonts.clone();
            candidates.append(&mut config.font.candidates);
            config.font.candidates = candidates;
        }
        if let Some(size) = self.font_size {
            config.font.size = size;
        }
        if let Some(padding) = self.padding {
            config.render.padding = padding;
        }
    }

    /// Log level filter selected by `-v` flags.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["diagram2png"]);
        assert!(args.command.is_none());
        assert!(args.root.is_none());
        assert!(args.config.is_none());
        assert!(args.source.is_none());
        assert!(args.output.is_none());
        assert!(args.fonts.is_empty());
        assert!(args.font_size.is_none());
        assert!(args.padding.is_none());
        assert_eq!(args.verbose, 0);
        assert_eq!(args.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_args_no_overrides_keep_config() {
        let args = Args::parse_from(["diagram2png"]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_args_fonts_prepend_candidates() {
        let args = Args::parse_from([
            "diagram2png",
            "--font",
            "/a/One.ttf",
            "--font",
            "/b/Two.ttf",
        ]);
        let mut config = Config::default();
        let defaults = config.font.candidates.clone();
        args.apply_to(&mut config);

        assert_eq!(config.font.candidates[0], PathBuf::from("/a/One.ttf"));
        assert_eq!(config.font.candidates[1], PathBuf::from("/b/Two.ttf"));
        assert_eq!(&config.font.candidates[2..], &defaults[..]);
    }

    #[test]
    fn test_args_overrides() {
        let args = Args::parse_from([
            "diagram2png",
            "--source",
            "art",
            "-o",
            "png",
            "--font-size",
            "16",
            "--padding",
            "8",
        ]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.paths.source_dir, PathBuf::from("art"));
        assert_eq!(config.paths.output_dir, PathBuf::from("png"));
        assert_eq!(config.font.size, 16.0);
        assert_eq!(config.render.padding, 8);
    }

    #[test]
    fn test_args_font_size_validation() {
        assert!(Args::try_parse_from(["diagram2png", "--font-size", "0"]).is_err());
        assert!(Args::try_parse_from(["diagram2png", "--font-size", "big"]).is_err());
        assert!(Args::try_parse_from(["diagram2png", "--font-size", "12.5"]).is_ok());
    }

    #[test]
    fn test_args_padding_validation() {
        assert!(Args::try_parse_from(["diagram2png", "--padding", "3000000000"]).is_err());
        assert!(Args::try_parse_from(["diagram2png", "--padding", "100000"]).is_err());
        assert!(Args::try_parse_from(["diagram2png", "--padding", "-1"]).is_err());
        let args = Args::try_parse_from(["diagram2png", "--padding", "1000"]).unwrap();
        assert_eq!(args.padding, Some(1000));
    }

    #[test]
    fn test_args_verbosity() {
        let args = Args::parse_from(["diagram2png", "-v"]);
        assert_eq!(args.log_level(), log::LevelFilter::Info);
        let args = Args::parse_from(["diagram2png", "-vv"]);
        assert_eq!(args.log_level(), log::LevelFilter::Debug);
    }

    #[test]
    fn test_args_config_option() {
        let args = Args::parse_from(["diagram2png", "--config", "/tmp/d2p.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/d2p.toml")));

        let args = Args::parse_from(["diagram2png", "-c", "/tmp/other.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/other.toml")));
    }

    #[test]
    fn test_args_config_show_subcommand() {
        let args = Args::parse_from(["diagram2png", "config", "show"]);
        match args.command {
            Some(Command::Config {
                action: ConfigAction::Show,
            }) => (),
            _ => panic!("Expected Config Show subcommand"),
        }
    }

    #[test]
    fn test_args_config_init_with_root() {
        let args = Args::parse_from(["diagram2png", "config", "init", "--root", "/project"]);
        assert!(matches!(
            args.command,
            Some(Command::Config {
                action: ConfigAction::Init
            })
        ));
        assert_eq!(args.root, Some(PathBuf::from("/project")));
    }
}
