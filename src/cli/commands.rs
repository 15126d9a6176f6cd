//! Handlers for the default conversion run and the config subcommands.

use std::io::Write;
use std::path::{Path, PathBuf};

use super::args::{Args, ConfigAction};
use diagram2png::config::{default_path, Config, DEFAULT_CONFIG_TEMPLATE};
use diagram2png::convert;
use diagram2png::Error;

/// Resolve the project root: `--root` or the current directory.
pub fn project_root(args: &Args) -> Result<PathBuf, Error> {
    match &args.root {
        Some(root) => Ok(root.clone()),
        None => std::env::current_dir().map_err(|e| Error::Io {
            path: PathBuf::from("."),
            source: e,
        }),
    }
}

/// Config file merged with command-line overrides.
pub fn resolve_config(args: &Args, root: &Path) -> Result<Config, Error> {
    let mut config = Config::load(args.config.as_deref(), root)?;
    args.apply_to(&mut config);
    config.validate()?;
    Ok(config)
}

/// Convert every diagram, printing one notice per file to stdout.
pub fn run_convert(args: &Args) -> Result<(), Error> {
    let root = project_root(args)?;
    let config = resolve_config(args, &root)?;
    let stdout = std::io::stdout();
    let report = convert::run(&config, &root, &mut stdout.lock())?;
    log::info!("Generated {} image(s)", report.generated.len());
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(args: &Args, action: &ConfigAction) -> Result<(), Error> {
    let root = project_root(args)?;
    match action {
        ConfigAction::Show => {
            let config = resolve_config(args, &root)?;
            let stdout = std::io::stdout();
            show_config(&config, args.config.as_deref(), &root, &mut stdout.lock())
                .map_err(Error::Console)
        }
        ConfigAction::Init => {
            let config_path = args.config.clone().unwrap_or_else(|| default_path(&root));
            init_config(&config_path)?;
            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}

fn show_config<W: Write>(
    config: &Config,
    explicit: Option<&Path>,
    root: &Path,
    out: &mut W,
) -> std::io::Result<()> {
    let paths = config.batch_paths(root);
    writeln!(out, "Current configuration:")?;
    writeln!(out, "  Root: {}", root.display())?;
    writeln!(out, "  Source: {}", paths.source_dir.display())?;
    writeln!(out, "  Output: {}", paths.output_dir.display())?;
    writeln!(out, "  Font size: {}pt", config.font.size)?;
    writeln!(out, "  Font candidates:")?;
    for source in config.font_sources(root) {
        writeln!(out, "    {}", source)?;
    }
    writeln!(out, "  Padding: {}px", config.render.padding)?;
    writeln!(out, "  Line spacing: {}px", config.render.line_spacing)?;
    writeln!(
        out,
        "  Colours: {} on {}",
        config.render.foreground, config.render.background
    )?;
    writeln!(out)?;

    let config_path = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_path(root));
    if config_path.exists() {
        writeln!(out, "Config file: {} (exists)", config_path.display())
    } else {
        writeln!(out, "Config file: {} (not found)", config_path.display())
    }
}

/// Write the default config template, refusing to overwrite.
fn init_config(config_path: &Path) -> Result<(), Error> {
    if config_path.exists() {
        return Err(Error::Io {
            path: config_path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "config file already exists; use 'diagram2png config show' to view it",
            ),
        });
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| Error::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    std::fs::write(config_path, DEFAULT_CONFIG_TEMPLATE).map_err(|e| Error::Io {
        path: config_path.to_path_buf(),
        source: e,
    })
}
