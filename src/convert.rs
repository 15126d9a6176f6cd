//! Per-file conversion and the sequential batch driver.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::{ImageError, ImageFormat, RgbImage};

use crate::config::Config;
use crate::error::Error;
use crate::font::{load_font, FontHandle};
use crate::layout::{measure, split_lines};
use crate::raster::{rasterize, RenderSettings};

/// Prefix of every console notice.
pub const NOTICE_PREFIX: &str = "[diagram2png]";

/// File name suffix of input diagrams.
pub const DIAGRAM_SUFFIX: &str = ".txt";

/// Render diagram text to an in-memory image.
pub fn render_text(
    font: &FontHandle,
    text: &str,
    settings: &RenderSettings,
) -> Result<RgbImage, Error> {
    let lines = split_lines(text);
    let metrics = measure(font, &lines, settings.line_spacing)?;
    rasterize(font, &lines, &metrics, settings)
}

/// Read a diagram file, replacing invalid UTF-8 with U+FFFD.
pub fn read_diagram(path: &Path) -> Result<String, Error> {
    let bytes = std::fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// `<output_dir>/<stem>.png`
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let mut name = input
        .file_stem()
        .unwrap_or(input.as_os_str())
        .to_os_string();
    name.push(".png");
    output_dir.join(name)
}

/// Convert one diagram into a PNG in `output_dir`, overwriting any existing
/// file. Returns the path written.
pub fn convert_file(
    font: &FontHandle,
    settings: &RenderSettings,
    input: &Path,
    output_dir: &Path,
) -> Result<PathBuf, Error> {
    let started = Instant::now();
    let text = read_diagram(input)?;
    let image = render_text(font, &text, settings)?;
    let out = output_path_for(input, output_dir);

    image
        .save_with_format(&out, ImageFormat::Png)
        .map_err(|e| match e {
            ImageError::IoError(source) => Error::io(&out, source),
            source => Error::Encode {
                path: out.clone(),
                source,
            },
        })?;

    log::debug!(
        "Rendered {} ({}x{}) in {:?}",
        input.display(),
        image.width(),
        image.height(),
        started.elapsed()
    );
    Ok(out)
}

/// List `*.txt` files in `dir`, sorted byte-wise by file name.
///
/// Matching is on the name suffix, so a file called just `.txt` counts.
/// A missing directory yields an empty list.
pub fn find_diagrams(dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("Source directory {} does not exist", dir.display());
            return Ok(Vec::new());
        }
        Err(e) => return Err(Error::io(dir, e)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(dir, e))?;
        let path = entry.path();
        if !entry.file_name().to_string_lossy().ends_with(DIAGRAM_SUFFIX) {
            continue;
        }
        // `is_file` follows symlinks, so linked diagrams are included.
        if path.is_file() {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Directories a batch run works with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPaths {
    /// Project root; notices print output paths relative to it.
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl BatchPaths {
    fn display_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }
}

/// Outcome of a completed batch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// PNGs written, in processing order.
    pub generated: Vec<PathBuf>,
}

/// Converts every diagram in a directory, one at a time.
pub struct Batch<'a> {
    font: &'a FontHandle,
    settings: &'a RenderSettings,
    paths: &'a BatchPaths,
}

impl<'a> Batch<'a> {
    pub fn new(font: &'a FontHandle, settings: &'a RenderSettings, paths: &'a BatchPaths) -> Self {
        Self {
            font,
            settings,
            paths,
        }
    }

    /// Run the batch, writing one notice per generated file to `out`.
    ///
    /// The output directory is created first, even if there is nothing to
    /// convert. The first failure aborts the run.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<BatchReport, Error> {
        let output_dir = &self.paths.output_dir;
        std::fs::create_dir_all(output_dir).map_err(|e| Error::io(output_dir, e))?;

        let inputs = find_diagrams(&self.paths.source_dir)?;
        if inputs.is_empty() {
            writeln!(
                out,
                "{} No {} files in {}",
                NOTICE_PREFIX,
                DIAGRAM_SUFFIX,
                self.paths.source_dir.display()
            )
            .map_err(Error::Console)?;
            return Ok(BatchReport::default());
        }

        log::info!(
            "Converting {} diagram(s) from {}",
            inputs.len(),
            self.paths.source_dir.display()
        );

        let mut report = BatchReport::default();
        for input in &inputs {
            let written = convert_file(self.font, self.settings, input, output_dir)?;
            writeln!(
                out,
                "{} generated {}",
                NOTICE_PREFIX,
                self.paths.display_path(&written).display()
            )
            .map_err(Error::Console)?;
            report.generated.push(written);
        }

        Ok(report)
    }
}

/// Load the font described by `config` and convert every diagram under
/// `root`.
///
/// The font is resolved before anything touches the filesystem, so a
/// missing font leaves the output directory untouched.
pub fn run<W: Write>(config: &Config, root: &Path, out: &mut W) -> Result<BatchReport, Error> {
    config.validate()?;
    let settings = config.render_settings()?;
    let font = load_font(&config.font_sources(root), config.font.size)?;
    let paths = config.batch_paths(root);
    Batch::new(&font, &settings, &paths).run(out)
}
