//! # Story Card CLI
//!
//! Headless host for the story card editor. Replays a recorded input
//! script against a live editor session and writes the captured card.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p storycard-cli -- --script card.json --output card.png
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Resolved paths and overrides
//! - `ScriptRunner` - Replays steps through `storycard-core`
//! - `storycard-renderer::CardExporter` rasterizes each capture

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

pub mod script;

pub use script::{ElementRef, Script, ScriptError, ScriptRunner, ScriptStep};

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use storycard_core::{EditorConfig, EditorSession, EditorState, ImageFormat, RasterImage};
use storycard_renderer::{CardExporter, ExportConfig};

/// Output encoding selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// PNG image.
    Png,
    /// JPEG image.
    Jpeg,
}

impl From<OutputFormat> for ImageFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Png => Self::Png,
            OutputFormat::Jpeg => Self::Jpeg,
        }
    }
}

/// Command-line arguments for storycard.
#[derive(Debug, Clone, Parser)]
#[command(name = "storycard")]
#[command(about = "Replay a story card editing script and export the card")]
#[command(version)]
pub struct CliArgs {
    /// Script of recorded editor input (JSON)
    #[arg(long)]
    pub script: PathBuf,

    /// Where to write the captured card (default: storycard.png, or storycard.jpg for JPEG)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Editor configuration file (JSON)
    #[arg(long, env = "STORYCARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Canvas width in logical units
    #[arg(long)]
    pub canvas_width: Option<f32>,

    /// Canvas height in logical units
    #[arg(long)]
    pub canvas_height: Option<f32>,

    /// Output image format
    #[arg(long, value_enum, default_value = "png")]
    pub format: OutputFormat,

    /// Device pixel ratio of the exported image
    #[arg(long, default_value = "3.0")]
    pub pixel_ratio: f32,

    /// Skip loading system fonts (text is not drawn)
    #[arg(long)]
    pub no_system_fonts: bool,
}

/// CLI configuration.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Script path.
    pub script: PathBuf,
    /// Output path for the final capture.
    pub output: PathBuf,
    /// Editor configuration file.
    pub config: Option<PathBuf>,
    /// Canvas width override.
    pub canvas_width: Option<f32>,
    /// Canvas height override.
    pub canvas_height: Option<f32>,
    /// Export settings.
    pub export: ExportConfig,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        let format = ImageFormat::from(args.format);
        Self {
            script: args.script,
            output: args
                .output
                .unwrap_or_else(|| PathBuf::from(format!("storycard.{}", format.extension()))),
            config: args.config,
            canvas_width: args.canvas_width,
            canvas_height: args.canvas_height,
            export: ExportConfig {
                pixel_ratio: args.pixel_ratio,
                format,
                load_system_fonts: !args.no_system_fonts,
                ..ExportConfig::default()
            },
        }
    }
}

impl CliConfig {
    /// Resolve the editor configuration: file first, then CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the result is invalid.
    pub fn editor_config(&self) -> anyhow::Result<EditorConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                EditorConfig::from_json(&json)?
            }
            None => EditorConfig::default(),
        };
        if let Some(width) = self.canvas_width {
            config.canvas_width = width;
        }
        if let Some(height) = self.canvas_height {
            config.canvas_height = height;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Steps replayed.
    pub steps: usize,
    /// Files written, in capture order.
    pub outputs: Vec<PathBuf>,
}

/// Replay the configured script and write every capture.
///
/// A script without a `capture` step is captured once at the end. With
/// several captures, all but the last are written next to the output with
/// a numeric suffix; the last always lands on the output path.
///
/// # Errors
///
/// Returns an error if the script cannot be loaded, a step fails, or an
/// image cannot be written.
pub async fn run(config: &CliConfig) -> anyhow::Result<RunSummary> {
    let editor_config = config.editor_config()?;
    let json = std::fs::read_to_string(&config.script)
        .with_context(|| format!("reading script {}", config.script.display()))?;
    let script = Script::from_json(&json)?;

    let state = EditorState::open(&editor_config, script.seed.clone())?;
    let exporter = CardExporter::new(config.export.clone());
    let runner = ScriptRunner::new(
        EditorSession::new(state),
        exporter,
        editor_config.render_tick(),
    );

    let mut steps = script.steps.clone();
    if !script.has_capture() {
        tracing::debug!("Script has no capture step, capturing at the end");
        steps.push(ScriptStep::Capture);
    }
    let captures = runner.run(&steps).await?;

    let mut outputs = Vec::with_capacity(captures.len());
    for (index, image) in captures.iter().enumerate() {
        let path = if index + 1 == captures.len() {
            config.output.clone()
        } else {
            numbered_path(&config.output, index + 1)
        };
        write_image(&path, image)?;
        outputs.push(path);
    }

    Ok(RunSummary {
        steps: script.steps.len(),
        outputs,
    })
}

/// `out/card.png` → `out/card-2.png`.
fn numbered_path(path: &Path, index: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(|| "storycard".into(), std::ffi::OsStr::to_string_lossy);
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{index}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{index}"),
    };
    path.with_file_name(name)
}

fn write_image(path: &Path, image: &RasterImage) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(path, &image.bytes).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(
        "Wrote {}x{} card to {}",
        image.width,
        image.height,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_into_config() {
        let args = CliArgs::parse_from([
            "storycard",
            "--script",
            "card.json",
            "--format",
            "jpeg",
            "--canvas-width",
            "300",
            "--no-system-fonts",
        ]);
        let config = CliConfig::from(args);
        assert_eq!(config.output, PathBuf::from("storycard.jpg"));
        assert_eq!(config.export.format, ImageFormat::Jpeg);
        assert!(!config.export.load_system_fonts);

        let editor = config.editor_config().expect("editor config");
        assert!((editor.canvas_width - 300.0).abs() < f32::EPSILON);
        assert!((editor.canvas_height - 640.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_default_output_is_png() {
        let args = CliArgs::parse_from(["storycard", "--script", "card.json"]);
        assert_eq!(CliConfig::from(args).output, PathBuf::from("storycard.png"));
    }

    #[test]
    fn test_explicit_output_kept_for_any_format() {
        let args = CliArgs::parse_from([
            "storycard",
            "--script",
            "card.json",
            "--format",
            "jpeg",
            "--output",
            "share/card.jpeg",
        ]);
        assert_eq!(CliConfig::from(args).output, PathBuf::from("share/card.jpeg"));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let args = CliArgs::parse_from(["storycard", "--script", "s.json", "--canvas-height", "0"]);
        assert!(CliConfig::from(args).editor_config().is_err());
    }

    #[test]
    fn test_numbered_path() {
        assert_eq!(
            numbered_path(Path::new("out/card.png"), 2),
            PathBuf::from("out/card-2.png")
        );
        assert_eq!(numbered_path(Path::new("card"), 1), PathBuf::from("card-1"));
    }
}
