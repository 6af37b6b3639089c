use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use dftsplit::{pipeline::IMAGE_EXTENSION, DftPaths, Pipeline, TransformOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "dftsplit",
    version,
    about = "Split images into frequency magnitude and phase, and put them back together"
)]
pub struct Cli {
    /// Log every transform stage
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decompose an image into magnitude and phase components.
    ///
    /// Writes <base>.mag.png, <base>.phs.png and <base>.dta unless told otherwise.
    Forward {
        /// Source image
        source: PathBuf,

        #[command(flatten)]
        files: FileArgs,
    },

    /// Recompose an image from magnitude and phase components.
    ///
    /// Expects <base>.mag.png, <base>.phs.png and <base>.dta next to <base>.
    Inverse {
        /// Base name or original file name of the image to rebuild
        base: PathBuf,

        #[command(flatten)]
        files: FileArgs,
    },
}

#[derive(Debug, Args)]
pub struct FileArgs {
    /// Magnitude image file
    #[arg(short = 'm', long = "mag", value_name = "FILE")]
    pub magnitude: Option<PathBuf>,

    /// Phase image file
    #[arg(short = 'p', long = "phs", value_name = "FILE")]
    pub phase: Option<PathBuf>,

    /// Range data file
    #[arg(short = 'd', long = "dta", value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Replace existing output images instead of picking a new name
    #[arg(long)]
    pub overwrite: bool,

    /// Transform channels one after another on the current thread
    #[arg(long)]
    pub serial: bool,
}

impl FileArgs {
    fn options(&self) -> TransformOptions {
        TransformOptions {
            parallel: !self.serial,
            no_clobber: !self.overwrite,
        }
    }

    fn paths(&self, original: PathBuf) -> DftPaths {
        DftPaths::from_original(original)
            .with_magnitude(self.magnitude.clone())
            .with_phase(self.phase.clone())
            .with_metadata(self.metadata.clone())
    }
}

pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // ignore a second init, e.g. from tests
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Forward { source, files } => {
            require_files(&[&source])?;

            let paths = files.paths(source);
            let output = Pipeline::new(files.options())
                .dft_forward(&paths)
                .with_context(|| {
                    format!("forward transform of {} failed", paths.original.display())
                })?;

            info!(
                "Wrote {}, {} and {}",
                output.magnitude.display(),
                output.phase.display(),
                output.metadata.display()
            );
        }
        Command::Inverse { base, files } => {
            let paths = files.paths(inverse_target(base));
            require_files(&[&paths.magnitude, &paths.phase, &paths.metadata])?;

            let output = Pipeline::new(files.options())
                .dft_inverse(&paths)
                .with_context(|| {
                    format!("inverse transform of {} failed", paths.magnitude.display())
                })?;

            info!("Wrote {}", output.display());
        }
    }

    Ok(())
}

/// A bare base name has no image format to save to, give it the default extension.
fn inverse_target(base: PathBuf) -> PathBuf {
    if base.extension().is_some() {
        base
    } else {
        base.with_extension(IMAGE_EXTENSION)
    }
}

fn require_files(files: &[&Path]) -> Result<()> {
    let missing: Vec<String> = files
        .iter()
        .filter(|f| !f.exists())
        .map(|f| f.display().to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let mut usage = Cli::command();
    eprintln!("{}", usage.render_usage());
    bail!("missing input file(s): {}", missing.join(", "))
}
