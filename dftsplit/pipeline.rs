use std::path::{Path, PathBuf};

use ndarray::Array2;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::{
    channels::{merge, split},
    dta, io,
    transform::{forward_channel, inverse_channel, FftTransform, SpectralTransform},
    types::{ChannelSpectrum, Image, NormData, SampleFormat},
    DftError, Result,
};

pub const IMAGE_EXTENSION: &str = "png";
pub const MAGNITUDE_SUFFIX: &str = "mag";
pub const PHASE_SUFFIX: &str = "phs";
pub const METADATA_SUFFIX: &str = "dta";

/// The four files taking part in a forward/inverse run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DftPaths {
    pub original: PathBuf,
    pub magnitude: PathBuf,
    pub phase: PathBuf,
    pub metadata: PathBuf,
}

impl DftPaths {
    /// Derive every path from the original image's base name:
    /// `photo.png` gives `photo.mag.png`, `photo.phs.png` and `photo.dta`.
    pub fn from_original(original: impl Into<PathBuf>) -> Self {
        let original = original.into();
        let base = original.with_extension("");

        DftPaths {
            magnitude: with_suffix(&base, &format!("{MAGNITUDE_SUFFIX}.{IMAGE_EXTENSION}")),
            phase: with_suffix(&base, &format!("{PHASE_SUFFIX}.{IMAGE_EXTENSION}")),
            metadata: with_suffix(&base, METADATA_SUFFIX),
            original,
        }
    }

    pub fn with_magnitude(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.magnitude = path;
        }
        self
    }

    pub fn with_phase(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.phase = path;
        }
        self
    }

    pub fn with_metadata(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.metadata = path;
        }
        self
    }
}

fn with_suffix(base: &Path, suffix: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions {
    /// Transform channels on the rayon thread pool.
    pub parallel: bool,
    /// Never replace an existing output image, pick `<stem>-<n>.<ext>` instead.
    pub no_clobber: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        TransformOptions {
            parallel: true,
            no_clobber: true,
        }
    }
}

/// Result of a forward run held in memory.
#[derive(Debug, Clone)]
pub struct Decomposition {
    pub magnitude: Image,
    pub phase: Image,
    pub norms: Vec<NormData>,
}

/// Paths actually written by [`Pipeline::dft_forward`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardOutput {
    pub magnitude: PathBuf,
    pub phase: PathBuf,
    pub metadata: PathBuf,
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline<T: SpectralTransform = FftTransform> {
    transform: T,
    options: TransformOptions,
}

impl Pipeline<FftTransform> {
    pub fn new(options: TransformOptions) -> Self {
        Pipeline {
            transform: FftTransform,
            options,
        }
    }
}

impl<T: SpectralTransform> Pipeline<T> {
    pub fn with_transform(transform: T, options: TransformOptions) -> Self {
        Pipeline { transform, options }
    }

    /// Split an image into channels and decompose each into magnitude and phase.
    pub fn forward(&self, image: &Image) -> Result<Decomposition> {
        let planes = split(image);
        debug!(channels = planes.len(), "forward transform");

        let spectra: Vec<ChannelSpectrum> =
            self.map_channels(&planes, |plane| forward_channel(plane, &self.transform))?;

        let mut magnitudes: Vec<Array2<u16>> = Vec::with_capacity(spectra.len());
        let mut phases: Vec<Array2<u16>> = Vec::with_capacity(spectra.len());
        let mut norms = Vec::with_capacity(spectra.len());
        for spectrum in spectra {
            magnitudes.push(spectrum.magnitude);
            phases.push(spectrum.phase);
            norms.push(spectrum.norm);
        }

        Ok(Decomposition {
            magnitude: merge(&magnitudes)?,
            phase: merge(&phases)?,
            norms,
        })
    }

    /// Rebuild an image from its magnitude and phase images and their metadata.
    pub fn inverse(&self, magnitude: &Image, phase: &Image, norms: &[NormData]) -> Result<Image> {
        if magnitude.dimensions() != phase.dimensions()
            || magnitude.channels() != phase.channels()
        {
            let ((mw, mh), (pw, ph)) = (magnitude.dimensions(), phase.dimensions());
            return Err(DftError::DimensionMismatch(format!(
                "Mag {mw}x{mh}x{} and Phs {pw}x{ph}x{} need to be same size",
                magnitude.channels(),
                phase.channels()
            )));
        }

        if norms.len() != magnitude.channels() {
            return Err(DftError::MetadataCountMismatch {
                expected: magnitude.channels(),
                found: norms.len(),
            });
        }

        let magnitudes = split(magnitude);
        let phases = split(phase);
        debug!(channels = magnitudes.len(), "inverse transform");

        let inputs: Vec<(&Array2<f64>, &Array2<f64>, &NormData)> = magnitudes
            .iter()
            .zip(&phases)
            .zip(norms)
            .map(|((m, p), n)| (m, p, n))
            .collect();

        let restored = self.map_channels(&inputs, |&(m, p, n)| {
            inverse_channel(m, p, n, &self.transform)
        })?;

        merge(&restored)
    }

    /// Read `paths.original`, decompose it and write magnitude, phase and metadata files.
    pub fn dft_forward(&self, paths: &DftPaths) -> Result<ForwardOutput> {
        info!("Reading image {}", paths.original.display());
        let source = io::load(&paths.original)?;

        let decomposition = self.forward(&source)?;

        let output = self.forward_output(paths);

        info!("Saving magnitude {}", output.magnitude.display());
        io::save(&decomposition.magnitude, &output.magnitude)?;

        info!("Saving phase {}", output.phase.display());
        io::save(&decomposition.phase, &output.phase)?;

        info!("Saving metadata {}", output.metadata.display());
        dta::write_file(&output.metadata, &decomposition.norms)?;

        Ok(output)
    }

    /// Read magnitude, phase and metadata files and write the rebuilt image.
    pub fn dft_inverse(&self, paths: &DftPaths) -> Result<PathBuf> {
        info!("Reading magnitude {}", paths.magnitude.display());
        let magnitude = load_quantized(&paths.magnitude)?;
        info!("Reading phase {}", paths.phase.display());
        let phase = load_quantized(&paths.phase)?;

        if magnitude.dimensions() != phase.dimensions() {
            let ((mw, mh), (pw, ph)) = (magnitude.dimensions(), phase.dimensions());
            return Err(DftError::DimensionMismatch(format!(
                "Mag {mw}x{mh} and Phs {pw}x{ph} need to be same size"
            )));
        }

        info!("Reading metadata {}", paths.metadata.display());
        let norms = dta::read_file(&paths.metadata)?;

        let restored = self.inverse(&magnitude, &phase, &norms)?;

        let output = self.output_path(&paths.original);
        info!("Saving {}", output.display());
        io::save(&restored, &output)?;
        Ok(output)
    }

    fn map_channels<I, O, F>(&self, inputs: &[I], f: F) -> Result<Vec<O>>
    where
        I: Sync,
        O: Send,
        F: Fn(&I) -> Result<O> + Sync + Send,
    {
        // indexed collect keeps channel order
        if self.options.parallel {
            inputs.par_iter().map(f).collect()
        } else {
            inputs.iter().map(f).collect()
        }
    }

    /// The three forward outputs form one set, so they share a single `-<n>`
    /// suffix: the first `n` for which none of them exists yet.
    fn forward_output(&self, paths: &DftPaths) -> ForwardOutput {
        let numbered = |n| ForwardOutput {
            magnitude: numbered_file_name(&paths.magnitude, n),
            phase: numbered_file_name(&paths.phase, n),
            metadata: numbered_file_name(&paths.metadata, n),
        };

        if !self.options.no_clobber {
            return numbered(0);
        }

        (0..)
            .map(numbered)
            .find(|set| !(set.magnitude.exists() || set.phase.exists() || set.metadata.exists()))
            .unwrap_or_else(|| numbered(0))
    }

    fn output_path(&self, path: &Path) -> PathBuf {
        if self.options.no_clobber {
            safe_file_name(path)
        } else {
            path.to_path_buf()
        }
    }
}

fn load_quantized(path: &Path) -> Result<Image> {
    let image = io::load(path)?;
    if image.format() != SampleFormat::U16 {
        return Err(DftError::Decode {
            path: path.to_path_buf(),
            reason: format!("expected 16-bit samples, found {:?}", image.format()),
        });
    }
    Ok(image)
}

/// `path` if nothing exists there yet, otherwise the first free `<stem>-<n>.<ext>`.
pub fn safe_file_name(path: &Path) -> PathBuf {
    (0..)
        .map(|n| numbered_file_name(path, n))
        .find(|candidate| !candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// `<stem>-<n>.<ext>` next to `path`, or `path` itself for `n == 0`.
fn numbered_file_name(path: &Path, n: usize) -> PathBuf {
    if n == 0 {
        return path.to_path_buf();
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{n}.{}", ext.to_string_lossy()),
        None => format!("{stem}-{n}"),
    };
    path.with_file_name(name)
}
