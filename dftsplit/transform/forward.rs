use ndarray::Array2;
use num_complex::Complex;
use tracing::debug;

use super::SpectralTransform;
use crate::{
    types::{ChannelSpectrum, NormData},
    util::{log_plane, min_max, optimal_dft_size, pad, quantize, rearrange_quadrants},
    DftError, Result,
};

/// Decompose one channel into quantized log-magnitude and phase planes.
///
/// The channel is zero-padded to sizes the transform handles efficiently, so the
/// output planes can be larger than the input.
pub fn forward_channel<T: SpectralTransform + ?Sized>(
    channel: &Array2<f64>,
    transform: &T,
) -> Result<ChannelSpectrum> {
    let (height, width) = channel.dim();
    if width == 0 || height == 0 {
        return Err(DftError::InvalidDimensions { width, height });
    }

    let (padded_height, padded_width) = (optimal_dft_size(height), optimal_dft_size(width));
    debug!(width, height, padded_width, padded_height, "forward channel");

    let padded = pad(channel, padded_height, padded_width);
    log_plane("padded", &padded);

    let mut complex = padded.mapv(|v| Complex::new(v, 0.0));
    transform.forward(&mut complex);

    let (magnitude, phase) = to_polar(&complex);
    // log scale since magnitude has a huge range, +1 keeps ln away from zero
    let magnitude = magnitude.mapv(|m| (m + 1.0).ln());
    log_plane("log magnitude", &magnitude);
    log_plane("phase", &phase);

    let (mag_min, mag_max) = min_max(&magnitude);
    let (phs_min, phs_max) = min_max(&phase);
    let norm = NormData::new(mag_min, mag_max, phs_min, phs_max);

    // the DFT leaves low frequencies in the corners, move them to the center
    let magnitude = rearrange_quadrants(&magnitude);
    let phase = rearrange_quadrants(&phase);

    Ok(ChannelSpectrum {
        magnitude: quantize(&magnitude, mag_min, mag_max),
        phase: quantize(&phase, phs_min, phs_max),
        norm,
    })
}

fn to_polar(complex: &Array2<Complex<f64>>) -> (Array2<f64>, Array2<f64>) {
    let magnitude = complex.mapv(|c| c.norm());
    let phase = complex.mapv(|c| {
        // signed zeros would give +-pi
        if c.re == 0.0 && c.im == 0.0 {
            0.0
        } else {
            c.im.atan2(c.re)
        }
    });
    (magnitude, phase)
}
