use ndarray::{Array2, Zip};
use num_complex::Complex;
use tracing::debug;

use super::SpectralTransform;
use crate::{
    types::NormData,
    util::{dequantize, log_plane, normalize, rearrange_quadrants},
    DftError, Result,
};

/// Rebuild a channel from quantized magnitude and phase planes.
///
/// Returns the real part of the inverse transform before any re-quantization,
/// with the padded dimensions of the inputs.
pub fn reconstruct_channel<T: SpectralTransform + ?Sized>(
    magnitude: &Array2<f64>,
    phase: &Array2<f64>,
    norm: &NormData,
    transform: &T,
) -> Result<Array2<f64>> {
    if magnitude.dim() != phase.dim() {
        let ((mh, mw), (ph, pw)) = (magnitude.dim(), phase.dim());
        return Err(DftError::DimensionMismatch(format!(
            "Mag {mw}x{mh} and Phs {pw}x{ph} need to be same size"
        )));
    }

    let (height, width) = magnitude.dim();
    if width == 0 || height == 0 {
        return Err(DftError::InvalidDimensions { width, height });
    }
    debug!(width, height, "inverse channel");

    let magnitude = dequantize(magnitude, norm.mag_min, norm.mag_max);
    let phase = dequantize(phase, norm.phs_min, norm.phs_max);

    // back to the corner layout the DFT expects
    let magnitude = rearrange_quadrants(&magnitude);
    let phase = rearrange_quadrants(&phase);

    let magnitude = magnitude.mapv(|m| m.exp() - 1.0);
    log_plane("magnitude", &magnitude);

    let mut complex = Zip::from(&magnitude)
        .and(&phase)
        .map_collect(|&m, &p| Complex::from_polar(m, p));
    transform.inverse(&mut complex);

    // the imaginary part is only rounding noise
    let real = complex.mapv(|c| c.re);
    log_plane("reconstructed", &real);
    Ok(real)
}

/// Rebuild a channel and re-quantize it into `[0, 65535]` by its own min/max.
///
/// The final normalization does not restore the original sample range, so the
/// round trip is faithful in shape, not bit exact.
pub fn inverse_channel<T: SpectralTransform + ?Sized>(
    magnitude: &Array2<f64>,
    phase: &Array2<f64>,
    norm: &NormData,
    transform: &T,
) -> Result<Array2<u16>> {
    let real = reconstruct_channel(magnitude, phase, norm, transform)?;
    Ok(normalize(&real))
}
