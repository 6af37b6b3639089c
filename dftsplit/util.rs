use ndarray::{s, Array2};
use tracing::debug;

use crate::types::{QUANT_MAX, QUANT_MIDPOINT};

/// Smallest size `>= n` of the form `2^a * 3^b * 5^c`.
pub fn optimal_dft_size(n: usize) -> usize {
    let mut size = n.max(1);
    loop {
        let mut rest = size;
        for factor in [2, 3, 5] {
            while rest % factor == 0 {
                rest /= factor;
            }
        }
        if rest == 1 {
            return size;
        }
        size += 1;
    }
}

/// Zero-pad a plane on the bottom and right edges up to `(height, width)`.
pub fn pad(plane: &Array2<f64>, height: usize, width: usize) -> Array2<f64> {
    let (rows, cols) = plane.dim();
    debug_assert!(rows <= height && cols <= width);

    let mut padded = Array2::zeros((height, width));
    padded.slice_mut(s![..rows, ..cols]).assign(plane);
    padded
}

/// Swap diagonal quadrants so the zero frequency moves between the corners and the center.
///
/// Quadrants are `width / 2` by `height / 2`; with an odd size the last row or column
/// stays in place, which keeps the rearrangement its own inverse.
pub fn rearrange_quadrants<T: Copy>(plane: &Array2<T>) -> Array2<T> {
    let (height, width) = plane.dim();
    let (cx, cy) = (width / 2, height / 2);

    let mut out = plane.to_owned();
    // top-left <-> bottom-right
    out.slice_mut(s![..cy, ..cx])
        .assign(&plane.slice(s![cy..2 * cy, cx..2 * cx]));
    out.slice_mut(s![cy..2 * cy, cx..2 * cx])
        .assign(&plane.slice(s![..cy, ..cx]));
    // top-right <-> bottom-left
    out.slice_mut(s![..cy, cx..2 * cx])
        .assign(&plane.slice(s![cy..2 * cy, ..cx]));
    out.slice_mut(s![cy..2 * cy, ..cx])
        .assign(&plane.slice(s![..cy, cx..2 * cx]));
    out
}

/// Minimum and maximum of a plane. An empty plane yields `(0.0, 0.0)`.
pub fn min_max(plane: &Array2<f64>) -> (f64, f64) {
    if plane.is_empty() {
        return (0.0, 0.0);
    }

    plane.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
}

/// Map `[min, max]` onto `[0, 65535]`. A zero range maps every sample to the midpoint.
pub fn quantize(plane: &Array2<f64>, min: f64, max: f64) -> Array2<u16> {
    let range = max - min;
    if range == 0.0 {
        return Array2::from_elem(plane.dim(), QUANT_MIDPOINT);
    }

    plane.mapv(|v| ((v - min) / range * QUANT_MAX).round().clamp(0.0, QUANT_MAX) as u16)
}

/// Quantize using the plane's own bounds.
pub fn normalize(plane: &Array2<f64>) -> Array2<u16> {
    let (min, max) = min_max(plane);
    quantize(plane, min, max)
}

/// Map quantized samples back onto `[low, high]`.
pub fn dequantize(plane: &Array2<f64>, low: f64, high: f64) -> Array2<f64> {
    let range = high - low;
    plane.mapv(|q| low + (q / QUANT_MAX) * range)
}

pub(crate) fn log_plane(stage: &str, plane: &Array2<f64>) {
    if tracing::enabled!(tracing::Level::DEBUG) {
        let (height, width) = plane.dim();
        let (min, max) = min_max(plane);
        debug!(stage, width, height, min, max, "plane");
    }
}
