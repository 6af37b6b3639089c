use ndarray::Array2;
use num_complex::Complex;
use rustfft::{FftDirection, FftPlanner};

mod forward;
mod inverse;

pub use forward::forward_channel;
pub use inverse::{inverse_channel, reconstruct_channel};

pub type ComplexPlane = Array2<Complex<f64>>;

/// A 2D spectral transform operating in place on a complex plane.
///
/// `inverse` must be normalized so that `inverse(forward(x))` returns `x`
/// up to floating point error.
pub trait SpectralTransform: Sync {
    fn forward(&self, plane: &mut ComplexPlane);
    fn inverse(&self, plane: &mut ComplexPlane);
}

/// Row/column 2D DFT backed by `rustfft`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FftTransform;

impl SpectralTransform for FftTransform {
    fn forward(&self, plane: &mut ComplexPlane) {
        process_2d(plane, FftDirection::Forward);
    }

    fn inverse(&self, plane: &mut ComplexPlane) {
        process_2d(plane, FftDirection::Inverse);

        let scale = 1.0 / plane.len() as f64;
        plane.mapv_inplace(|c| c * scale);
    }
}

fn process_2d(plane: &mut ComplexPlane, direction: FftDirection) {
    let (height, width) = plane.dim();
    if height == 0 || width == 0 {
        return;
    }

    let mut planner = FftPlanner::new();
    let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(width.max(height));

    let row_fft = planner.plan_fft(width, direction);
    for mut row in plane.rows_mut() {
        buffer.clear();
        buffer.extend(row.iter().copied());
        row_fft.process(&mut buffer);
        row.iter_mut().zip(&buffer).for_each(|(dst, src)| *dst = *src);
    }

    let column_fft = planner.plan_fft(height, direction);
    for mut column in plane.columns_mut() {
        buffer.clear();
        buffer.extend(column.iter().copied());
        column_fft.process(&mut buffer);
        column
            .iter_mut()
            .zip(&buffer)
            .for_each(|(dst, src)| *dst = *src);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn forward_puts_sum_in_dc_bin() {
        let mut plane =
            Array2::from_shape_fn((3, 4), |(y, x)| Complex::new((y * 4 + x) as f64, 0.0));
        FftTransform.forward(&mut plane);

        assert_abs_diff_eq!(plane[[0, 0]].re, 66.0, epsilon = 1e-9);
        assert_abs_diff_eq!(plane[[0, 0]].im, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn inverse_undoes_forward() {
        let original = Array2::from_shape_fn((6, 5), |(y, x)| {
            Complex::new((y as f64 * 1.5 - x as f64).sin() * 40.0, 0.0)
        });
        let mut plane = original.clone();

        FftTransform.forward(&mut plane);
        FftTransform.inverse(&mut plane);

        for (a, b) in original.iter().zip(plane.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-9);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }
}
