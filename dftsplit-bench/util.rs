use std::path::Path;

use dftsplit::{channels::split, util::normalize, Image};
use ndarray::s;

/// Name of the suite a file belongs to: the directory it sits in.
pub fn suite_name(file: &Path) -> Option<&str> {
    file.parent()?.to_str()
}

/// PSNR between the source, rescaled per channel to the 16-bit range, and the rebuilt image.
///
/// The rebuilt image carries transform padding, only the source area is compared,
/// rescaled by its own range.
pub fn psnr(source: &Image, rebuilt: &Image) -> f64 {
    let (width, height) = source.dimensions();
    let mut squared_error = 0.0;
    let mut count = 0usize;

    for (original, restored) in split(source).iter().zip(split(rebuilt).iter()) {
        let expected = normalize(original).mapv(f64::from);
        let restored = normalize(&restored.slice(s![..height, ..width]).to_owned()).mapv(f64::from);

        for (a, b) in expected.iter().zip(restored.iter()) {
            squared_error += (a - b).powi(2);
            count += 1;
        }
    }

    if count == 0 || squared_error == 0.0 {
        return f64::INFINITY;
    }

    let mse = squared_error / count as f64;
    10.0 * (65535.0f64.powi(2) / mse).log10()
}
