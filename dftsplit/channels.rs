use ndarray::Array2;

use crate::{
    types::{Image, Sample, Samples},
    DftError, Result,
};

/// Split an interleaved image into one `f64` plane per channel, keeping channel order.
pub fn split(image: &Image) -> Vec<Array2<f64>> {
    let (width, height) = image.dimensions();
    let channels = image.channels();

    // resolve the sample format once, not per pixel
    match image.samples() {
        Samples::U8(data) => split_samples(data, width, height, channels),
        Samples::U16(data) => split_samples(data, width, height, channels),
        Samples::F32(data) => split_samples(data, width, height, channels),
    }
}

fn split_samples<T: Sample>(
    data: &[T],
    width: usize,
    height: usize,
    channels: usize,
) -> Vec<Array2<f64>> {
    (0..channels)
        .map(|channel| {
            Array2::from_shape_fn((height, width), |(y, x)| {
                data[(y * width + x) * channels + channel].to_f64()
            })
        })
        .collect()
}

/// Interleave equally sized planes back into an image, one channel per plane.
pub fn merge<T: Sample>(planes: &[Array2<T>]) -> Result<Image> {
    let Some(first) = planes.first() else {
        return Err(DftError::InvalidDimensions {
            width: 0,
            height: 0,
        });
    };

    let (height, width) = first.dim();
    if let Some(other) = planes.iter().find(|p| p.dim() != (height, width)) {
        let (other_height, other_width) = other.dim();
        return Err(DftError::DimensionMismatch(format!(
            "Cannot merge planes of size {width}x{height} and {other_width}x{other_height}"
        )));
    }

    let mut data = Vec::with_capacity(width * height * planes.len());
    for y in 0..height {
        for x in 0..width {
            data.extend(planes.iter().map(|plane| plane[[y, x]]));
        }
    }

    Image::new(width, height, planes.len(), T::into_samples(data))
}
