use std::path::Path;

use image::{
    DynamicImage, GenericImageView, ImageBuffer, ImageError, Luma, LumaA, Pixel, Rgb, Rgba,
};
use tracing::debug;

use crate::{
    types::{Image, Samples},
    DftError, Result,
};

/// Read an image file, keeping its channel count and sample depth.
pub fn load(path: &Path) -> Result<Image> {
    let decoded = image::open(path).map_err(|e| decode_error(path, e))?;
    let (width, height) = GenericImageView::dimensions(&decoded);
    let (width, height) = (width as usize, height as usize);

    let (channels, samples) = match decoded {
        DynamicImage::ImageLuma8(buf) => (1, Samples::U8(buf.into_raw())),
        DynamicImage::ImageLumaA8(buf) => (2, Samples::U8(buf.into_raw())),
        DynamicImage::ImageRgb8(buf) => (3, Samples::U8(buf.into_raw())),
        DynamicImage::ImageRgba8(buf) => (4, Samples::U8(buf.into_raw())),
        DynamicImage::ImageLuma16(buf) => (1, Samples::U16(buf.into_raw())),
        DynamicImage::ImageLumaA16(buf) => (2, Samples::U16(buf.into_raw())),
        DynamicImage::ImageRgb16(buf) => (3, Samples::U16(buf.into_raw())),
        DynamicImage::ImageRgba16(buf) => (4, Samples::U16(buf.into_raw())),
        DynamicImage::ImageRgb32F(buf) => (3, Samples::F32(buf.into_raw())),
        DynamicImage::ImageRgba32F(buf) => (4, Samples::F32(buf.into_raw())),
        other => (4, Samples::F32(other.into_rgba32f().into_raw())),
    };

    let image = Image::new(width, height, channels, samples)?;
    debug!(
        path = %path.display(),
        width,
        height,
        channels,
        format = ?image.format(),
        "loaded image"
    );
    Ok(image)
}

/// Write an image, the file format is picked from the path's extension.
pub fn save(image: &Image, path: &Path) -> Result<()> {
    let dynamic = to_dynamic(image).ok_or_else(|| DftError::Encode {
        path: path.to_path_buf(),
        reason: format!(
            "{} channel {:?} images are not supported",
            image.channels(),
            image.format()
        ),
    })?;

    dynamic.save(path).map_err(|e| match e {
        ImageError::IoError(e) => DftError::Io(e),
        other => DftError::Encode {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    })?;

    debug!(path = %path.display(), "saved image");
    Ok(())
}

fn to_dynamic(image: &Image) -> Option<DynamicImage> {
    let (Ok(width), Ok(height)) = (u32::try_from(image.width()), u32::try_from(image.height()))
    else {
        return None;
    };

    let dynamic = match (image.samples(), image.channels()) {
        (Samples::U8(data), 1) => {
            DynamicImage::ImageLuma8(buffer::<Luma<u8>>(width, height, data)?)
        }
        (Samples::U8(data), 2) => {
            DynamicImage::ImageLumaA8(buffer::<LumaA<u8>>(width, height, data)?)
        }
        (Samples::U8(data), 3) => DynamicImage::ImageRgb8(buffer::<Rgb<u8>>(width, height, data)?),
        (Samples::U8(data), 4) => {
            DynamicImage::ImageRgba8(buffer::<Rgba<u8>>(width, height, data)?)
        }
        (Samples::U16(data), 1) => {
            DynamicImage::ImageLuma16(buffer::<Luma<u16>>(width, height, data)?)
        }
        (Samples::U16(data), 2) => {
            DynamicImage::ImageLumaA16(buffer::<LumaA<u16>>(width, height, data)?)
        }
        (Samples::U16(data), 3) => {
            DynamicImage::ImageRgb16(buffer::<Rgb<u16>>(width, height, data)?)
        }
        (Samples::U16(data), 4) => {
            DynamicImage::ImageRgba16(buffer::<Rgba<u16>>(width, height, data)?)
        }
        (Samples::F32(data), 3) => {
            DynamicImage::ImageRgb32F(buffer::<Rgb<f32>>(width, height, data)?)
        }
        (Samples::F32(data), 4) => {
            DynamicImage::ImageRgba32F(buffer::<Rgba<f32>>(width, height, data)?)
        }
        _ => return None,
    };

    Some(dynamic)
}

fn buffer<P: Pixel>(
    width: u32,
    height: u32,
    data: &[P::Subpixel],
) -> Option<ImageBuffer<P, Vec<P::Subpixel>>> {
    ImageBuffer::from_raw(width, height, data.to_vec())
}

fn decode_error(path: &Path, err: ImageError) -> DftError {
    match err {
        ImageError::IoError(e) => DftError::Io(e),
        other => DftError::Decode {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SampleFormat;

    #[test]
    fn sixteen_bit_rgb_survives_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb16.png");
        let data: Vec<u16> = (0..2 * 3 * 3).map(|i| i * 3000).collect();
        let image = Image::new(2, 3, 3, Samples::U16(data)).unwrap();

        save(&image, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, image);
        assert_eq!(loaded.format(), SampleFormat::U16);
    }

    #[test]
    fn gray_eight_bit_survives_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        let image = Image::new(3, 1, 1, Samples::U8(vec![0, 128, 255])).unwrap();

        save(&image, &path).unwrap();
        assert_eq!(load(&path).unwrap(), image);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, DftError::Io(_)));
    }

    #[test]
    fn garbage_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        let err = load(&path).unwrap_err();
        assert!(matches!(err, DftError::Decode { .. }));
    }

    #[test]
    fn five_channels_cannot_be_saved() {
        let dir = tempfile::tempdir().unwrap();
        let image = Image::new(1, 1, 5, Samples::U16(vec![0; 5])).unwrap();

        let err = save(&image, &dir.path().join("five.png")).unwrap_err();
        assert!(matches!(err, DftError::Encode { .. }));
    }
}
