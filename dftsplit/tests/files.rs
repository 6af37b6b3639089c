use std::path::Path;

use dftsplit::{
    dta, io, DftError, DftPaths, Image, NormData, Pipeline, SampleFormat, Samples,
    TransformOptions,
};

fn pipeline(no_clobber: bool) -> Pipeline {
    Pipeline::new(TransformOptions {
        parallel: true,
        no_clobber,
    })
}

fn write_source(path: &Path, width: usize, height: usize) -> Image {
    let mut data = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            data.push((x * 255 / width) as u8);
            data.push((y * 255 / height) as u8);
            data.push(if (x / 4 + y / 4) % 2 == 0 { 30 } else { 220 });
        }
    }
    let image = Image::new(width, height, 3, Samples::U8(data)).unwrap();
    io::save(&image, path).unwrap();
    image
}

fn write_u16(path: &Path, width: usize, height: usize, channels: usize) {
    let image = Image::new(
        width,
        height,
        channels,
        Samples::U16(vec![1000; width * height * channels]),
    )
    .unwrap();
    io::save(&image, path).unwrap();
}

#[test]
fn forward_writes_three_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("photo.png");
    write_source(&source, 20, 14);

    let paths = DftPaths::from_original(&source);
    let output = pipeline(true).dft_forward(&paths).unwrap();

    assert_eq!(output.magnitude, dir.path().join("photo.mag.png"));
    assert_eq!(output.phase, dir.path().join("photo.phs.png"));
    assert_eq!(output.metadata, dir.path().join("photo.dta"));

    let magnitude = io::load(&output.magnitude).unwrap();
    let phase = io::load(&output.phase).unwrap();
    assert_eq!(magnitude.format(), SampleFormat::U16);
    assert_eq!(magnitude.channels(), 3);
    // 14 pads to 15
    assert_eq!(magnitude.dimensions(), (20, 15));
    assert_eq!(phase.dimensions(), magnitude.dimensions());

    let norms = dta::read_file(&output.metadata).unwrap();
    assert_eq!(norms.len(), 3);
    let text = std::fs::read_to_string(&output.metadata).unwrap();
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn forward_then_inverse_rebuilds_the_image() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("tiles.png");
    let original = write_source(&source, 16, 16);

    let paths = DftPaths::from_original(&source);
    let pipeline = pipeline(true);
    pipeline.dft_forward(&paths).unwrap();

    let written = pipeline.dft_inverse(&paths).unwrap();
    // the source exists, so the rebuilt image gets a fresh name
    assert_eq!(written, dir.path().join("tiles-1.png"));

    let rebuilt = io::load(&written).unwrap();
    assert_eq!(rebuilt.format(), SampleFormat::U16);
    assert_eq!(rebuilt.dimensions(), (16, 16));
    assert_eq!(rebuilt.channels(), 3);

    let (Samples::U8(before), Samples::U16(after)) = (original.samples(), rebuilt.samples()) else {
        panic!("unexpected sample formats");
    };
    for channel in 0..3 {
        let values: Vec<f64> = before.iter().skip(channel).step_by(3).map(|&v| v as f64).collect();
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        for (value, out) in values.iter().zip(after.iter().skip(channel).step_by(3)) {
            let expected = (value - min) / (max - min) * 65535.0;
            assert!(
                (expected - *out as f64).abs() < 300.0,
                "channel {channel}: expected {expected}, got {out}"
            );
        }
    }
}

#[test]
fn overwrite_replaces_existing_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("again.png");
    write_source(&source, 8, 8);
    let paths = DftPaths::from_original(&source);

    pipeline(false).dft_forward(&paths).unwrap();
    let second = pipeline(false).dft_forward(&paths).unwrap();
    assert_eq!(second.magnitude, dir.path().join("again.mag.png"));

    let third = pipeline(true).dft_forward(&paths).unwrap();
    assert_eq!(third.magnitude, dir.path().join("again.mag-1.png"));
}

#[test]
fn inverse_rejects_mismatched_images() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DftPaths::from_original(dir.path().join("odd.png"));
    write_u16(&paths.magnitude, 100, 100, 1);
    write_u16(&paths.phase, 100, 99, 1);
    dta::write_file(&paths.metadata, &[NormData::new(0.0, 1.0, 0.0, 1.0)]).unwrap();

    let err = pipeline(true).dft_inverse(&paths).unwrap_err();
    assert!(matches!(err, DftError::DimensionMismatch(_)));
    assert!(err.to_string().contains("need to be same size"));
    assert!(!paths.original.exists());
}

#[test]
fn inverse_rejects_metadata_for_other_channel_count() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DftPaths::from_original(dir.path().join("count.png"));
    write_u16(&paths.magnitude, 8, 8, 3);
    write_u16(&paths.phase, 8, 8, 3);
    dta::write_file(&paths.metadata, &[NormData::new(0.0, 1.0, 0.0, 1.0)]).unwrap();

    let err = pipeline(true).dft_inverse(&paths).unwrap_err();
    assert!(matches!(
        err,
        DftError::MetadataCountMismatch {
            expected: 3,
            found: 1
        }
    ));
}

#[test]
fn inverse_rejects_malformed_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DftPaths::from_original(dir.path().join("bad.png"));
    write_u16(&paths.magnitude, 4, 4, 1);
    write_u16(&paths.phase, 4, 4, 1);
    std::fs::write(&paths.metadata, "0 1 two 3\n").unwrap();

    let err = pipeline(true).dft_inverse(&paths).unwrap_err();
    assert!(matches!(err, DftError::MalformedMetadata { line: 1, .. }));
}

#[test]
fn inverse_requires_sixteen_bit_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DftPaths::from_original(dir.path().join("eight.png"));
    let eight = Image::new(4, 4, 1, Samples::U8(vec![9; 16])).unwrap();
    io::save(&eight, &paths.magnitude).unwrap();
    io::save(&eight, &paths.phase).unwrap();

    let err = pipeline(true).dft_inverse(&paths).unwrap_err();
    assert!(matches!(err, DftError::Decode { .. }));
}

#[test]
fn forward_reports_missing_source() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DftPaths::from_original(dir.path().join("missing.png"));

    let err = pipeline(true).dft_forward(&paths).unwrap_err();
    assert!(matches!(err, DftError::Io(_)));
    assert!(!paths.magnitude.exists());
}

#[test]
fn repeated_forward_keeps_each_set_together() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("p.png");
    let paths = DftPaths::from_original(&source);
    let pipeline = pipeline(true);

    write_source(&source, 12, 10);
    let first = pipeline.dft_forward(&paths).unwrap();
    let first_norms = dta::read_file(&first.metadata).unwrap();

    write_source(&source, 10, 12);
    let second = pipeline.dft_forward(&paths).unwrap();
    assert_eq!(second.magnitude, dir.path().join("p.mag-1.png"));
    assert_eq!(second.phase, dir.path().join("p.phs-1.png"));
    assert_eq!(second.metadata, dir.path().join("p-1.dta"));

    // the default names still hold the first run's consistent set
    assert_eq!(dta::read_file(&paths.metadata).unwrap(), first_norms);
    assert_ne!(dta::read_file(&second.metadata).unwrap(), first_norms);

    let rebuilt = io::load(&pipeline.dft_inverse(&paths).unwrap()).unwrap();
    assert_eq!(rebuilt.dimensions(), (12, 10));
}
