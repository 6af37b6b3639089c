use ndarray::Array2;

use crate::{DftError, Result};

// quantized magnitude and phase live in the full u16 range
pub const QUANT_MAX: f64 = 65535.0;
// value written for every sample of a plane with zero range
pub const QUANT_MIDPOINT: u16 = 32768;

/// Per-channel bounds used to quantize log-magnitude and phase.
///
/// Produced once by the forward transform and required unchanged by the inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormData {
    pub mag_min: f64,
    pub mag_max: f64,
    pub phs_min: f64,
    pub phs_max: f64,
}

impl NormData {
    pub fn new(mag_min: f64, mag_max: f64, phs_min: f64, phs_max: f64) -> Self {
        NormData {
            mag_min,
            mag_max,
            phs_min,
            phs_max,
        }
    }

    pub fn mag_range(&self) -> f64 {
        self.mag_max - self.mag_min
    }

    pub fn phs_range(&self) -> f64 {
        self.phs_max - self.phs_min
    }
}

/// Quantized frequency-domain representation of one channel.
#[derive(Debug, Clone)]
pub struct ChannelSpectrum {
    pub magnitude: Array2<u16>,
    pub phase: Array2<u16>,
    pub norm: NormData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8,
    U16,
    F32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Samples::U8(data) => data.len(),
            Samples::U16(data) => data.len(),
            Samples::F32(data) => data.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn format(&self) -> SampleFormat {
        match self {
            Samples::U8(_) => SampleFormat::U8,
            Samples::U16(_) => SampleFormat::U16,
            Samples::F32(_) => SampleFormat::F32,
        }
    }
}

/// A sample type an [`Image`] can store.
pub trait Sample: Copy + Default + Send + Sync + 'static {
    const FORMAT: SampleFormat;

    fn to_f64(self) -> f64;
    fn into_samples(data: Vec<Self>) -> Samples;
}

impl Sample for u8 {
    const FORMAT: SampleFormat = SampleFormat::U8;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn into_samples(data: Vec<Self>) -> Samples {
        Samples::U8(data)
    }
}

impl Sample for u16 {
    const FORMAT: SampleFormat = SampleFormat::U16;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn into_samples(data: Vec<Self>) -> Samples {
        Samples::U16(data)
    }
}

impl Sample for f32 {
    const FORMAT: SampleFormat = SampleFormat::F32;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }

    fn into_samples(data: Vec<Self>) -> Samples {
        Samples::F32(data)
    }
}

/// Interleaved multi-channel image, row major.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: usize,
    height: usize,
    channels: usize,
    samples: Samples,
}

impl Image {
    pub fn new(width: usize, height: usize, channels: usize, samples: Samples) -> Result<Self> {
        let expected = width * height * channels;
        if samples.len() != expected {
            return Err(DftError::InvalidSampleCount {
                expected,
                found: samples.len(),
            });
        }

        Ok(Image {
            width,
            height,
            channels,
            samples,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn format(&self) -> SampleFormat {
        self.samples.format()
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }
}
