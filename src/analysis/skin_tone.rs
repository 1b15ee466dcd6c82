use std::fmt;

use image::RgbImage;
use serde::Serialize;
use thiserror::Error;

const CROP_START: f64 = 0.3;
const CROP_END: f64 = 0.7;

const FAIR_THRESHOLD: f64 = 180.0;
const MEDIUM_THRESHOLD: f64 = 120.0;
const OLIVE_THRESHOLD: f64 = 80.0;

#[derive(Debug, Error)]
pub enum ImageDecodeError {
    #[error("image could not be decoded: {0}")]
    Unreadable(#[from] image::ImageError),
    #[error("image buffer is empty")]
    Empty,
    #[error("uploaded file is {0}, not an image")]
    NotAnImage(String),
    #[error("image of {width}x{height} is too small to sample a center region")]
    RegionTooSmall { width: u32, height: u32 },
}

/// Coarse skin-tone bucket, ordered from lightest to darkest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToneCategory {
    Fair,
    Medium,
    Olive,
    Deep,
}

impl ToneCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToneCategory::Fair => "Fair",
            ToneCategory::Medium => "Medium",
            ToneCategory::Olive => "Olive",
            ToneCategory::Deep => "Deep",
        }
    }

    /// Thresholds are strict: a luminance of exactly 180 is Medium, not Fair.
    pub fn from_luminance(luminance: f64) -> Self {
        if luminance > FAIR_THRESHOLD {
            ToneCategory::Fair
        } else if luminance > MEDIUM_THRESHOLD {
            ToneCategory::Medium
        } else if luminance > OLIVE_THRESHOLD {
            ToneCategory::Olive
        } else {
            ToneCategory::Deep
        }
    }
}

impl fmt::Display for ToneCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decodes uploaded bytes (JPEG, PNG or WebP) into an RGB buffer.
pub fn decode_rgb(bytes: &[u8]) -> Result<RgbImage, ImageDecodeError> {
    if bytes.is_empty() {
        return Err(ImageDecodeError::Empty);
    }
    if let Some(kind) = infer::get(bytes) {
        if !matches!(kind.matcher_type(), infer::MatcherType::Image) {
            return Err(ImageDecodeError::NotAnImage(kind.mime_type().to_string()));
        }
    }
    let decoded = image::load_from_memory(bytes)?;
    Ok(decoded.to_rgb8())
}

pub fn luminance(rgb: [f64; 3]) -> f64 {
    0.299 * rgb[0] + 0.587 * rgb[1] + 0.114 * rgb[2]
}

fn crop_bounds(length: u32) -> (u32, u32) {
    let start = (f64::from(length) * CROP_START) as u32;
    let end = (f64::from(length) * CROP_END) as u32;
    (start, end.min(length))
}

/// Mean RGB over rows and columns between 30% and 70% of the image extent.
pub fn center_crop_average(image: &RgbImage) -> Result<[f64; 3], ImageDecodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ImageDecodeError::Empty);
    }

    let (x0, x1) = crop_bounds(width);
    let (y0, y1) = crop_bounds(height);
    if x0 >= x1 || y0 >= y1 {
        return Err(ImageDecodeError::RegionTooSmall { width, height });
    }

    let mut sums = [0f64; 3];
    for y in y0..y1 {
        for x in x0..x1 {
            let pixel = image.get_pixel(x, y);
            for (sum, channel) in sums.iter_mut().zip(pixel.0) {
                *sum += f64::from(channel);
            }
        }
    }

    let count = f64::from(x1 - x0) * f64::from(y1 - y0);
    Ok(sums.map(|sum| sum / count))
}

pub fn classify(image: &RgbImage) -> Result<ToneCategory, ImageDecodeError> {
    let average = center_crop_average(image)?;
    Ok(ToneCategory::from_luminance(luminance(average)))
}
