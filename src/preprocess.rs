//! Contrast normalisation and binarisation of a raw fingerprint image.
//!
//! The stages run in a fixed order, each feeding the next:
//!
//! ```text
//! input -> grayscale -> equalize histogram -> sharpen 3x3 -> adaptive threshold -> close
//! ```

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::equalize_histogram;
use imageproc::distance_transform::Norm;
use imageproc::filter::filter3x3;
use imageproc::morphology::close;
use tracing::debug;

use crate::config::PreprocessConfig;
use crate::error::{Error, Result};
use crate::mask::{BinaryMask, BACKGROUND, FOREGROUND};

/// The three images produced by [`preprocess`].
#[derive(Clone, Debug)]
pub struct Preprocessed {
    /// Grayscale input after histogram equalisation.
    pub grayscale: GrayImage,
    /// `grayscale` after the sharpening kernel.
    pub enhanced: GrayImage,
    pub binary: BinaryMask,
}

pub fn preprocess(image: &DynamicImage) -> Result<Preprocessed> {
    preprocess_with(image, &PreprocessConfig::default())
}

pub fn preprocess_with(image: &DynamicImage, config: &PreprocessConfig) -> Result<Preprocessed> {
    validate(image)?;

    let grayscale = equalize_histogram(&image.to_luma8());
    let enhanced = sharpen(&grayscale, &config.sharpen_kernel);
    let thresholded = adaptive_threshold(&enhanced, config.block_size, config.offset);
    let binary = BinaryMask::from_gray(close(&thresholded, Norm::LInf, config.closing_radius));

    debug!(
        width = image.width(),
        height = image.height(),
        foreground = binary.count(),
        "Preprocessed image"
    );

    Ok(Preprocessed {
        grayscale,
        enhanced,
        binary,
    })
}

fn validate(image: &DynamicImage) -> Result<()> {
    if image.width() == 0 || image.height() == 0 {
        return Err(Error::InvalidImage(format!(
            "image has no pixels ({}x{})",
            image.width(),
            image.height()
        )));
    }
    let channels = image.color().channel_count();
    if channels != 1 && channels != 3 {
        return Err(Error::InvalidImage(format!(
            "expected 1 or 3 channels, found {channels}"
        )));
    }
    Ok(())
}

/// Convolves with a 3x3 kernel, saturating to the 0..=255 range. Edge pixels are repeated past
/// the border.
pub fn sharpen(gray: &GrayImage, kernel: &[f32; 9]) -> GrayImage {
    filter3x3::<_, f32, u8>(gray, kernel)
}

/// Local-mean thresholding.
///
/// A pixel becomes foreground when it is brighter than the rounded mean of the
/// `block_size` x `block_size` window around it minus `offset`. Windows reaching past the image
/// edge repeat the edge pixels.
pub fn adaptive_threshold(image: &GrayImage, block_size: u32, offset: i32) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut out = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return out;
    }

    let w = width as i64;
    let h = height as i64;
    let radius = (block_size.max(1) / 2) as i64;
    let side = 2 * radius as u64 + 1;
    let area = side * side;
    let src = image.as_raw();

    // Horizontal window sums, then vertical sums over those.
    let mut row_sums = vec![0u64; src.len()];
    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u64;
            for dx in -radius..=radius {
                let xx = (x + dx).clamp(0, w - 1);
                sum += src[(y * w + xx) as usize] as u64;
            }
            row_sums[(y * w + x) as usize] = sum;
        }
    }

    for y in 0..h {
        for x in 0..w {
            let mut sum = 0u64;
            for dy in -radius..=radius {
                let yy = (y + dy).clamp(0, h - 1);
                sum += row_sums[(yy * w + x) as usize];
            }
            let mean = ((sum + area / 2) / area) as i64;
            let value = src[(y * w + x) as usize] as i64;
            let v = if value > mean - offset as i64 {
                FOREGROUND
            } else {
                BACKGROUND
            };
            out.put_pixel(x as u32, y as u32, Luma([v]));
        }
    }
    out
}
