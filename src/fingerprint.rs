use std::path::Path;

use image::{DynamicImage, GrayImage};
use serde::Serialize;
use tracing::info;

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::finger::{predict_finger_with, FingerPrediction};
use crate::mask::{BinaryMask, SkeletonMask};
use crate::minutiae::{extract_minutiae, Minutia, MinutiaeCounts};
use crate::pattern::{classify_pattern_with, Hand, PatternClassification, PatternLabel};
use crate::preprocess::{preprocess_with, Preprocessed};

/// Everything derived from one fingerprint image.
#[derive(Clone, Debug)]
pub struct FingerprintFeatures {
    /// Channel count of the source image (1 or 3).
    pub channels: u8,
    pub grayscale: GrayImage,
    pub enhanced: GrayImage,
    pub binary: BinaryMask,
    pub skeleton: SkeletonMask,
    /// Raster order, top to bottom then left to right.
    pub minutiae: Vec<Minutia>,
    pub pattern: PatternClassification,
}

impl FingerprintFeatures {
    pub fn extract(image: &DynamicImage) -> Result<Self> {
        Self::extract_with(image, &AnalyzerConfig::default())
    }

    /**
     * Runs the full pipeline on one image: preprocess, then minutiae extraction and pattern
     * classification on the resulting binary mask.
     */
    pub fn extract_with(image: &DynamicImage, config: &AnalyzerConfig) -> Result<Self> {
        let Preprocessed {
            grayscale,
            enhanced,
            binary,
        } = preprocess_with(image, &config.preprocess)?;
        let (minutiae, skeleton) = extract_minutiae(&binary);
        let pattern = classify_pattern_with(&binary, &config.classifier);

        info!(
            width = binary.width(),
            height = binary.height(),
            minutiae = minutiae.len(),
            pattern = %pattern.label,
            hand = %pattern.hand,
            "Analysed fingerprint"
        );

        Ok(Self {
            channels: image.color().channel_count(),
            grayscale,
            enhanced,
            binary,
            skeleton,
            minutiae,
            pattern,
        })
    }

    /// Decodes an image file as 3-channel colour and analyses it.
    pub fn open<P: AsRef<Path>>(path: P, config: &AnalyzerConfig) -> Result<Self> {
        let image = image::open(path)?;
        Self::extract_with(&DynamicImage::ImageRgb8(image.to_rgb8()), config)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.binary.dimensions()
    }

    pub fn minutiae_count(&self) -> usize {
        self.minutiae.len()
    }

    pub fn minutiae_counts(&self) -> MinutiaeCounts {
        MinutiaeCounts::of(&self.minutiae)
    }

    pub fn predict_finger(&self, config: &AnalyzerConfig) -> FingerPrediction {
        predict_finger_with(
            self.pattern.label,
            self.minutiae_count(),
            &config.patterns,
            &config.fingers,
        )
    }

    pub fn summary(&self, config: &AnalyzerConfig) -> FingerprintSummary {
        let (width, height) = self.dimensions();
        FingerprintSummary {
            width,
            height,
            channels: self.channels,
            minutiae_count: self.minutiae_count(),
            minutiae: self.minutiae_counts(),
            pattern: self.pattern.label,
            pattern_confidence: self.pattern.confidence,
            pattern_description: config
                .patterns
                .get(self.pattern.label)
                .map(|p| p.description.clone()),
            hand: self.pattern.hand,
            hand_confidence: self.pattern.hand_confidence,
            finger: self.predict_finger(config),
        }
    }
}

/// Serializable overview of one analysed fingerprint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FingerprintSummary {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub minutiae_count: usize,
    pub minutiae: MinutiaeCounts,
    pub pattern: PatternLabel,
    pub pattern_confidence: f64,
    pub pattern_description: Option<String>,
    pub hand: Hand,
    pub hand_confidence: f64,
    pub finger: FingerPrediction,
}
