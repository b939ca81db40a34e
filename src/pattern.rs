//! Heuristic pattern class and hand prediction from a binary ridge mask.
//!
//! The pattern class comes from the average eccentricity of the ridge contours: elongated
//! contours suggest a loop, moderately elongated an arch, round ones a whorl. The hand comes from
//! which half of the image holds more ridge pixels. Neither is a real forensic classifier.

use std::fmt;

use imageproc::contours::{find_contours, Contour};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ClassifierConfig;
use crate::linalg::CentralMoments;
use crate::mask::BinaryMask;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PatternLabel {
    Loop,
    Whorl,
    Arch,
    TentedArch,
    Unknown,
}

impl fmt::Display for PatternLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternLabel::Loop => "Loop",
            PatternLabel::Whorl => "Whorl",
            PatternLabel::Arch => "Arch",
            PatternLabel::TentedArch => "Tented Arch",
            PatternLabel::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
    Unknown,
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Hand::Left => "Left",
            Hand::Right => "Right",
            Hand::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternClassification {
    pub label: PatternLabel,
    /// Always within [0, 1].
    pub confidence: f64,
    pub hand: Hand,
    /// Twice the difference in ridge density between the two halves. Ranges over [0, 2].
    pub hand_confidence: f64,
}

impl PatternClassification {
    pub fn unknown(confidence: f64) -> Self {
        Self {
            label: PatternLabel::Unknown,
            confidence,
            hand: Hand::Unknown,
            hand_confidence: confidence,
        }
    }
}

pub fn classify_pattern(binary: &BinaryMask) -> PatternClassification {
    classify_pattern_with(binary, &ClassifierConfig::default())
}

pub fn classify_pattern_with(binary: &BinaryMask, config: &ClassifierConfig) -> PatternClassification {
    let contours: Vec<Contour<i32>> = find_contours(binary.as_image());
    if contours.is_empty() {
        debug!("No contours found, pattern unknown");
        return PatternClassification::unknown(config.fallback_confidence);
    }

    let eccentricity = average_eccentricity(&contours);
    let (label, confidence) = classify_eccentricity(eccentricity, config);
    let (hand, hand_confidence) = predict_hand(binary, config);

    debug!(
        contours = contours.len(),
        eccentricity,
        %label,
        confidence,
        %hand,
        hand_confidence,
        "Classified pattern"
    );

    PatternClassification {
        label,
        confidence,
        hand,
        hand_confidence,
    }
}

/// Mean eccentricity over all contours; 0 when there are none.
pub fn average_eccentricity(contours: &[Contour<i32>]) -> f64 {
    if contours.is_empty() {
        return 0.;
    }
    let total: f64 = contours
        .iter()
        .map(|c| {
            CentralMoments::of(c.points.iter().map(|p| (p.x as f64, p.y as f64)))
                .map(|m| m.eccentricity())
                .unwrap_or(0.)
        })
        .sum();
    total / contours.len() as f64
}

/// First matching rule wins; thresholds are strict.
pub fn classify_eccentricity(eccentricity: f64, config: &ClassifierConfig) -> (PatternLabel, f64) {
    if eccentricity > config.loop_threshold {
        (PatternLabel::Loop, config.loop_confidence.apply(eccentricity))
    } else if eccentricity > config.arch_threshold {
        (PatternLabel::Arch, config.arch_confidence.apply(eccentricity))
    } else {
        (
            PatternLabel::Whorl,
            config.whorl_confidence.apply(1. - eccentricity),
        )
    }
}

/**
 * Compares ridge density in the left and right halves of the mask. The denser half names the
 * hand (ties go left); the confidence is twice the density difference and is not clamped.
 */
pub fn predict_hand(binary: &BinaryMask, config: &ClassifierConfig) -> (Hand, f64) {
    let moments = RasterMoments::of(binary);
    if moments.m00 == 0. {
        return (Hand::Unknown, config.fallback_confidence);
    }

    let (width, height) = binary.dimensions();
    let split = width / 2;
    let left_pixels = (split as f64) * (height as f64);
    let right_pixels = ((width - split) as f64) * (height as f64);

    let left_density =
        binary.count_in_columns(0, split) as f64 / (left_pixels + config.density_epsilon);
    let right_density =
        binary.count_in_columns(split, width) as f64 / (right_pixels + config.density_epsilon);

    let hand = if right_density > left_density {
        Hand::Right
    } else {
        Hand::Left
    };
    debug!(?moments, left_density, right_density, "Predicted hand");
    (hand, (left_density - right_density).abs() * 2.)
}

/// Raw image moments of the foreground, each ridge pixel weighted 1.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RasterMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl RasterMoments {
    pub fn of(mask: &BinaryMask) -> Self {
        let mut moments = Self {
            m00: 0.,
            m10: 0.,
            m01: 0.,
        };
        for (x, y, p) in mask.as_image().enumerate_pixels() {
            if p.0[0] != 0 {
                moments.m00 += 1.;
                moments.m10 += x as f64;
                moments.m01 += y as f64;
            }
        }
        moments
    }

    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0. {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}
