//! Tunable constants for every stage of the analysis.
//!
//! The thresholds and probability tables are heuristics, not measured values, so they live here
//! as data. A whole [`AnalyzerConfig`] can be loaded from JSON; fields missing from the file keep
//! their defaults.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::finger::Finger;
use crate::pattern::PatternLabel;

/// Every tunable used by the pipeline, grouped by stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub preprocess: PreprocessConfig,
    pub classifier: ClassifierConfig,
    pub matching: MatchConfig,
    pub patterns: PatternTable,
    pub fingers: FingerPriors,
}

impl AnalyzerConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<&Self> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// 3x3 sharpening kernel, row-major.
    pub sharpen_kernel: [f32; 9],
    /// Side of the square neighbourhood used for the adaptive threshold. Must be odd.
    pub block_size: u32,
    /// Subtracted from the local mean to get the per-pixel threshold.
    pub offset: i32,
    /// Chebyshev radius of the closing structuring element (1 = 3x3 all-ones).
    pub closing_radius: u8,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            sharpen_kernel: [-1., -1., -1., -1., 9., -1., -1., -1., -1.],
            block_size: 11,
            offset: 2,
            closing_radius: 1,
        }
    }
}

/// `min(base + value * slope, cap)`, then clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceRule {
    pub base: f64,
    pub slope: f64,
    pub cap: f64,
}

impl ConfidenceRule {
    pub fn apply(&self, value: f64) -> f64 {
        (self.base + value * self.slope).min(self.cap).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Average eccentricity strictly above this is a loop.
    pub loop_threshold: f64,
    /// Average eccentricity strictly above this (and not a loop) is an arch.
    pub arch_threshold: f64,
    /// Applied to the average eccentricity.
    pub loop_confidence: ConfidenceRule,
    /// Applied to the average eccentricity.
    pub arch_confidence: ConfidenceRule,
    /// Applied to `1 - average eccentricity`.
    pub whorl_confidence: ConfidenceRule,
    /// Confidence reported when nothing could be measured.
    pub fallback_confidence: f64,
    /// Added to each half's pixel count when computing ridge density.
    pub density_epsilon: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            loop_threshold: 0.85,
            arch_threshold: 0.70,
            loop_confidence: ConfidenceRule {
                base: 0.8,
                slope: 0.2,
                cap: 0.95,
            },
            arch_confidence: ConfidenceRule {
                base: 0.7,
                slope: 0.3,
                cap: 0.90,
            },
            whorl_confidence: ConfidenceRule {
                base: 0.75,
                slope: 0.25,
                cap: 0.92,
            },
            fallback_confidence: 0.5,
            density_epsilon: 1e-6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Only this many leading minutiae of each list take part in matching.
    pub max_minutiae: usize,
    /// Two minutiae closer than this (in pixels) can match.
    pub max_distance: f64,
    pub same_pattern_similarity: f64,
    pub different_pattern_similarity: f64,
    pub pattern_weight: f64,
    pub minutiae_weight: f64,
    /// Scores strictly above this are a high match.
    pub high_threshold: f64,
    /// Scores strictly above this (and not high) are a medium match.
    pub medium_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_minutiae: 50,
            max_distance: 5.0,
            same_pattern_similarity: 1.0,
            different_pattern_similarity: 0.3,
            pattern_weight: 0.3,
            minutiae_weight: 0.7,
            high_threshold: 70.0,
            medium_threshold: 40.0,
        }
    }
}

/// Share of occurrences on each hand.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandRatio {
    pub right: f64,
    pub left: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternProfile {
    pub description: String,
    /// Fingers this pattern shows up on most often.
    pub common_fingers: Vec<Finger>,
    pub hand_ratio: HandRatio,
}

/// Reference information for each pattern class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatternTable {
    profiles: BTreeMap<PatternLabel, PatternProfile>,
}

impl PatternTable {
    pub fn new(profiles: BTreeMap<PatternLabel, PatternProfile>) -> Self {
        Self { profiles }
    }

    pub fn get(&self, label: PatternLabel) -> Option<&PatternProfile> {
        self.profiles.get(&label)
    }

    pub fn common_fingers(&self, label: PatternLabel) -> &[Finger] {
        self.get(label)
            .map(|p| p.common_fingers.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        let profile = |description: &str, common_fingers: Vec<Finger>, right: f64, left: f64| {
            PatternProfile {
                description: description.to_string(),
                common_fingers,
                hand_ratio: HandRatio { right, left },
            }
        };

        let mut profiles = BTreeMap::new();
        profiles.insert(
            PatternLabel::Loop,
            profile(
                "Ridges curve back on themselves like a loop",
                vec![Finger::Index, Finger::Middle, Finger::Ring],
                0.65,
                0.35,
            ),
        );
        profiles.insert(
            PatternLabel::Whorl,
            profile(
                "Spiral or concentric ridges",
                vec![Finger::Thumb, Finger::Middle],
                0.5,
                0.5,
            ),
        );
        profiles.insert(
            PatternLabel::Arch,
            profile(
                "Ridges enter on one side and leave on the other in a gentle arch",
                vec![Finger::Thumb, Finger::Little],
                0.45,
                0.55,
            ),
        );
        profiles.insert(
            PatternLabel::TentedArch,
            profile(
                "Arch with a sharp upward spike at the centre",
                vec![Finger::Index],
                0.4,
                0.6,
            ),
        );
        Self { profiles }
    }
}

/// Prior finger probabilities and the minutiae-count adjustments applied to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerPriors {
    /// Starting weights. The order breaks ties when picking the most likely finger.
    pub base: Vec<(Finger, f64)>,
    /// Added to each of the detected pattern's common fingers.
    pub common_finger_bonus: f64,
    /// Minutiae counts strictly above this apply `dense_bonus`.
    pub dense_threshold: usize,
    pub dense_bonus: Vec<(Finger, f64)>,
    /// Minutiae counts strictly below this apply `sparse_bonus`.
    pub sparse_threshold: usize,
    pub sparse_bonus: Vec<(Finger, f64)>,
}

impl Default for FingerPriors {
    fn default() -> Self {
        Self {
            base: vec![
                (Finger::Thumb, 0.15),
                (Finger::Index, 0.20),
                (Finger::Middle, 0.20),
                (Finger::Ring, 0.20),
                (Finger::Little, 0.15),
                (Finger::Unknown, 0.10),
            ],
            common_finger_bonus: 0.1,
            dense_threshold: 50,
            dense_bonus: vec![(Finger::Thumb, 0.1), (Finger::Middle, 0.05)],
            sparse_threshold: 30,
            sparse_bonus: vec![(Finger::Little, 0.1)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn confidence_rule_caps_and_clamps() {
        let rule = ConfidenceRule {
            base: 0.8,
            slope: 0.2,
            cap: 0.95,
        };
        assert_abs_diff_eq!(rule.apply(0.5), 0.9, epsilon = 1e-12);
        assert_abs_diff_eq!(rule.apply(1.0), 0.95, epsilon = 1e-12);

        let wild = ConfidenceRule {
            base: 2.0,
            slope: 1.0,
            cap: 5.0,
        };
        assert_abs_diff_eq!(wild.apply(1.0), 1.0);
    }

    #[test]
    fn pattern_table_has_all_classes() {
        let table = PatternTable::default();
        assert!(table.get(PatternLabel::Loop).is_some());
        assert!(table.get(PatternLabel::Whorl).is_some());
        assert!(table.get(PatternLabel::Arch).is_some());
        assert!(table.get(PatternLabel::TentedArch).is_some());
        assert!(table.get(PatternLabel::Unknown).is_none());
        assert!(table.common_fingers(PatternLabel::Unknown).is_empty());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let json = r#"{ "matching": { "max_minutiae": 10 } }"#;
        let config: AnalyzerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.matching.max_minutiae, 10);
        assert_eq!(config.matching.max_distance, 5.0);
        assert_eq!(config.preprocess, PreprocessConfig::default());
        assert_eq!(config.patterns, PatternTable::default());
    }

    #[test]
    fn config_file_read_write() {
        let path = std::env::temp_dir().join(format!(
            "fingerprint-analyzer-config-test-{}.json",
            std::process::id()
        ));
        let mut config = AnalyzerConfig::default();
        config.classifier.loop_threshold = 0.9;
        config.to_file(&path).unwrap();

        let read = AnalyzerConfig::from_file(&path).unwrap();
        assert_abs_diff_eq!(read.classifier.loop_threshold, 0.9, epsilon = 1e-12);
        assert_eq!(read.matching.max_minutiae, 50);
        assert_eq!(read.preprocess.block_size, 11);
        assert_eq!(
            read.patterns.common_fingers(PatternLabel::Whorl),
            &[Finger::Thumb, Finger::Middle]
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(AnalyzerConfig::from_file("./does/not/exist.json").is_err());
    }
}
