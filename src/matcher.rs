//! Similarity between two analysed fingerprints.
//!
//! The score mixes a fixed pattern term (same class or not) with the share of minutiae that
//! have a same-kind partner within a few pixels on the other print. Only the leading minutiae of
//! each list are compared, which bounds the cost regardless of list length.
//!
//! Matching is greedy and does not consume partners: one minutia on the second print can pair
//! with several on the first.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MatchConfig;
use crate::fingerprint::FingerprintFeatures;
use crate::minutiae::Minutia;
use crate::pattern::PatternLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchLevel {
    High,
    Medium,
    Low,
}

impl MatchLevel {
    pub fn from_score(score: f64, config: &MatchConfig) -> Self {
        if score > config.high_threshold {
            MatchLevel::High
        } else if score > config.medium_threshold {
            MatchLevel::Medium
        } else {
            MatchLevel::Low
        }
    }

    pub fn conclusion(&self) -> &'static str {
        match self {
            MatchLevel::High => {
                "Very high similarity. The two prints likely come from the same source."
            }
            MatchLevel::Medium => {
                "Moderate similarity. Further examination by a fingerprint examiner is needed."
            }
            MatchLevel::Low => {
                "Low similarity. The two prints likely come from different sources."
            }
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            MatchLevel::High => "The result may be used as supporting evidence.",
            MatchLevel::Medium => "Verify manually and take image quality into account.",
            MatchLevel::Low => "Check image quality or look for another reference print.",
        }
    }
}

impl fmt::Display for MatchLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchLevel::High => "High",
            MatchLevel::Medium => "Medium",
            MatchLevel::Low => "Low",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    /// 0 to 100.
    pub similarity_score: f64,
    pub match_level: MatchLevel,
    /// 0 to 100.
    pub pattern_similarity: f64,
    /// 0 to 100.
    pub minutiae_similarity: f64,
    pub matched_minutiae_count: usize,
}

/// The parts of a fingerprint that take part in a comparison.
#[derive(Debug, Clone, Copy)]
pub struct MatchInput<'a> {
    pub pattern: PatternLabel,
    pub minutiae: &'a [Minutia],
}

impl<'a> From<&'a FingerprintFeatures> for MatchInput<'a> {
    fn from(features: &'a FingerprintFeatures) -> Self {
        Self {
            pattern: features.pattern.label,
            minutiae: &features.minutiae,
        }
    }
}

pub fn compare_fingerprints<'a, 'b>(
    first: impl Into<MatchInput<'a>>,
    second: impl Into<MatchInput<'b>>,
) -> MatchResult {
    compare_fingerprints_with(first, second, &MatchConfig::default())
}

pub fn compare_fingerprints_with<'a, 'b>(
    first: impl Into<MatchInput<'a>>,
    second: impl Into<MatchInput<'b>>,
    config: &MatchConfig,
) -> MatchResult {
    let first = first.into();
    let second = second.into();

    let pattern_similarity = if first.pattern == second.pattern {
        config.same_pattern_similarity
    } else {
        config.different_pattern_similarity
    };

    let (matched, minutiae_similarity) = if first.minutiae.is_empty() || second.minutiae.is_empty() {
        (0, 0.)
    } else {
        let matched = count_matches(first.minutiae, second.minutiae, config);
        let longest = first.minutiae.len().max(second.minutiae.len());
        (matched, matched as f64 / longest as f64)
    };

    let score = ((pattern_similarity * config.pattern_weight
        + minutiae_similarity * config.minutiae_weight)
        * 100.)
        .clamp(0., 100.);
    let match_level = MatchLevel::from_score(score, config);

    debug!(
        score,
        %match_level,
        matched,
        first = first.minutiae.len(),
        second = second.minutiae.len(),
        "Compared fingerprints"
    );

    MatchResult {
        similarity_score: score,
        match_level,
        pattern_similarity: pattern_similarity * 100.,
        minutiae_similarity: minutiae_similarity * 100.,
        matched_minutiae_count: matched,
    }
}

/// Number of minutiae among the first `max_minutiae` of `first` that have a same-kind minutia
/// closer than `max_distance` among the first `max_minutiae` of `second`.
pub fn count_matches(first: &[Minutia], second: &[Minutia], config: &MatchConfig) -> usize {
    let candidates = &second[..second.len().min(config.max_minutiae)];
    first
        .iter()
        .take(config.max_minutiae)
        .filter(|m1| {
            candidates
                .iter()
                .any(|m2| m1.kind == m2.kind && m1.distance(m2) < config.max_distance)
        })
        .count()
}

/// A comparison together with the side-by-side facts shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub result: MatchResult,
    pub pattern_match: bool,
    pub hand_match: bool,
    pub minutiae_difference: usize,
    pub conclusion: &'static str,
    pub recommendation: &'static str,
}

impl ComparisonReport {
    pub fn new(first: &FingerprintFeatures, second: &FingerprintFeatures, config: &MatchConfig) -> Self {
        let result = compare_fingerprints_with(first, second, config);
        Self {
            result,
            pattern_match: first.pattern.label == second.pattern.label,
            hand_match: first.pattern.hand == second.pattern.hand,
            minutiae_difference: first.minutiae_count().abs_diff(second.minutiae_count()),
            conclusion: result.match_level.conclusion(),
            recommendation: result.match_level.recommendation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::minutiae::MinutiaKind::{Bifurcation, RidgeEnding};
    use approx::assert_abs_diff_eq;

    fn input(pattern: PatternLabel, minutiae: &[Minutia]) -> MatchInput<'_> {
        MatchInput { pattern, minutiae }
    }

    fn scattered(n: u32) -> Vec<Minutia> {
        (0..n)
            .map(|i| {
                let kind = if i % 2 == 0 { RidgeEnding } else { Bifurcation };
                Minutia::new(20 * (i % 10), 20 * (i / 10), kind)
            })
            .collect()
    }

    #[test]
    fn identical_prints_match_fully() {
        let minutiae = scattered(12);
        let result = compare_fingerprints(
            input(PatternLabel::Loop, &minutiae),
            input(PatternLabel::Loop, &minutiae),
        );
        assert_abs_diff_eq!(result.pattern_similarity, 100.);
        assert_abs_diff_eq!(result.minutiae_similarity, 100.);
        assert_abs_diff_eq!(result.similarity_score, 100., epsilon = 1e-9);
        assert_eq!(result.matched_minutiae_count, 12);
        assert_eq!(result.match_level, MatchLevel::High);
    }

    #[test]
    fn empty_side_scores_pattern_only() {
        let minutiae = scattered(5);

        let same = compare_fingerprints(
            input(PatternLabel::Whorl, &minutiae),
            input(PatternLabel::Whorl, &[]),
        );
        assert_eq!(same.minutiae_similarity, 0.);
        assert_eq!(same.matched_minutiae_count, 0);
        assert_abs_diff_eq!(same.similarity_score, 30., epsilon = 1e-9);
        assert_eq!(same.match_level, MatchLevel::Low);

        let different = compare_fingerprints(
            input(PatternLabel::Unknown, &[]),
            input(PatternLabel::Whorl, &minutiae),
        );
        assert_eq!(different.minutiae_similarity, 0.);
        assert_abs_diff_eq!(different.pattern_similarity, 30., epsilon = 1e-9);
        assert_abs_diff_eq!(different.similarity_score, 9., epsilon = 1e-9);
    }

    #[test]
    fn nearby_same_kind_points_match() {
        let a = [Minutia::new(10, 10, RidgeEnding)];
        let b = [Minutia::new(12, 11, RidgeEnding)];
        let result = compare_fingerprints(input(PatternLabel::Loop, &a), input(PatternLabel::Loop, &b));
        assert_eq!(result.matched_minutiae_count, 1);
        assert_abs_diff_eq!(result.minutiae_similarity, 100.);
    }

    #[test]
    fn kind_mismatch_blocks_match() {
        let a = [Minutia::new(10, 10, RidgeEnding)];
        let b = [Minutia::new(12, 11, Bifurcation)];
        let result = compare_fingerprints(input(PatternLabel::Loop, &a), input(PatternLabel::Loop, &b));
        assert_eq!(result.matched_minutiae_count, 0);
        assert_eq!(result.minutiae_similarity, 0.);
        assert_abs_diff_eq!(result.similarity_score, 30., epsilon = 1e-9);
    }

    #[test]
    fn distance_limit_is_strict() {
        let a = [Minutia::new(10, 10, RidgeEnding)];
        let b = [Minutia::new(13, 14, RidgeEnding)];
        assert_eq!(count_matches(&a, &b, &MatchConfig::default()), 0);
    }

    #[test]
    fn only_first_fifty_take_part() {
        // Fifty far-away points, then one that would match on the 51st slot.
        let mut a: Vec<Minutia> = (0..50)
            .map(|i| Minutia::new(1000 + 10 * i, 1000, RidgeEnding))
            .collect();
        a.push(Minutia::new(0, 0, RidgeEnding));
        let b = vec![Minutia::new(0, 0, RidgeEnding)];
        assert_eq!(count_matches(&a, &b, &MatchConfig::default()), 0);

        // Same on the other side: the partner sits at index 50 of the second list.
        let first = vec![Minutia::new(0, 0, RidgeEnding)];
        let mut second: Vec<Minutia> = (0..50)
            .map(|i| Minutia::new(1000 + 10 * i, 1000, RidgeEnding))
            .collect();
        second.push(Minutia::new(0, 0, RidgeEnding));
        let result = compare_fingerprints(
            input(PatternLabel::Arch, &first),
            input(PatternLabel::Arch, &second),
        );
        assert_eq!(result.matched_minutiae_count, 0);
        assert_eq!(result.minutiae_similarity, 0.);
    }

    #[test]
    fn long_identical_lists_are_capped() {
        let minutiae = scattered(60);
        let result = compare_fingerprints(
            input(PatternLabel::Loop, &minutiae),
            input(PatternLabel::Loop, &minutiae),
        );
        assert_eq!(result.matched_minutiae_count, 50);
        assert_abs_diff_eq!(result.minutiae_similarity, 50. / 60. * 100., epsilon = 1e-9);
    }

    #[test]
    fn one_point_can_match_many() {
        let a = [
            Minutia::new(10, 10, RidgeEnding),
            Minutia::new(11, 10, RidgeEnding),
            Minutia::new(10, 11, RidgeEnding),
        ];
        let b = [Minutia::new(10, 10, RidgeEnding), Minutia::new(90, 90, Bifurcation)];
        let result = compare_fingerprints(input(PatternLabel::Loop, &a), input(PatternLabel::Loop, &b));
        assert_eq!(result.matched_minutiae_count, 3);
        assert_abs_diff_eq!(result.minutiae_similarity, 100.);
    }

    #[test]
    fn levels_use_strict_thresholds() {
        let config = MatchConfig::default();
        assert_eq!(MatchLevel::from_score(70.5, &config), MatchLevel::High);
        assert_eq!(MatchLevel::from_score(70., &config), MatchLevel::Medium);
        assert_eq!(MatchLevel::from_score(40.1, &config), MatchLevel::Medium);
        assert_eq!(MatchLevel::from_score(40., &config), MatchLevel::Low);
        assert_eq!(MatchLevel::from_score(0., &config), MatchLevel::Low);
    }

    #[test]
    fn score_stays_in_range() {
        let a = scattered(30);
        let b = scattered(7);
        for (pa, pb) in [
            (PatternLabel::Loop, PatternLabel::Loop),
            (PatternLabel::Loop, PatternLabel::Arch),
        ] {
            let result = compare_fingerprints(input(pa, &a), input(pb, &b));
            assert!((0. ..=100.).contains(&result.similarity_score));
            assert!((0. ..=100.).contains(&result.minutiae_similarity));
        }
    }
}
