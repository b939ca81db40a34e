//! Classical fingerprint feature extraction and comparison.
//!
//! ```text
//! image -> preprocess -> binary mask -> extract_minutiae   -> minutiae + skeleton
//!                                    -> classify_pattern  -> pattern + hand
//! two feature sets -> compare_fingerprints -> match result
//! ```
//!
//! All stages are pure functions over in-memory images. Every tunable lives in
//! [`AnalyzerConfig`]; each stage has a plain form using the defaults and a `_with` form taking
//! explicit configuration.
//!
//! The classification and matching rules are crude heuristics and make no claim of forensic
//! accuracy.

pub mod config;
pub mod error;
pub mod finger;
pub mod fingerprint;
pub mod linalg;
pub mod mask;
pub mod matcher;
pub mod minutiae;
pub mod overlay;
pub mod pattern;
pub mod preprocess;
pub mod skeleton;

pub use config::AnalyzerConfig;
pub use error::{Error, Result};
pub use finger::{predict_finger, Finger, FingerPrediction};
pub use fingerprint::{FingerprintFeatures, FingerprintSummary};
pub use mask::{BinaryMask, SkeletonMask};
pub use matcher::{compare_fingerprints, ComparisonReport, MatchLevel, MatchResult};
pub use minutiae::{extract_minutiae, Minutia, MinutiaKind};
pub use pattern::{classify_pattern, Hand, PatternClassification, PatternLabel};
pub use preprocess::{preprocess, Preprocessed};

#[cfg(test)]
fn ridge_image(width: u32, height: u32, cx: f64, cy: f64) -> image::DynamicImage {
    use image::{Rgb, RgbImage};

    let img = RgbImage::from_fn(width, height, |x, y| {
        let d = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
        if (d / 4.).floor() as i64 % 2 == 0 {
            Rgb([40, 40, 40])
        } else {
            Rgb([210, 210, 210])
        }
    });
    image::DynamicImage::ImageRgb8(img)
}

#[test]
fn pipeline_on_ring_pattern() {
    let image = ridge_image(64, 48, 32., 24.);
    let features = FingerprintFeatures::extract(&image).unwrap();

    assert_eq!(features.dimensions(), (64, 48));
    assert_eq!(features.skeleton.dimensions(), (64, 48));
    assert_eq!(features.channels, 3);
    for m in features.minutiae.iter() {
        assert!(m.x > 0 && m.x < 63);
        assert!(m.y > 0 && m.y < 47);
        assert!(features.skeleton.get(m.x, m.y));
    }
    assert!((0. ..=1.).contains(&features.pattern.confidence));
    assert!((0. ..=2.).contains(&features.pattern.hand_confidence));
}

#[test]
fn pipeline_is_deterministic() {
    let image = ridge_image(40, 40, 12., 30.);
    let a = FingerprintFeatures::extract(&image).unwrap();
    let b = FingerprintFeatures::extract(&image).unwrap();
    assert_eq!(a.minutiae, b.minutiae);
    assert_eq!(a.pattern, b.pattern);
    assert_eq!(a.skeleton, b.skeleton);
}

#[cfg(test)]
fn parallel_lines() -> BinaryMask {
    let mut mask = BinaryMask::new(40, 40);
    for y in [5, 12, 19, 26, 33] {
        for x in 5..=30 {
            mask.set(x, y, true);
        }
    }
    mask
}

#[test]
fn print_matches_itself() {
    let mask = parallel_lines();
    let (minutiae, _) = extract_minutiae(&mask);
    assert_eq!(minutiae.len(), 10);
    assert!(minutiae.iter().all(|m| m.kind == MinutiaKind::RidgeEnding));

    let input = matcher::MatchInput {
        pattern: classify_pattern(&mask).label,
        minutiae: &minutiae,
    };
    let result = compare_fingerprints(input, input);

    assert_eq!(result.pattern_similarity, 100.);
    assert_eq!(result.minutiae_similarity, 100.);
    assert_eq!(result.matched_minutiae_count, 10);
    assert!((result.similarity_score - 100.).abs() < 1e-9);
    assert_eq!(result.match_level, MatchLevel::High);
}

#[test]
fn dense_print_matches_its_first_minutiae() {
    let image = ridge_image(64, 64, 20., 40.);
    let features = FingerprintFeatures::extract(&image).unwrap();
    let n = features.minutiae_count();

    let result = compare_fingerprints(&features, &features);
    assert_eq!(result.pattern_similarity, 100.);
    assert_eq!(result.matched_minutiae_count, n.min(50));
    let expected = match n {
        0 => 0.,
        n => n.min(50) as f64 / n as f64 * 100.,
    };
    assert!((result.minutiae_similarity - expected).abs() < 1e-9);
    assert!(result.similarity_score >= 30.);
}

#[test]
fn comparison_report_and_summary() {
    let config = AnalyzerConfig::default();
    let reference = FingerprintFeatures::extract(&ridge_image(48, 48, 24., 24.)).unwrap();
    let latent = FingerprintFeatures::extract(&ridge_image(48, 48, 10., 10.)).unwrap();

    let report = ComparisonReport::new(&reference, &latent, &config.matching);
    assert_eq!(
        report.minutiae_difference,
        reference.minutiae_count().abs_diff(latent.minutiae_count())
    );
    assert_eq!(report.pattern_match, reference.pattern.label == latent.pattern.label);
    assert_eq!(report.conclusion, report.result.match_level.conclusion());

    let summary = reference.summary(&config);
    assert_eq!((summary.width, summary.height), (48, 48));
    assert_eq!(summary.minutiae_count, reference.minutiae_count());
    assert_eq!(summary.minutiae.total(), summary.minutiae_count);
    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"minutiae_count\""));
}

#[test]
fn blank_image_degrades_gracefully() {
    let flat = image::DynamicImage::ImageLuma8(image::GrayImage::from_pixel(
        30,
        30,
        image::Luma([128]),
    ));
    let features = FingerprintFeatures::extract(&flat).unwrap();
    assert_eq!(features.channels, 1);
    assert_eq!(features.dimensions(), (30, 30));
    assert!((0. ..=1.).contains(&features.pattern.confidence));

    // A print without minutiae only scores on its pattern.
    let empty = matcher::MatchInput {
        pattern: features.pattern.label,
        minutiae: &[],
    };
    let result = compare_fingerprints(empty, &features);
    assert_eq!(result.matched_minutiae_count, 0);
    assert_eq!(result.minutiae_similarity, 0.);
    assert!((result.similarity_score - 30.).abs() < 1e-9);
    assert_eq!(result.match_level, MatchLevel::Low);
}
