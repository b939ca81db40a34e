use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::mask::{BinaryMask, SkeletonMask};
use crate::skeleton::skeletonize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinutiaKind {
    /// A ridge line stops.
    RidgeEnding,
    /// A ridge line splits in two.
    Bifurcation,
}

/// A ridge feature on the skeleton. Identified only by its position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Minutia {
    pub x: u32,
    pub y: u32,
    pub kind: MinutiaKind,
    /// Radians, from the centre of the 5x5 window towards the mean of its ridge pixels.
    pub orientation: f64,
}

impl Minutia {
    pub fn new(x: u32, y: u32, kind: MinutiaKind) -> Self {
        Self {
            x,
            y,
            kind,
            orientation: 0.,
        }
    }

    pub fn distance(&self, other: &Minutia) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinutiaeCounts {
    pub ridge_endings: usize,
    pub bifurcations: usize,
}

impl MinutiaeCounts {
    pub fn of(minutiae: &[Minutia]) -> Self {
        minutiae
            .iter()
            .fold(Self::default(), |mut acc, m| {
                match m.kind {
                    MinutiaKind::RidgeEnding => acc.ridge_endings += 1,
                    MinutiaKind::Bifurcation => acc.bifurcations += 1,
                }
                acc
            })
    }

    pub fn total(&self) -> usize {
        self.ridge_endings + self.bifurcations
    }
}

/**
 * Thins the binary mask and returns every ridge ending and bifurcation found on the skeleton,
 * in raster order, together with the skeleton itself.
 */
pub fn extract_minutiae(binary: &BinaryMask) -> (Vec<Minutia>, SkeletonMask) {
    let skeleton = skeletonize(binary);
    let minutiae = detect_minutiae(&skeleton);

    let counts = MinutiaeCounts::of(&minutiae);
    debug!(
        ridge_endings = counts.ridge_endings,
        bifurcations = counts.bifurcations,
        skeleton_pixels = skeleton.count(),
        "Extracted minutiae"
    );

    (minutiae, skeleton)
}

/**
 * Scans every non-border skeleton pixel and classifies it by the number of ridge pixels among
 * its 8 neighbours: one is a ridge ending, three is a bifurcation, anything else is skipped.
 */
pub fn detect_minutiae(skeleton: &SkeletonMask) -> Vec<Minutia> {
    let (width, height) = skeleton.dimensions();
    let mut minutiae = Vec::new();
    if width < 3 || height < 3 {
        return minutiae;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            if !skeleton.get(x, y) {
                continue;
            }
            let mut ridge_count = 0;
            for ny in y - 1..=y + 1 {
                for nx in x - 1..=x + 1 {
                    if (nx, ny) != (x, y) && skeleton.get(nx, ny) {
                        ridge_count += 1;
                    }
                }
            }
            let kind = match ridge_count {
                1 => MinutiaKind::RidgeEnding,
                3 => MinutiaKind::Bifurcation,
                _ => continue,
            };
            minutiae.push(Minutia {
                x,
                y,
                kind,
                orientation: ridge_orientation(skeleton, x, y),
            });
        }
    }
    minutiae
}

/// Angle from the centre of the 5x5 window at (x, y) to the mean position of its ridge pixels.
/// Zero within two pixels of the border, or when the window holds at most one ridge pixel.
pub fn ridge_orientation(skeleton: &SkeletonMask, x: u32, y: u32) -> f64 {
    let (width, height) = skeleton.dimensions();
    let (x, y) = (x as i64, y as i64);
    let (w, h) = (width as i64, height as i64);
    if !(x > 1 && x < w - 2 && y > 1 && y < h - 2) {
        return 0.;
    }

    let mut sum_x = 0.;
    let mut sum_y = 0.;
    let mut count = 0usize;
    for wy in 0..5 {
        for wx in 0..5 {
            if skeleton.get((x - 2 + wx) as u32, (y - 2 + wy) as u32) {
                sum_x += wx as f64;
                sum_y += wy as f64;
                count += 1;
            }
        }
    }
    if count <= 1 {
        return 0.;
    }
    let n = count as f64;
    (sum_y / n - 2.).atan2(sum_x / n - 2.)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn y_shape() -> BinaryMask {
        let mut mask = BinaryMask::new(15, 15);
        for (x, y) in [(5, 5), (6, 6), (7, 7), (8, 6), (9, 5), (7, 8), (7, 9)] {
            mask.set(x, y, true);
        }
        mask
    }

    #[test]
    fn line_has_two_endings() {
        let mut mask = BinaryMask::new(15, 11);
        for x in 3..=10 {
            mask.set(x, 5, true);
        }
        let (minutiae, skeleton) = extract_minutiae(&mask);
        assert_eq!(skeleton, mask);
        assert_eq!(minutiae.len(), 2);

        assert_eq!((minutiae[0].x, minutiae[0].y), (3, 5));
        assert_eq!(minutiae[0].kind, MinutiaKind::RidgeEnding);
        assert_abs_diff_eq!(minutiae[0].orientation, 0.0);

        assert_eq!((minutiae[1].x, minutiae[1].y), (10, 5));
        assert_abs_diff_eq!(minutiae[1].orientation, PI, epsilon = 1e-12);
    }

    #[test]
    fn y_junction_is_a_bifurcation() {
        let (minutiae, _) = extract_minutiae(&y_shape());
        let found: Vec<(u32, u32, MinutiaKind)> =
            minutiae.iter().map(|m| (m.x, m.y, m.kind)).collect();
        assert_eq!(
            found,
            vec![
                (5, 5, MinutiaKind::RidgeEnding),
                (9, 5, MinutiaKind::RidgeEnding),
                (7, 7, MinutiaKind::Bifurcation),
                (7, 9, MinutiaKind::RidgeEnding),
            ]
        );

        let counts = MinutiaeCounts::of(&minutiae);
        assert_eq!(counts.ridge_endings, 3);
        assert_eq!(counts.bifurcations, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn never_reports_border_pixels() {
        let mut state: u32 = 7;
        let mut mask = BinaryMask::new(24, 18);
        for y in 0..18 {
            for x in 0..24 {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                mask.set(x, y, (state >> 28) % 3 == 0);
            }
        }
        // Ridge endings sitting on the border itself.
        for x in 0..24 {
            mask.set(x, 0, x % 4 == 0);
        }

        let (minutiae, _) = extract_minutiae(&mask);
        for m in minutiae.iter() {
            assert!(m.x >= 1 && m.x <= 22, "x = {}", m.x);
            assert!(m.y >= 1 && m.y <= 16, "y = {}", m.y);
        }
    }

    #[test]
    fn orientation_falls_back_to_zero() {
        let mut mask = BinaryMask::new(10, 10);
        mask.set(1, 5, true);
        mask.set(2, 5, true);
        mask.set(3, 5, true);
        // Too close to the left border.
        assert_eq!(ridge_orientation(&mask, 1, 5), 0.);

        let mut dot = BinaryMask::new(10, 10);
        dot.set(5, 5, true);
        assert_eq!(ridge_orientation(&dot, 5, 5), 0.);
    }

    #[test]
    fn tiny_masks_have_no_minutiae() {
        let mut mask = BinaryMask::new(2, 2);
        mask.set(0, 0, true);
        mask.set(1, 0, true);
        assert!(detect_minutiae(&mask).is_empty());
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Minutia::new(10, 10, MinutiaKind::RidgeEnding);
        let b = Minutia::new(12, 11, MinutiaKind::RidgeEnding);
        assert_abs_diff_eq!(a.distance(&b), 5f64.sqrt(), epsilon = 1e-12);
    }
}
