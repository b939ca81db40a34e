/// Eigenvalues of the symmetric matrix `[[a, b], [b, d]]`, largest first.
pub fn symmetric_eigenvalues2x2(a: f64, b: f64, d: f64) -> (f64, f64) {
    let half_trace = (a + d) / 2.;
    let half_diff = (a - d) / 2.;
    let root = (half_diff * half_diff + b * b).sqrt();
    (half_trace + root, half_trace - root)
}

/// Second order central moments of a point set, normalised by the point count.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CentralMoments {
    pub count: usize,
    pub centroid: (f64, f64),
    pub mu20: f64,
    pub mu11: f64,
    pub mu02: f64,
}

impl CentralMoments {
    pub fn of<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)> + Clone,
    {
        let mut count = 0usize;
        let mut sum_x = 0.;
        let mut sum_y = 0.;
        for (x, y) in points.clone() {
            count += 1;
            sum_x += x;
            sum_y += y;
        }
        if count == 0 {
            return None;
        }
        let n = count as f64;
        let (cx, cy) = (sum_x / n, sum_y / n);

        let mut mu20 = 0.;
        let mut mu11 = 0.;
        let mut mu02 = 0.;
        for (x, y) in points {
            let dx = x - cx;
            let dy = y - cy;
            mu20 += dx * dx;
            mu11 += dx * dy;
            mu02 += dy * dy;
        }
        Some(Self {
            count,
            centroid: (cx, cy),
            mu20: mu20 / n,
            mu11: mu11 / n,
            mu02: mu02 / n,
        })
    }

    /// Eccentricity of the equivalent ellipse: 0 for a circle, approaching 1 for a line.
    /// A set with no spread at all has eccentricity 0.
    pub fn eccentricity(&self) -> f64 {
        let (major, minor) = symmetric_eigenvalues2x2(self.mu20, self.mu11, self.mu02);
        if major <= f64::EPSILON {
            return 0.;
        }
        (1. - (minor.max(0.) / major)).clamp(0., 1.).sqrt()
    }
}
