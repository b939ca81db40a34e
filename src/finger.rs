use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::{FingerPriors, PatternTable};
use crate::pattern::PatternLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
    Unknown,
}

impl fmt::Display for Finger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Finger::Thumb => "Thumb",
            Finger::Index => "Index finger",
            Finger::Middle => "Middle finger",
            Finger::Ring => "Ring finger",
            Finger::Little => "Little finger",
            Finger::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FingerPrediction {
    pub finger: Finger,
    pub confidence: f64,
    /// Normalised probabilities in prior order; they sum to 1.
    pub probabilities: Vec<(Finger, f64)>,
}

pub fn predict_finger(pattern: PatternLabel, minutiae_count: usize) -> FingerPrediction {
    predict_finger_with(
        pattern,
        minutiae_count,
        &PatternTable::default(),
        &FingerPriors::default(),
    )
}

/**
 * Starts from the prior weights, boosts the fingers the pattern is common on, then nudges by
 * minutiae count (dense prints lean towards the thumb, sparse ones towards the little finger)
 * and normalises. The first finger with the highest probability wins.
 */
pub fn predict_finger_with(
    pattern: PatternLabel,
    minutiae_count: usize,
    table: &PatternTable,
    priors: &FingerPriors,
) -> FingerPrediction {
    let mut probabilities = priors.base.clone();
    let mut bump = |finger: Finger, amount: f64| {
        if let Some(entry) = probabilities.iter_mut().find(|(f, _)| *f == finger) {
            entry.1 += amount;
        }
    };

    for &finger in table.common_fingers(pattern) {
        bump(finger, priors.common_finger_bonus);
    }

    if minutiae_count > priors.dense_threshold {
        for &(finger, amount) in priors.dense_bonus.iter() {
            bump(finger, amount);
        }
    } else if minutiae_count < priors.sparse_threshold {
        for &(finger, amount) in priors.sparse_bonus.iter() {
            bump(finger, amount);
        }
    }

    let total: f64 = probabilities.iter().map(|(_, p)| p).sum();
    if total > 0. {
        for entry in probabilities.iter_mut() {
            entry.1 /= total;
        }
    }

    let (finger, confidence) = probabilities
        .iter()
        .fold(None, |best: Option<(Finger, f64)>, &(f, p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ => Some((f, p)),
        })
        .unwrap_or((Finger::Unknown, 0.));

    FingerPrediction {
        finger,
        confidence,
        probabilities,
    }
}
