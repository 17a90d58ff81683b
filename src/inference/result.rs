//! Prediction outputs

use serde::{Deserialize, Serialize};

use crate::error::{ExoError, Result};

/// Disposition classes, in the model's output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    #[serde(rename = "False Positive")]
    FalsePositive,
    #[serde(rename = "Candidate Exoplanet")]
    Candidate,
    #[serde(rename = "Confirmed Exoplanet")]
    Confirmed,
}

impl Disposition {
    pub const ALL: [Disposition; 3] = [
        Disposition::FalsePositive,
        Disposition::Candidate,
        Disposition::Confirmed,
    ];

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Disposition::FalsePositive => "False Positive",
            Disposition::Candidate => "Candidate Exoplanet",
            Disposition::Confirmed => "Confirmed Exoplanet",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Rounded per-class probabilities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbabilities {
    pub false_positive: f64,
    pub candidate: f64,
    pub confirmed: f64,
}

impl ClassProbabilities {
    pub fn sum(&self) -> f64 {
        self.false_positive + self.candidate + self.confirmed
    }
}

/// A successful classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub prediction: Disposition,
    pub confidence: f64,
    pub raw_prediction: usize,
    pub probabilities: ClassProbabilities,
}

pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

impl PredictionResult {
    /// Build from a raw probability vector. The predicted class is the first
    /// index holding the maximum probability.
    pub fn from_probabilities(proba: &[f64]) -> Result<Self> {
        if proba.len() != Disposition::ALL.len() {
            return Err(ExoError::ShapeError {
                expected: Disposition::ALL.len(),
                actual: proba.len(),
            });
        }
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        let prediction = Disposition::from_index(best)
            .ok_or_else(|| ExoError::InferenceError(format!("class index {} out of range", best)))?;

        Ok(Self {
            prediction,
            confidence: round4(proba[best]),
            raw_prediction: best,
            probabilities: ClassProbabilities {
                false_positive: round4(proba[0]),
                candidate: round4(proba[1]),
                confirmed: round4(proba[2]),
            },
        })
    }
}

/// Failure payload returned in place of a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionFailure {
    pub prediction: String,
    pub confidence: f64,
    pub error: String,
}

impl PredictionFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            prediction: "Error".to_string(),
            confidence: 0.0,
            error: error.into(),
        }
    }
}

/// What one pipeline run yields: a result, or an error payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredictionOutcome {
    Success(PredictionResult),
    Failure(PredictionFailure),
}

impl PredictionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, PredictionOutcome::Success(_))
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            PredictionOutcome::Success(r) => Some(r),
            PredictionOutcome::Failure(_) => None,
        }
    }
}

impl From<Result<PredictionResult>> for PredictionOutcome {
    fn from(res: Result<PredictionResult>) -> Self {
        match res {
            Ok(r) => PredictionOutcome::Success(r),
            Err(e) => PredictionOutcome::Failure(PredictionFailure::new(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argmax_and_rounding() {
        let r = PredictionResult::from_probabilities(&[0.1, 0.23456789, 0.66543211]).unwrap();
        assert_eq!(r.prediction, Disposition::Confirmed);
        assert_eq!(r.raw_prediction, 2);
        assert_eq!(r.confidence, 0.6654);
        assert_eq!(r.probabilities.candidate, 0.2346);
    }

    #[test]
    fn test_ties_pick_first_class() {
        let r = PredictionResult::from_probabilities(&[0.4, 0.4, 0.2]).unwrap();
        assert_eq!(r.prediction, Disposition::FalsePositive);
    }

    #[test]
    fn test_wrong_class_count() {
        assert!(PredictionResult::from_probabilities(&[0.5, 0.5]).is_err());
    }

    #[test]
    fn test_success_serialization() {
        let r = PredictionResult::from_probabilities(&[0.7, 0.2, 0.1]).unwrap();
        let json = serde_json::to_value(PredictionOutcome::Success(r)).unwrap();
        assert_eq!(json["prediction"], "False Positive");
        assert_eq!(json["raw_prediction"], 0);
        assert_eq!(json["probabilities"]["confirmed"], 0.1);
    }

    #[test]
    fn test_failure_serialization() {
        let outcome: PredictionOutcome = Err(ExoError::ModelNotLoaded).into();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["prediction"], "Error");
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["error"], "Model not loaded. Please ensure model files exist.");
        assert!(!outcome.is_success());
    }

    #[test]
    fn test_labels_match_index_order() {
        for (i, d) in Disposition::ALL.iter().enumerate() {
            assert_eq!(d.index(), i);
            assert_eq!(Disposition::from_index(i), Some(*d));
        }
        assert_eq!(Disposition::Candidate.to_string(), "Candidate Exoplanet");
    }
}
