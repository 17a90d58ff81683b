//! Missing value imputation

use ndarray::Zip;
use serde::{Deserialize, Serialize};

use super::FeatureTransform;
use crate::error::{ExoError, Result};
use crate::features::{check_column_contract, FeatureVector, FEATURE_COUNT};

/// Strategy the statistics were fitted with. Informational only: the fill
/// values are already materialized in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    Mean,
    Median,
    MostFrequent,
    Constant,
}

/// Imputer for handling missing values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Imputer {
    #[serde(default = "default_strategy")]
    strategy: ImputeStrategy,
    feature_names_in: Vec<String>,
    statistics: Vec<f64>,
}

fn default_strategy() -> ImputeStrategy {
    ImputeStrategy::Median
}

impl Imputer {
    /// Build an imputer from fitted statistics
    pub fn new(strategy: ImputeStrategy, feature_names_in: Vec<String>, statistics: Vec<f64>) -> Result<Self> {
        let imputer = Self {
            strategy,
            feature_names_in,
            statistics,
        };
        imputer.validate()?;
        Ok(imputer)
    }

    /// Parse and validate a JSON artifact
    pub fn from_json(json: &str) -> Result<Self> {
        let imputer: Self = serde_json::from_str(json)?;
        imputer.validate()?;
        Ok(imputer)
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    fn validate(&self) -> Result<()> {
        check_column_contract(&self.feature_names_in).map_err(|detail| ExoError::SchemaMismatch {
            artifact: "imputer".to_string(),
            detail,
        })?;
        if self.statistics.len() != FEATURE_COUNT {
            return Err(ExoError::ShapeError {
                expected: FEATURE_COUNT,
                actual: self.statistics.len(),
            });
        }
        if let Some(idx) = self.statistics.iter().position(|v| !v.is_finite()) {
            return Err(ExoError::artifact(
                "imputer",
                format!("fill value for '{}' is not finite", self.feature_names_in[idx]),
            ));
        }
        Ok(())
    }
}

impl FeatureTransform for Imputer {
    fn name(&self) -> &'static str {
        "imputer"
    }

    fn transform(&self, features: &mut FeatureVector) -> Result<()> {
        Zip::from(features.view_mut())
            .and(&ndarray::ArrayView1::from(&self.statistics[..]))
            .for_each(|x, &fill| {
                if x.is_nan() {
                    *x = fill;
                }
            });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FEATURE_COLUMNS;
    use ndarray::Array1;

    fn names() -> Vec<String> {
        FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_fills_only_missing_values() {
        let stats: Vec<f64> = (0..FEATURE_COUNT).map(|i| i as f64 * 10.0).collect();
        let imputer = Imputer::new(ImputeStrategy::Median, names(), stats).unwrap();

        let mut raw = Array1::from_elem(FEATURE_COUNT, 1.0);
        raw[3] = f64::NAN;
        raw[30] = f64::NAN;
        let mut fv = FeatureVector::from_values(raw).unwrap();
        imputer.transform(&mut fv).unwrap();

        let v = fv.view();
        assert_eq!(v[0], 1.0);
        assert_eq!(v[3], 30.0);
        assert_eq!(v[30], 300.0);
    }

    #[test]
    fn test_rejects_reordered_columns() {
        let mut cols = names();
        cols.swap(25, 26);
        let err = Imputer::new(ImputeStrategy::Mean, cols, vec![0.0; FEATURE_COUNT]).unwrap_err();
        assert!(matches!(err, ExoError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_rejects_short_statistics() {
        let err = Imputer::new(ImputeStrategy::Mean, names(), vec![0.0; 25]).unwrap_err();
        assert!(matches!(err, ExoError::ShapeError { expected: 31, actual: 25 }));
    }

    #[test]
    fn test_from_json_defaults_strategy() {
        let json = serde_json::json!({
            "feature_names_in": names(),
            "statistics": vec![0.5; FEATURE_COUNT],
        })
        .to_string();
        let imputer = Imputer::from_json(&json).unwrap();
        assert_eq!(imputer.strategy(), &ImputeStrategy::Median);
    }
}
