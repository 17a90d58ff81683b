//! Feature scaling

use ndarray::Zip;
use serde::{Deserialize, Serialize};

use super::FeatureTransform;
use crate::error::{ExoError, Result};
use crate::features::{check_column_contract, FeatureVector, FEATURE_COUNT};

/// Type of scaler the parameters were fitted with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// Robust scaling using median and IQR
    Robust,
    /// Max absolute scaling: x / max(|x|)
    MaxAbs,
}

/// Fitted feature scaler. Every variant reduces to `(x - center) / scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    #[serde(default = "default_scaler_type")]
    scaler_type: ScalerType,
    feature_names_in: Vec<String>,
    #[serde(alias = "mean")]
    center: Vec<f64>,
    scale: Vec<f64>,
}

fn default_scaler_type() -> ScalerType {
    ScalerType::Standard
}

impl Scaler {
    /// Build a scaler from fitted parameters
    pub fn new(
        scaler_type: ScalerType,
        feature_names_in: Vec<String>,
        center: Vec<f64>,
        scale: Vec<f64>,
    ) -> Result<Self> {
        let scaler = Self {
            scaler_type,
            feature_names_in,
            center,
            scale,
        };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Parse and validate a JSON artifact
    pub fn from_json(json: &str) -> Result<Self> {
        let scaler: Self = serde_json::from_str(json)?;
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn scaler_type(&self) -> &ScalerType {
        &self.scaler_type
    }

    fn validate(&self) -> Result<()> {
        check_column_contract(&self.feature_names_in).map_err(|detail| ExoError::SchemaMismatch {
            artifact: "scaler".to_string(),
            detail,
        })?;
        for params in [&self.center, &self.scale] {
            if params.len() != FEATURE_COUNT {
                return Err(ExoError::ShapeError {
                    expected: FEATURE_COUNT,
                    actual: params.len(),
                });
            }
        }
        if self.center.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(ExoError::artifact("scaler", "parameters must be finite"));
        }
        Ok(())
    }
}

impl FeatureTransform for Scaler {
    fn name(&self) -> &'static str {
        "scaler"
    }

    fn transform(&self, features: &mut FeatureVector) -> Result<()> {
        let center = ndarray::ArrayView1::from(&self.center[..]);
        let scale = ndarray::ArrayView1::from(&self.scale[..]);
        Zip::from(features.view_mut())
            .and(&center)
            .and(&scale)
            .for_each(|x, &c, &s| {
                // constant columns were fitted with zero spread
                let s = if s == 0.0 { 1.0 } else { s };
                *x = (*x - c) / s;
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
    fn test_standard_scaling() {
        let scaler = Scaler::new(
            ScalerType::Standard,
            names(),
            vec![2.0; FEATURE_COUNT],
            vec![4.0; FEATURE_COUNT],
        )
        .unwrap();

        let mut fv = FeatureVector::from_values(Array1::from_elem(FEATURE_COUNT, 10.0)).unwrap();
        scaler.transform(&mut fv).unwrap();
        assert!(fv.view().iter().all(|v| (*v - 2.0).abs() < 1e-12));
    }

    #[test]
    fn test_zero_scale_treated_as_one() {
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[7] = 0.0;
        let scaler = Scaler::new(ScalerType::MinMax, names(), vec![1.0; FEATURE_COUNT], scale).unwrap();

        let mut fv = FeatureVector::from_values(Array1::from_elem(FEATURE_COUNT, 5.0)).unwrap();
        scaler.transform(&mut fv).unwrap();
        assert_eq!(fv.view()[7], 4.0);
    }

    #[test]
    fn test_mean_alias_in_json() {
        let json = serde_json::json!({
            "scaler_type": "Robust",
            "feature_names_in": names(),
            "mean": vec![0.0; FEATURE_COUNT],
            "scale": vec![1.0; FEATURE_COUNT],
        })
        .to_string();
        let scaler = Scaler::from_json(&json).unwrap();
        assert_eq!(scaler.scaler_type(), &ScalerType::Robust);
    }

    #[test]
    fn test_rejects_mismatched_lengths() {
        let err = Scaler::new(
            ScalerType::Standard,
            names(),
            vec![0.0; FEATURE_COUNT],
            vec![1.0; 30],
        )
        .unwrap_err();
        assert!(matches!(err, ExoError::ShapeError { expected: 31, actual: 30 }));
    }

    #[test]
    fn test_rejects_foreign_columns() {
        let mut cols = names();
        cols[30] = "koi_score".to_string();
        let err = Scaler::new(
            ScalerType::Standard,
            cols,
            vec![0.0; FEATURE_COUNT],
            vec![1.0; FEATURE_COUNT],
        )
        .unwrap_err();
        assert!(err.to_string().contains("koi_score"));
    }
}
