//! Derived feature computation

use ndarray::{Array1, ArrayView1, ArrayViewMut1};

use super::{RawObservation, FEATURE_COLUMNS, FEATURE_COUNT, RAW_FEATURE_COUNT};
use crate::error::{ExoError, Result};

/// The 31 model inputs for one observation, in [`FEATURE_COLUMNS`] order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: Array1<f64>,
}

impl FeatureVector {
    /// Wrap an existing column vector. Fails unless it has exactly 31 entries.
    pub fn from_values(values: Array1<f64>) -> Result<Self> {
        if values.len() != FEATURE_COUNT {
            return Err(ExoError::ShapeError {
                expected: FEATURE_COUNT,
                actual: values.len(),
            });
        }
        Ok(Self { values })
    }

    pub fn view(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut1<'_, f64> {
        self.values.view_mut()
    }

    /// Value of a column by name
    pub fn get(&self, column: &str) -> Option<f64> {
        FEATURE_COLUMNS
            .iter()
            .position(|c| *c == column)
            .map(|idx| self.values[idx])
    }
}

fn ratio(
    feature: &'static str,
    numerator: f64,
    denominator: f64,
    denominator_name: &'static str,
) -> Result<f64> {
    if denominator == 0.0 {
        return Err(ExoError::DivisionByZero {
            feature,
            denominator: denominator_name,
        });
    }
    Ok(numerator / denominator)
}

/// Compute the six engineered columns and assemble the full vector.
///
/// Zero denominators are reported rather than producing infinities, and any
/// non-finite derived value is rejected.
pub fn derive(obs: &RawObservation) -> Result<FeatureVector> {
    let derived: [(&'static str, f64); FEATURE_COUNT - RAW_FEATURE_COUNT] = [
        (
            "planet_star_radius_ratio",
            ratio("planet_star_radius_ratio", obs.koi_prad, obs.koi_srad, "koi_srad")?,
        ),
        (
            "period_duration_ratio",
            ratio("period_duration_ratio", obs.koi_period, obs.koi_duration, "koi_duration")?,
        ),
        (
            "star_density_proxy",
            ratio("star_density_proxy", obs.koi_smass, obs.koi_srad.powi(3), "koi_srad^3")?,
        ),
        (
            "insol_teq_ratio",
            ratio("insol_teq_ratio", obs.koi_insol, obs.koi_teq, "koi_teq")?,
        ),
        ("signal_strength", obs.koi_depth * obs.koi_model_snr),
        ("total_fp_flags", f64::from(obs.total_fp_flags())),
    ];

    let mut values = Vec::with_capacity(FEATURE_COUNT);
    values.extend_from_slice(&obs.to_array());
    for (name, value) in derived {
        if !value.is_finite() {
            return Err(ExoError::NonFinite(name));
        }
        values.push(value);
    }

    Ok(FeatureVector {
        values: Array1::from(values),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::observation::kepler_sample;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_derived_values() {
        let obs = kepler_sample();
        let fv = derive(&obs).unwrap();

        assert!(approx(fv.get("planet_star_radius_ratio").unwrap(), 2.94 / 0.914));
        assert!(approx(fv.get("period_duration_ratio").unwrap(), 41.749 / 5.6098));
        assert!(approx(
            fv.get("star_density_proxy").unwrap(),
            0.904 / (0.914f64 * 0.914 * 0.914)
        ));
        assert!(approx(fv.get("insol_teq_ratio").unwrap(), 13.22 / 486.0));
        assert!(approx(fv.get("signal_strength").unwrap(), 1055.4 * 95.0));
        assert_eq!(fv.get("total_fp_flags").unwrap(), 0.0);
    }

    #[test]
    fn test_raw_columns_copied_in_order() {
        let obs = kepler_sample();
        let fv = derive(&obs).unwrap();
        let raw = obs.to_array();
        assert_eq!(fv.view().len(), FEATURE_COUNT);
        for (i, v) in raw.iter().enumerate() {
            assert_eq!(fv.view()[i], *v);
        }
    }

    #[test]
    fn test_fp_flag_sum() {
        let mut obs = kepler_sample();
        obs.koi_fpflag_nt = 1;
        obs.koi_fpflag_co = 1;
        obs.koi_fpflag_ec = 1;
        let fv = derive(&obs).unwrap();
        assert_eq!(fv.get("total_fp_flags").unwrap(), 3.0);
    }

    #[test]
    fn test_zero_duration_is_an_error() {
        let mut obs = kepler_sample();
        obs.koi_duration = 0.0;
        let err = derive(&obs).unwrap_err();
        assert!(matches!(
            err,
            ExoError::DivisionByZero { denominator: "koi_duration", .. }
        ));
    }

    #[test]
    fn test_zero_stellar_radius_is_an_error() {
        let mut obs = kepler_sample();
        obs.koi_srad = 0.0;
        assert!(matches!(
            derive(&obs).unwrap_err(),
            ExoError::DivisionByZero { denominator: "koi_srad", .. }
        ));
    }

    #[test]
    fn test_overflow_is_rejected() {
        let mut obs = kepler_sample();
        obs.koi_depth = f64::MAX;
        assert!(matches!(
            derive(&obs).unwrap_err(),
            ExoError::NonFinite("signal_strength")
        ));
    }

    #[test]
    fn test_from_values_checks_length() {
        let err = FeatureVector::from_values(Array1::zeros(30)).unwrap_err();
        assert!(matches!(err, ExoError::ShapeError { expected: 31, actual: 30 }));
        assert!(FeatureVector::from_values(Array1::zeros(31)).is_ok());
    }
}
