//! Feature engineering module
//!
//! Turns the 25 measured KOI parameters into the 31-column vector the
//! classifier was trained on:
//! - [`RawObservation`] holds the measured parameters
//! - [`FeatureVector`] holds raw + derived columns in [`FEATURE_COLUMNS`] order
//! - [`derive`] computes the six engineered columns

mod engineer;
pub(crate) mod observation;

pub use engineer::{derive, FeatureVector};
pub use observation::RawObservation;

/// Number of measured input parameters
pub const RAW_FEATURE_COUNT: usize = 25;

/// Number of columns fed to the model
pub const FEATURE_COUNT: usize = 31;

/// Column contract shared by the classifier, imputer and scaler artifacts.
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "koi_period",
    "koi_prad",
    "koi_sma",
    "koi_incl",
    "koi_teq",
    "koi_insol",
    "koi_impact",
    "koi_duration",
    "koi_depth",
    "koi_dor",
    "koi_eccen",
    "koi_ror",
    "koi_steff",
    "koi_slogg",
    "koi_smet",
    "koi_srad",
    "koi_smass",
    "koi_srho",
    "koi_num_transits",
    "koi_count",
    "koi_model_snr",
    "koi_fpflag_nt",
    "koi_fpflag_ss",
    "koi_fpflag_co",
    "koi_fpflag_ec",
    "planet_star_radius_ratio",
    "period_duration_ratio",
    "star_density_proxy",
    "insol_teq_ratio",
    "signal_strength",
    "total_fp_flags",
];

/// Names of the measured parameters, in canonical order
pub fn raw_columns() -> &'static [&'static str] {
    &FEATURE_COLUMNS[..RAW_FEATURE_COUNT]
}

/// Names of the engineered columns, in canonical order
pub fn derived_columns() -> &'static [&'static str] {
    &FEATURE_COLUMNS[RAW_FEATURE_COUNT..]
}

/// Compare an artifact's declared columns against [`FEATURE_COLUMNS`].
///
/// Returns a human-readable description of the first difference.
pub fn check_column_contract(columns: &[String]) -> std::result::Result<(), String> {
    if columns.len() != FEATURE_COUNT {
        return Err(format!(
            "expected {} columns, artifact declares {}",
            FEATURE_COUNT,
            columns.len()
        ));
    }
    for (idx, (expected, actual)) in FEATURE_COLUMNS.iter().zip(columns).enumerate() {
        if expected != actual {
            return Err(format!(
                "column {} is '{}', expected '{}'",
                idx, actual, expected
            ));
        }
    }
    Ok(())
}
