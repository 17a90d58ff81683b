//! Measured KOI parameters

use serde::{Deserialize, Serialize};

use super::RAW_FEATURE_COUNT;

/// One transit signal's 25 measured parameters.
///
/// Field order matches [`super::raw_columns`]. Values are assumed to be
/// range-checked already (see [`crate::validation`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub koi_period: f64,
    pub koi_prad: f64,
    pub koi_sma: f64,
    pub koi_incl: f64,
    pub koi_teq: f64,
    pub koi_insol: f64,
    pub koi_impact: f64,
    pub koi_duration: f64,
    pub koi_depth: f64,
    pub koi_dor: f64,
    pub koi_eccen: f64,
    pub koi_ror: f64,
    pub koi_steff: f64,
    pub koi_slogg: f64,
    pub koi_smet: f64,
    pub koi_srad: f64,
    pub koi_smass: f64,
    pub koi_srho: f64,
    pub koi_num_transits: f64,
    pub koi_count: f64,
    pub koi_model_snr: f64,
    pub koi_fpflag_nt: u8,
    pub koi_fpflag_ss: u8,
    pub koi_fpflag_co: u8,
    pub koi_fpflag_ec: u8,
}

impl RawObservation {
    /// Build from values in canonical column order.
    ///
    /// Flag columns are truncated to `u8`; callers pass 0 or 1.
    pub fn from_array(v: [f64; RAW_FEATURE_COUNT]) -> Self {
        Self {
            koi_period: v[0],
            koi_prad: v[1],
            koi_sma: v[2],
            koi_incl: v[3],
            koi_teq: v[4],
            koi_insol: v[5],
            koi_impact: v[6],
            koi_duration: v[7],
            koi_depth: v[8],
            koi_dor: v[9],
            koi_eccen: v[10],
            koi_ror: v[11],
            koi_steff: v[12],
            koi_slogg: v[13],
            koi_smet: v[14],
            koi_srad: v[15],
            koi_smass: v[16],
            koi_srho: v[17],
            koi_num_transits: v[18],
            koi_count: v[19],
            koi_model_snr: v[20],
            koi_fpflag_nt: flag(v[21]),
            koi_fpflag_ss: flag(v[22]),
            koi_fpflag_co: flag(v[23]),
            koi_fpflag_ec: flag(v[24]),
        }
    }

    /// Values in canonical column order
    pub fn to_array(&self) -> [f64; RAW_FEATURE_COUNT] {
        [
            self.koi_period,
            self.koi_prad,
            self.koi_sma,
            self.koi_incl,
            self.koi_teq,
            self.koi_insol,
            self.koi_impact,
            self.koi_duration,
            self.koi_depth,
            self.koi_dor,
            self.koi_eccen,
            self.koi_ror,
            self.koi_steff,
            self.koi_slogg,
            self.koi_smet,
            self.koi_srad,
            self.koi_smass,
            self.koi_srho,
            self.koi_num_transits,
            self.koi_count,
            self.koi_model_snr,
            f64::from(self.koi_fpflag_nt),
            f64::from(self.koi_fpflag_ss),
            f64::from(self.koi_fpflag_co),
            f64::from(self.koi_fpflag_ec),
        ]
    }

    /// Sum of the four false-positive flags
    pub fn total_fp_flags(&self) -> u32 {
        [self.koi_fpflag_nt, self.koi_fpflag_ss, self.koi_fpflag_co, self.koi_fpflag_ec]
            .iter()
            .map(|&f| u32::from(f))
            .sum()
    }
}

/// Nearest flag value; out-of-range inputs saturate at 0 or 255
fn flag(v: f64) -> u8 {
    v.round().clamp(0.0, f64::from(u8::MAX)) as u8
}

#[cfg(test)]
pub(crate) fn kepler_sample() -> RawObservation {
    RawObservation {
        koi_period: 41.749,
        koi_prad: 2.94,
        koi_sma: 0.228,
        koi_incl: 89.77,
        koi_teq: 486.0,
        koi_insol: 13.22,
        koi_impact: 0.226,
        koi_duration: 5.6098,
        koi_depth: 1055.4,
        koi_dor: 57.11,
        koi_eccen: 0.0,
        koi_ror: 0.029414,
        koi_steff: 5506.0,
        koi_slogg: 4.473,
        koi_smet: 0.04,
        koi_srad: 0.914,
        koi_smass: 0.904,
        koi_srho: 2.02141,
        koi_num_transits: 34.0,
        koi_count: 3.0,
        koi_model_snr: 95.0,
        koi_fpflag_nt: 0,
        koi_fpflag_ss: 0,
        koi_fpflag_co: 0,
        koi_fpflag_ec: 0,
    }
}
