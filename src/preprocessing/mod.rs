//! Preprocessing transforms applied between feature engineering and the model
//!
//! Both transforms are fitted offline and shipped as JSON artifacts:
//! - [`Imputer`] fills missing values with per-column statistics
//! - [`Scaler`] centers and scales each column

mod imputer;
mod scaler;

pub use imputer::{ImputeStrategy, Imputer};
pub use scaler::{Scaler, ScalerType};

use crate::error::Result;
use crate::features::FeatureVector;

/// A fitted, read-only column transform.
pub trait FeatureTransform: Send + Sync + std::fmt::Debug {
    /// Short name used in logs and error messages
    fn name(&self) -> &'static str;

    /// Transform the vector in place
    fn transform(&self, features: &mut FeatureVector) -> Result<()>;
}
