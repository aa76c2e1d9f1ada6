//! Tunables for converting floating-point input into exact fractions

use serde::{Deserialize, Serialize};

/// Controls the power-of-ten scaling search used by `Rational::from_f64_with`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversionConfig {
    /// Distance from an integer at which a scaled value counts as integral.
    /// Inputs closer than this to zero convert to zero directly.
    pub tolerance: f64,
    /// Largest power of ten the value may be scaled by
    pub max_scale: f64,
    pub max_iterations: u32,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            tolerance: 1e-12,
            max_scale: 1e12,
            max_iterations: 100,
        }
    }
}
