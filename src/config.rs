use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::color::DeltaEFormula;
use crate::metrics::preprocess::DEFAULT_EPSILON;

// ---------------------------------------------------------------------------
// MetricConfig – tunables for the Evaluator
// ---------------------------------------------------------------------------

/// Evaluation settings. Every field has a default, so a JSON file only needs
/// the keys it overrides.
///
/// ```json
/// { "epsilon": { "mrae": 1e-6 }, "delta_e": "CIE1994", "strict": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricConfig {
    pub epsilon: EpsilonConfig,
    pub ssim: SsimConfig,
    /// Formula used by the spectra-to-Lab color difference.
    pub delta_e: DeltaEFormula,
    /// Reject NaN or infinite results instead of returning them.
    pub strict: bool,
}

impl Default for MetricConfig {
    fn default() -> Self {
        Self {
            epsilon: EpsilonConfig::default(),
            ssim: SsimConfig::default(),
            delta_e: DeltaEFormula::Cie2000,
            strict: false,
        }
    }
}

impl MetricConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing metric config JSON")
    }

    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&text)
    }
}

/// Denominator stabilizers, one per metric that uses one.
///
/// SAM and GFC have none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpsilonConfig {
    pub appsa: f64,
    pub mange: f64,
    pub mrae: f64,
    pub bpmrae: f64,
    pub psnr: f64,
    pub msid: f64,
}

impl Default for EpsilonConfig {
    fn default() -> Self {
        Self {
            appsa: DEFAULT_EPSILON,
            mange: DEFAULT_EPSILON,
            mrae: DEFAULT_EPSILON,
            bpmrae: DEFAULT_EPSILON,
            psnr: DEFAULT_EPSILON,
            msid: DEFAULT_EPSILON,
        }
    }
}

/// Parameters of the windowed structural similarity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SsimConfig {
    /// Side of the square uniform window; must be odd.
    pub win_size: usize,
    pub k1: f64,
    pub k2: f64,
    /// Dynamic range of the data. 2.0 is the span of the signed float range.
    pub data_range: f64,
    /// Use the unbiased N/(N-1) covariance normalization.
    pub sample_covariance: bool,
}

impl Default for SsimConfig {
    fn default() -> Self {
        Self {
            win_size: 7,
            k1: 0.01,
            k2: 0.03,
            data_range: 2.0,
            sample_covariance: true,
        }
    }
}
