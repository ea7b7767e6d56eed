use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, Array2};
use serde::Serialize;

use crate::error::MetricsError;

// ---------------------------------------------------------------------------
// Metric – the name of every score this crate computes
// ---------------------------------------------------------------------------

/// Every metric the crate can evaluate, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Metric {
    #[serde(rename = "APPSA")]
    Appsa,
    #[serde(rename = "MAngE")]
    MangE,
    #[serde(rename = "SAM")]
    Sam,
    #[serde(rename = "MSE")]
    Mse,
    #[serde(rename = "RMSE")]
    Rmse,
    #[serde(rename = "MRAE")]
    Mrae,
    #[serde(rename = "BPMRAE")]
    Bpmrae,
    #[serde(rename = "PSNR")]
    Psnr,
    #[serde(rename = "MSID")]
    Msid,
    #[serde(rename = "GFC")]
    Gfc,
    #[serde(rename = "MSSIM")]
    Mssim,
    #[serde(rename = "DeltaE")]
    DeltaE,
    #[serde(rename = "ProLabEucD")]
    ProLabDistance,
}

impl Metric {
    pub const ALL: [Metric; 13] = [
        Metric::Appsa,
        Metric::MangE,
        Metric::Sam,
        Metric::Mse,
        Metric::Rmse,
        Metric::Mrae,
        Metric::Bpmrae,
        Metric::Psnr,
        Metric::Msid,
        Metric::Gfc,
        Metric::Mssim,
        Metric::DeltaE,
        Metric::ProLabDistance,
    ];

    /// Conventional short name, as used in the literature.
    pub fn name(self) -> &'static str {
        match self {
            Metric::Appsa => "APPSA",
            Metric::MangE => "MAngE",
            Metric::Sam => "SAM",
            Metric::Mse => "MSE",
            Metric::Rmse => "RMSE",
            Metric::Mrae => "MRAE",
            Metric::Bpmrae => "BPMRAE",
            Metric::Psnr => "PSNR",
            Metric::Msid => "MSID",
            Metric::Gfc => "GFC",
            Metric::Mssim => "MSSIM",
            Metric::DeltaE => "DeltaE",
            Metric::ProLabDistance => "ProLabEucD",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Metric {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MetricsError::UnknownMetric(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MetricResult – scalar score or per-pixel map
// ---------------------------------------------------------------------------

/// The outcome of one metric.
///
/// Only MAngE yields a [`MetricResult::PixelMap`]; it is never reduced here.
/// Callers that want a single number for it must reduce the map themselves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricResult {
    Scalar(f64),
    PixelMap(Array2<f64>),
}

impl MetricResult {
    /// The scalar value, or `None` for a per-pixel map.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            MetricResult::Scalar(v) => Some(*v),
            MetricResult::PixelMap(_) => None,
        }
    }

    pub fn as_pixel_map(&self) -> Option<&Array2<f64>> {
        match self {
            MetricResult::Scalar(_) => None,
            MetricResult::PixelMap(map) => Some(map),
        }
    }

    /// `false` when the value (or any pixel of the map) is NaN or infinite.
    pub fn is_finite(&self) -> bool {
        match self {
            MetricResult::Scalar(v) => v.is_finite(),
            MetricResult::PixelMap(map) => map.iter().all(|v| v.is_finite()),
        }
    }

    /// Turn a degenerate result into [`MetricsError::NonFinite`].
    pub fn ensure_finite(self, metric: Metric) -> Result<Self, MetricsError> {
        if self.is_finite() {
            Ok(self)
        } else {
            Err(MetricsError::NonFinite {
                metric: metric.to_string(),
            })
        }
    }
}

impl From<f64> for MetricResult {
    fn from(v: f64) -> Self {
        MetricResult::Scalar(v)
    }
}

impl From<Array2<f64>> for MetricResult {
    fn from(map: Array2<f64>) -> Self {
        MetricResult::PixelMap(map)
    }
}

impl fmt::Display for MetricResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricResult::Scalar(v) => write!(f, "{v:.6}"),
            MetricResult::PixelMap(map) => {
                let (h, w) = map.dim();
                write!(f, "<{h}x{w} map>")
            }
        }
    }
}

/// Results of several metrics over one image pair, in [`Metric`] order.
pub type MetricReport = BTreeMap<Metric, MetricResult>;

// ---------------------------------------------------------------------------
// ResponseTable – a loaded CMF or camera response
// ---------------------------------------------------------------------------

/// A (C, 3) spectral response matrix: a color matching function or a
/// camera response, one row per band.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseTable {
    /// Band centres, when the source file carried them.
    pub wavelengths: Option<Array1<f64>>,
    /// Response weights, shape (bands, 3).
    pub values: Array2<f64>,
}

impl ResponseTable {
    /// Number of spectral bands (rows).
    pub fn bands(&self) -> usize {
        self.values.nrows()
    }
}
