use thiserror::Error;

/// Errors raised by metric validation and evaluation.
///
/// Validation failures are returned before any computation starts; no metric
/// ever yields a partial result.
#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Size not match for ground truth and recovered spectral images: {ground_truth:?} vs {recovered:?}")]
    ShapeMismatch {
        ground_truth: Vec<usize>,
        recovered: Vec<usize>,
    },

    #[error("{what} has {found} entries along the spectral axis, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Image has no pixels or no bands (shape {0:?})")]
    EmptyImage(Vec<usize>),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown delta E formula: {0} (expected CIE1976, CIE1994 or CIE2000)")]
    UnknownDeltaEFormula(String),

    #[error("Metric {metric} needs a {input}, none was configured")]
    MissingInput {
        metric: &'static str,
        input: &'static str,
    },

    #[error("SSIM window of {win_size} does not fit a {height}x{width} image (must be odd and no larger than either side)")]
    WindowTooLarge {
        win_size: usize,
        height: usize,
        width: usize,
    },

    #[error("Metric {metric} produced a non-finite result")]
    NonFinite { metric: String },

    #[error("Array layout error: {0}")]
    Layout(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
