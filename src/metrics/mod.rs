/// Metric layer: validation plus one kernel per score.
///
/// Architecture:
/// ```text
///  ground truth (H,W,C)   recovered (H,W,C)
///            │                  │
///            └───────┬──────────┘
///                    ▼
///             ┌────────────┐
///             │ preprocess │  shape checks, clamp to [0,1], f64
///             └────────────┘
///                    │
///     ┌──────────┬───┴──────┬────────────┐
///     ▼          ▼          ▼            ▼
///  angular    residual   divergence   similarity
/// ```
///
/// Every kernel takes a [`preprocess::PreparedPair`]; the `compute_*`
/// functions validate raw views first and use the default stabilizers.

pub mod angular;
pub mod divergence;
pub mod preprocess;
pub mod residual;
pub mod similarity;

use log::{debug, warn};
use ndarray::{Array2, ArrayView1, Axis, Zip};

use crate::data::model::Metric;
use preprocess::PreparedPair;

// ---------------------------------------------------------------------------
// Shared per-pixel helpers
// ---------------------------------------------------------------------------

/// Apply `f` to every (ground truth, recovered) pixel spectrum, giving an
/// (H, W) map.
pub(crate) fn per_pixel<F>(pair: &PreparedPair, f: F) -> Array2<f64>
where
    F: Fn(ArrayView1<f64>, ArrayView1<f64>) -> f64,
{
    Zip::from(pair.ground_truth.lanes(Axis(2)))
        .and(pair.recovered.lanes(Axis(2)))
        .map_collect(|gt, rc| f(gt, rc))
}

pub(crate) fn dot(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.dot(&b)
}

pub(crate) fn norm(a: ArrayView1<f64>) -> f64 {
    a.dot(&a).sqrt()
}

/// Log a scalar result, warning when it is degenerate.
pub(crate) fn logged(metric: Metric, value: f64) -> f64 {
    if value.is_finite() {
        debug!("{metric} = {value}");
    } else {
        warn!("{metric} produced a non-finite value ({value})");
    }
    value
}
