//! Quality metrics for recovered spectral images.
//!
//! Every metric compares a recovered (H, W, C) cube against its ground truth.
//! Inputs are validated (identical shapes, matching response depths), clamped
//! into [0, 1] and widened to `f64` before any reduction.
//!
//! | Family | Metrics |
//! |---|---|
//! | angular | APPSA, MAngE (per-pixel map), SAM |
//! | residual | MSE, RMSE, MRAE, BPMRAE, PSNR |
//! | divergence | MSID |
//! | similarity | GFC, MSSIM |
//! | colorimetric | ΔE from spectra (CIE1976/1994/2000), ProLab Euclidean distance |
//!
//! The `compute_*` functions use the default stabilizers and providers. The
//! [`Evaluator`] runs the same kernels with a [`MetricConfig`], injected
//! providers and optional CMF / camera response / white point.
//!
//! ```
//! use ndarray::array;
//! use spectral_metrics::{compute_mse, compute_rmse};
//!
//! let gt = array![[[0.5]]];
//! let rc = array![[[0.3]]];
//! assert!((compute_mse(gt.view(), rc.view()).unwrap() - 0.04).abs() < 1e-12);
//! assert!((compute_rmse(gt.view(), rc.view()).unwrap() - 0.2).abs() < 1e-12);
//! ```

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod metrics;

pub use color::{
    compute_delta_e_from_spectra, compute_prolab_distance, spectra_to_lab, xyz_to_prolab,
    ColorDifferenceProvider, DeltaEFormula, StandardDeltaE,
};
pub use config::{EpsilonConfig, MetricConfig, SsimConfig};
pub use data::loader::{load_response_table, load_white_point};
pub use data::model::{Metric, MetricReport, MetricResult, ResponseTable};
pub use error::{MetricsError, Result};
pub use evaluator::Evaluator;
pub use metrics::angular::{compute_appsa, compute_mange, compute_sam};
pub use metrics::divergence::compute_msid;
pub use metrics::preprocess::{PreparedPair, DEFAULT_EPSILON};
pub use metrics::residual::{
    compute_bpmrae, compute_mrae, compute_mse, compute_psnr, compute_rmse, BackProjection,
};
pub use metrics::similarity::{
    compute_gfc, compute_mssim, StructuralSimilarityProvider, WindowedSsim,
};
