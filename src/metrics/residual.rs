//! Element-wise residual scores: MSE, RMSE, MRAE, BPMRAE and PSNR.

use ndarray::{ArrayView2, ArrayView3, ArrayViewD};

use super::logged;
use super::preprocess::{PreparedPair, DEFAULT_EPSILON};
use crate::data::model::Metric;
use crate::error::Result;

/// How BPMRAE obtains RGB triples from its inputs.
#[derive(Debug, Clone, Copy)]
pub enum BackProjection<'a> {
    /// Inputs are already captured RGB images; used as-is, unclamped.
    Rgb,
    /// Inputs are spectral; project through this (C, 3) camera response.
    Spectral(ArrayView2<'a, f64>),
}

pub fn mse(pair: &PreparedPair) -> f64 {
    let diff = &pair.ground_truth - &pair.recovered;
    let value = diff.mapv(|d| d * d).mean().unwrap_or(f64::NAN);
    logged(Metric::Mse, value)
}

pub fn rmse(pair: &PreparedPair) -> f64 {
    logged(Metric::Rmse, mse(pair).sqrt())
}

/// Mean of |gt - rc| / (gt + eps) over every element.
pub fn mrae(pair: &PreparedPair, eps: f64) -> f64 {
    let value = relative_absolute_error(
        pair.ground_truth.view().into_dyn(),
        pair.recovered.view().into_dyn(),
        eps,
    );
    logged(Metric::Mrae, value)
}

/// MRAE after projecting both spectral images through a camera response.
///
/// `pair` must already have been checked against `crf`.
pub fn bpmrae(pair: &PreparedPair, crf: ArrayView2<f64>, eps: f64) -> Result<f64> {
    let (gt, rc) = pair.flattened()?;
    let gt_rgb = gt.dot(&crf);
    let rc_rgb = rc.dot(&crf);
    let value = relative_absolute_error(
        gt_rgb.view().into_dyn(),
        rc_rgb.view().into_dyn(),
        eps,
    );
    Ok(logged(Metric::Bpmrae, value))
}

/// MRAE on inputs that are already RGB.
pub fn bpmrae_rgb(pair: &PreparedPair, eps: f64) -> f64 {
    let value = relative_absolute_error(
        pair.ground_truth.view().into_dyn(),
        pair.recovered.view().into_dyn(),
        eps,
    );
    logged(Metric::Bpmrae, value)
}

/// Peak signal-to-noise ratio for a normalized peak of 1, in dB.
pub fn psnr(pair: &PreparedPair, eps: f64) -> f64 {
    let value = 20.0 * (1.0 / (mse(pair) + eps).sqrt()).log10();
    logged(Metric::Psnr, value)
}

fn relative_absolute_error(
    gt: ArrayViewD<f64>,
    rc: ArrayViewD<f64>,
    eps: f64,
) -> f64 {
    let n = gt.len();
    let total: f64 = gt
        .iter()
        .zip(rc.iter())
        .map(|(&g, &r)| (g - r).abs() / (g + eps))
        .sum();
    total / n as f64
}

// ---------------------------------------------------------------------------
// Validated entry points
// ---------------------------------------------------------------------------

pub fn compute_mse<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    Ok(mse(&PreparedPair::new(ground_truth, recovered)?))
}

pub fn compute_rmse<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    Ok(rmse(&PreparedPair::new(ground_truth, recovered)?))
}

pub fn compute_mrae<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    Ok(mrae(&PreparedPair::new(ground_truth, recovered)?, DEFAULT_EPSILON))
}

/// Back-projected MRAE.
///
/// With [`BackProjection::Rgb`] the inputs are compared as given. With
/// [`BackProjection::Spectral`] they are clamped, the response is checked
/// against the spectral depth, and both images are projected to RGB first.
pub fn compute_bpmrae<A>(
    ground_truth: ArrayView3<A>,
    recovered: ArrayView3<A>,
    projection: BackProjection<'_>,
) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    match projection {
        BackProjection::Rgb => {
            let pair = PreparedPair::unclamped(ground_truth, recovered)?;
            Ok(bpmrae_rgb(&pair, DEFAULT_EPSILON))
        }
        BackProjection::Spectral(crf) => {
            let pair = PreparedPair::new(ground_truth, recovered)?;
            pair.check_response("camera response function", crf)?;
            bpmrae(&pair, crf, DEFAULT_EPSILON)
        }
    }
}

pub fn compute_psnr<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    Ok(psnr(&PreparedPair::new(ground_truth, recovered)?, DEFAULT_EPSILON))
}
