//! Spectral-angle scores: APPSA, MAngE and SAM.
//!
//! All three compare the direction of the ground-truth and recovered pixel
//! spectra and ignore their overall brightness.

use std::f64::consts::PI;

use ndarray::{Array2, ArrayView3};

use super::preprocess::{PreparedPair, DEFAULT_EPSILON};
use super::{dot, logged, norm, per_pixel};
use crate::data::model::Metric;
use crate::error::Result;

/// Average Per-Pixel Spectral Angle, in radians.
///
/// The cosine is stabilized with `eps` in the denominator and clamped above
/// at 1. There is no lower clamp.
pub fn appsa(pair: &PreparedPair, eps: f64) -> f64 {
    let angles = per_pixel(pair, |gt, rc| {
        let cos = dot(gt, rc) / (norm(gt) * norm(rc) + eps);
        let cos = if cos > 1.0 { 1.0 } else { cos };
        cos.acos()
    });
    logged(Metric::Appsa, angles.sum() / pair.pixels() as f64)
}

/// Mean Angular Error map, in degrees, weighted per pixel by the square root
/// of the ground truth's mean reflectance.
///
/// Returns the full (H, W) map. It is deliberately not reduced.
pub fn mange(pair: &PreparedPair, eps: f64) -> Array2<f64> {
    let map = per_pixel(pair, |gt, rc| {
        let cos = dot(gt, rc) / (norm(gt) + eps) / (norm(rc) + eps);
        let degrees = cos.acos() * 180.0 / PI;
        degrees * (gt.sum() / gt.len() as f64).sqrt()
    });
    log::debug!("{} map of shape {:?}", Metric::MangE, map.dim());
    map
}

/// Spectral Angle Mapper, in degrees.
///
/// No stabilizer: a pixel that is all zero in either image gives NaN, and the
/// NaN reaches the returned mean.
pub fn sam(pair: &PreparedPair) -> f64 {
    let angles = per_pixel(pair, |gt, rc| {
        let cos = dot(gt, rc) / (norm(gt) * norm(rc));
        cos.acos() / PI * 180.0
    });
    logged(Metric::Sam, angles.sum() / pair.pixels() as f64)
}

// ---------------------------------------------------------------------------
// Validated entry points
// ---------------------------------------------------------------------------

pub fn compute_appsa<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    let pair = PreparedPair::new(ground_truth, recovered)?;
    Ok(appsa(&pair, DEFAULT_EPSILON))
}

pub fn compute_mange<A>(
    ground_truth: ArrayView3<A>,
    recovered: ArrayView3<A>,
) -> Result<Array2<f64>>
where
    A: Copy + Into<f64>,
{
    let pair = PreparedPair::new(ground_truth, recovered)?;
    Ok(mange(&pair, DEFAULT_EPSILON))
}

pub fn compute_sam<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    let pair = PreparedPair::new(ground_truth, recovered)?;
    Ok(sam(&pair))
}
