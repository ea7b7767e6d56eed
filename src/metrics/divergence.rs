//! Spectral Information Divergence between pixel spectra.

use ndarray::{ArrayView1, ArrayView3, Zip};

use super::preprocess::{PreparedPair, DEFAULT_EPSILON};
use super::{logged, per_pixel};
use crate::data::model::Metric;
use crate::error::Result;

/// Mean Spectral Information Divergence.
///
/// Each pixel spectrum is normalized by its own sum; the symmetric log-ratio
/// terms are weighted by the unnormalized spectra. A pixel whose spectrum sums
/// to zero yields NaN.
pub fn msid(pair: &PreparedPair, eps: f64) -> f64 {
    let errors = per_pixel(pair, |gt, rc| pixel_divergence(gt, rc, eps));
    logged(Metric::Msid, errors.sum() / pair.pixels() as f64)
}

fn pixel_divergence(gt: ArrayView1<f64>, rc: ArrayView1<f64>, eps: f64) -> f64 {
    let sum_gt = gt.sum();
    let sum_rc = rc.sum();
    let mut rc_term = 0.0;
    let mut gt_term = 0.0;
    Zip::from(gt).and(rc).for_each(|&g, &r| {
        let p_gt = g / sum_gt + eps;
        let p_rc = r / sum_rc + eps;
        rc_term += r * (p_rc / p_gt).ln();
        gt_term += g * (p_gt / p_rc).ln();
    });
    (rc_term + gt_term).abs()
}

pub fn compute_msid<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    let pair = PreparedPair::new(ground_truth, recovered)?;
    Ok(msid(&pair, DEFAULT_EPSILON))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array3};

    #[test]
    fn identical_spectra_have_no_divergence() {
        let x = Array3::from_shape_fn((3, 4, 5), |(h, w, c)| 0.1 + 0.05 * (h + w + c) as f64);
        let value = compute_msid(x.view(), x.view()).unwrap();
        assert!(value.abs() < 1e-12);
    }

    #[test]
    fn scaled_spectra_share_a_distribution() {
        let gt = array![[[0.2, 0.4, 0.6]]];
        let rc = array![[[0.1, 0.2, 0.3]]];
        let value = compute_msid(gt.view(), rc.view()).unwrap();
        assert!(value.abs() < 1e-9);
    }

    #[test]
    fn matches_hand_computed_pixel() {
        let gt = array![[[0.25, 0.75]]];
        let rc = array![[[0.5, 0.5]]];
        // rc·ln(rc_p / gt_p) + gt·ln(gt_p / rc_p), with the two distributions
        // (0.25, 0.75) and (0.5, 0.5).
        let expected = (0.5 * (2.0f64).ln() + 0.5 * (2.0 / 3.0f64).ln()
            + 0.25 * (0.5f64).ln()
            + 0.75 * (1.5f64).ln())
        .abs();
        let value = compute_msid(gt.view(), rc.view()).unwrap();
        assert!((value - expected).abs() < 1e-9, "{value} vs {expected}");
    }

    #[test]
    fn zero_pixel_propagates_nan() {
        let gt = Array3::<f64>::zeros((1, 1, 3));
        let rc = array![[[0.1, 0.2, 0.3]]];
        assert!(compute_msid(gt.view(), rc.view()).unwrap().is_nan());
    }
}
