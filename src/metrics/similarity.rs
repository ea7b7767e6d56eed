//! Goodness-of-fit and structural similarity.

use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3, Axis};

use super::preprocess::PreparedPair;
use super::{dot, logged, norm, per_pixel};
use crate::config::SsimConfig;
use crate::data::model::Metric;
use crate::error::{MetricsError, Result};

/// Goodness-of-Fit Coefficient: mean per-pixel cosine, unstabilized.
///
/// A pixel that is all zero in either image gives NaN.
pub fn gfc(pair: &PreparedPair) -> f64 {
    let cosines = per_pixel(pair, |gt, rc| dot(gt, rc) / (norm(gt) * norm(rc)));
    logged(Metric::Gfc, cosines.sum() / pair.pixels() as f64)
}

/// Mean structural similarity, as scored by `provider`.
pub fn mssim(pair: &PreparedPair, provider: &dyn StructuralSimilarityProvider) -> Result<f64> {
    let value = provider.mean_ssim(&pair.ground_truth, &pair.recovered)?;
    Ok(logged(Metric::Mssim, value))
}

pub fn compute_gfc<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    Ok(gfc(&PreparedPair::new(ground_truth, recovered)?))
}

/// MSSIM with the default [`WindowedSsim`].
pub fn compute_mssim<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    let pair = PreparedPair::new(ground_truth, recovered)?;
    mssim(&pair, &WindowedSsim::default())
}

// ---------------------------------------------------------------------------
// Structural similarity provider
// ---------------------------------------------------------------------------

/// Scores two (H, W, C) images with a single structural-similarity value,
/// treating the last axis as channels.
pub trait StructuralSimilarityProvider {
    fn mean_ssim(&self, ground_truth: &Array3<f64>, recovered: &Array3<f64>) -> Result<f64>;
}

/// Windowed SSIM with a uniform square window.
///
/// Each channel gets its own SSIM map; the map is cropped by half a window on
/// every side, averaged, and the channel means are averaged.
#[derive(Debug, Clone, Default)]
pub struct WindowedSsim {
    pub config: SsimConfig,
}

impl WindowedSsim {
    pub fn new(config: SsimConfig) -> Self {
        Self { config }
    }

    fn channel_ssim(&self, x: ArrayView2<f64>, y: ArrayView2<f64>) -> f64 {
        let cfg = &self.config;
        let win = cfg.win_size;
        let np = (win * win) as f64;
        let cov_norm = if cfg.sample_covariance {
            np / (np - 1.0)
        } else {
            1.0
        };

        let ux = uniform_filter(x, win);
        let uy = uniform_filter(y, win);
        let uxx = uniform_filter((&x * &x).view(), win);
        let uyy = uniform_filter((&y * &y).view(), win);
        let uxy = uniform_filter((&x * &y).view(), win);

        let c1 = (cfg.k1 * cfg.data_range).powi(2);
        let c2 = (cfg.k2 * cfg.data_range).powi(2);

        let mut map = Array2::<f64>::zeros(x.dim());
        ndarray::Zip::from(&mut map)
            .and(&ux)
            .and(&uy)
            .and(&uxx)
            .and(&uyy)
            .and(&uxy)
            .for_each(|out, &mx, &my, &mxx, &myy, &mxy| {
                let vx = cov_norm * (mxx - mx * mx);
                let vy = cov_norm * (myy - my * my);
                let vxy = cov_norm * (mxy - mx * my);
                let a1 = 2.0 * mx * my + c1;
                let a2 = 2.0 * vxy + c2;
                let b1 = mx * mx + my * my + c1;
                let b2 = vx + vy + c2;
                *out = (a1 * a2) / (b1 * b2);
            });

        let pad = (win - 1) / 2;
        let (h, w) = map.dim();
        map.slice(s![pad..h - pad, pad..w - pad])
            .mean()
            .unwrap_or(f64::NAN)
    }
}

impl StructuralSimilarityProvider for WindowedSsim {
    fn mean_ssim(&self, ground_truth: &Array3<f64>, recovered: &Array3<f64>) -> Result<f64> {
        let (h, w, c) = ground_truth.dim();
        let win = self.config.win_size;
        if win % 2 == 0 || win > h || win > w {
            return Err(MetricsError::WindowTooLarge {
                win_size: win,
                height: h,
                width: w,
            });
        }

        let total: f64 = (0..c)
            .map(|ch| {
                self.channel_ssim(
                    ground_truth.index_axis(Axis(2), ch),
                    recovered.index_axis(Axis(2), ch),
                )
            })
            .sum();
        Ok(total / c as f64)
    }
}

/// Mean over a `size`×`size` window centred on each pixel, with borders
/// mirrored about the edge (d c b a | a b c d).
fn uniform_filter(image: ArrayView2<f64>, size: usize) -> Array2<f64> {
    let (h, w) = image.dim();
    let radius = (size / 2) as isize;
    let inv = 1.0 / size as f64;

    // Separable: rows first, then columns.
    let rows = Array2::from_shape_fn((h, w), |(i, j)| {
        (-radius..=radius)
            .map(|d| image[[i, reflect(j as isize + d, w)]])
            .sum::<f64>()
            * inv
    });
    Array2::from_shape_fn((h, w), |(i, j)| {
        (-radius..=radius)
            .map(|d| rows[[reflect(i as isize + d, h), j]])
            .sum::<f64>()
            * inv
    })
}

fn reflect(idx: isize, len: usize) -> usize {
    let n = len as isize;
    let period = 2 * n;
    let m = idx.rem_euclid(period);
    if m < n {
        m as usize
    } else {
        (period - 1 - m) as usize
    }
}
