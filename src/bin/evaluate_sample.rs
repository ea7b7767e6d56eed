use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use ndarray::{Array1, Array2, Array3};
use spectral_metrics::{Evaluator, MetricConfig, MetricResult};

const HEIGHT: usize = 32;
const WIDTH: usize = 32;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Gaussian with a different width on each side of the peak.
fn skewed_gaussian(x: f64, mu: f64, sigma_left: f64, sigma_right: f64) -> f64 {
    let sigma = if x < mu { sigma_left } else { sigma_right };
    (-0.5 * ((x - mu) / sigma).powi(2)).exp()
}

/// Multi-lobe analytic fit of the CIE 1931 2° observer (Wyman, Sloan &
/// Shirley 2013).
fn cie1931_cmf(wavelengths: &[f64]) -> Array2<f64> {
    Array2::from_shape_fn((wavelengths.len(), 3), |(i, j)| {
        let l = wavelengths[i];
        match j {
            0 => {
                1.056 * skewed_gaussian(l, 599.8, 37.9, 31.0)
                    + 0.362 * skewed_gaussian(l, 442.0, 16.0, 26.7)
                    - 0.065 * skewed_gaussian(l, 501.1, 20.4, 26.2)
            }
            1 => {
                0.821 * skewed_gaussian(l, 568.8, 46.9, 40.5)
                    + 0.286 * skewed_gaussian(l, 530.9, 16.3, 31.1)
            }
            _ => {
                1.217 * skewed_gaussian(l, 437.0, 11.8, 36.0)
                    + 0.681 * skewed_gaussian(l, 459.0, 26.0, 13.8)
            }
        }
    })
}

/// A three-channel camera with one Gaussian lobe per channel.
fn camera_response(wavelengths: &[f64]) -> Array2<f64> {
    let peaks = [(610.0, 35.0), (540.0, 35.0), (460.0, 30.0)];
    Array2::from_shape_fn((wavelengths.len(), 3), |(i, j)| {
        let (mu, sigma) = peaks[j];
        gaussian(wavelengths[i], mu, sigma, 1.0)
    })
}

// ---------------------------------------------------------------------------
// Simulated reconstruction
// ---------------------------------------------------------------------------

/// How the synthetic "recovered" cube departs from the ground truth: a global
/// gain, a tilt that grows toward the red end, and per-sample Gaussian noise.
struct Degradation {
    seed: u64,
    gain: f64,
    tilt: f64,
    noise_sigma: f64,
}

impl Default for Degradation {
    fn default() -> Self {
        Self {
            seed: 42,
            gain: 0.97,
            tilt: 0.04,
            noise_sigma: 0.02,
        }
    }
}

impl Degradation {
    fn apply(&self, ground_truth: &Array3<f64>) -> Array3<f64> {
        let bands = ground_truth.dim().2;
        let mut noise = NoiseSource::new(self.seed);
        let mut recovered = ground_truth.clone();
        for ((_, _, c), v) in recovered.indexed_iter_mut() {
            let position = c as f64 / (bands.max(2) - 1) as f64;
            let scale = self.gain * (1.0 + self.tilt * (position - 0.5));
            *v = *v * scale + noise.normal() * self.noise_sigma;
        }
        recovered
    }
}

/// SplitMix64 stream with Box-Muller normals.
struct NoiseSource {
    state: u64,
    spare: Option<f64>,
}

impl NoiseSource {
    fn new(seed: u64) -> Self {
        Self { state: seed, spare: None }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in (0, 1].
    fn uniform(&mut self) -> f64 {
        ((self.next_u64() >> 11) + 1) as f64 / (1u64 << 53) as f64
    }

    fn normal(&mut self) -> f64 {
        if let Some(z) = self.spare.take() {
            return z;
        }
        let radius = (-2.0 * self.uniform().ln()).sqrt();
        let angle = 2.0 * std::f64::consts::PI * self.uniform();
        self.spare = Some(radius * angle.sin());
        radius * angle.cos()
    }
}

/// Smooth reflectance-like spectra whose peak drifts across the image.
fn ground_truth_cube(wavelengths: &[f64]) -> Array3<f64> {
    Array3::from_shape_fn((HEIGHT, WIDTH, wavelengths.len()), |(h, w, c)| {
        let l = wavelengths[c];
        let peak = 420.0 + 260.0 * (w as f64 / (WIDTH - 1) as f64);
        let width = 30.0 + 40.0 * (h as f64 / (HEIGHT - 1) as f64);
        0.1 + gaussian(l, peak, width, 0.7) + gaussian(l, 700.0 - peak / 4.0, 25.0, 0.15)
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => MetricConfig::load(Path::new(&path))?,
        None => MetricConfig::default(),
    };

    // 400 → 700 nm, step 10
    let wavelengths: Vec<f64> = (0..31).map(|i| 400.0 + i as f64 * 10.0).collect();

    let ground_truth = ground_truth_cube(&wavelengths);
    let degradation = Degradation::default();
    let recovered = degradation.apply(&ground_truth);
    info!(
        "recovered cube: gain {}, tilt {}, noise σ {}",
        degradation.gain, degradation.tilt, degradation.noise_sigma
    );

    let evaluator = Evaluator::new(config)
        .with_cmf(cie1931_cmf(&wavelengths))
        .with_crf(camera_response(&wavelengths))
        .with_white_point(Array1::ones(wavelengths.len()));

    let report = evaluator
        .evaluate_all(ground_truth.view(), recovered.view())
        .context("evaluating sample pair")?;

    // MAngE is a per-pixel map; summarize it by its mean for the printout.
    let summary: BTreeMap<String, f64> = report
        .iter()
        .map(|(metric, result)| match result {
            MetricResult::Scalar(v) => (metric.to_string(), *v),
            MetricResult::PixelMap(map) => (
                format!("{metric} (mean of map)"),
                map.mean().unwrap_or(f64::NAN),
            ),
        })
        .collect();

    info!(
        "evaluated {} metrics on a {HEIGHT}x{WIDTH}x{} cube",
        summary.len(),
        wavelengths.len()
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degradation_is_reproducible() {
        let wavelengths: Vec<f64> = (0..8).map(|i| 400.0 + i as f64 * 40.0).collect();
        let gt = ground_truth_cube(&wavelengths);
        let degradation = Degradation::default();
        assert_eq!(degradation.apply(&gt), degradation.apply(&gt));
    }

    #[test]
    fn neutral_degradation_is_identity() {
        let wavelengths: Vec<f64> = (0..8).map(|i| 400.0 + i as f64 * 40.0).collect();
        let gt = ground_truth_cube(&wavelengths);
        let neutral = Degradation {
            gain: 1.0,
            tilt: 0.0,
            noise_sigma: 0.0,
            ..Degradation::default()
        };
        assert_eq!(neutral.apply(&gt), gt);
    }

    #[test]
    fn noise_is_roughly_standard_normal() {
        let mut noise = NoiseSource::new(7);
        let samples: Vec<f64> = (0..20_000).map(|_| noise.normal()).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.05, "{mean}");
        assert!((var - 1.0).abs() < 0.05, "{var}");
    }
}
