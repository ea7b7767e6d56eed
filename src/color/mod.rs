/// Colorimetric layer: spectra → XYZ → Lab / ProLab, and the color
/// difference scores built on top.
///
/// ```text
///  spectra (N,C) ──cmf──▶ XYZ ──white point──▶ Lab ──▶ ΔE (provider)
///                          │
///                          └──────────────────▶ ProLab ──▶ Euclidean
/// ```

pub mod convert;
pub mod difference;

pub use convert::{spectra_to_lab, spectra_to_xyz, xyz_to_lab, xyz_to_prolab};
pub use difference::{ColorDifferenceProvider, DeltaEFormula, StandardDeltaE};

use ndarray::{ArrayView1, ArrayView2, ArrayView3, Zip};

use crate::data::model::Metric;
use crate::error::Result;
use crate::metrics::logged;
use crate::metrics::preprocess::{check_white_point, PreparedPair};

// ---------------------------------------------------------------------------
// Kernels
// ---------------------------------------------------------------------------

/// Mean color difference between the Lab renderings of both images.
pub fn delta_e_from_spectra(
    pair: &PreparedPair,
    cmf: ArrayView2<f64>,
    white_point: ArrayView1<f64>,
    formula: DeltaEFormula,
    provider: &dyn ColorDifferenceProvider,
) -> Result<f64> {
    let (gt, rc) = pair.flattened()?;
    let lab_gt = spectra_to_lab(gt, cmf, white_point)?;
    let lab_rc = spectra_to_lab(rc, cmf, white_point)?;
    let distances = provider.delta_e(lab_gt.view(), lab_rc.view(), formula)?;
    log::debug!("{formula} over {} pixels", distances.len());
    let value = distances.mean().unwrap_or(f64::NAN);
    Ok(logged(Metric::DeltaE, value))
}

/// Mean per-pixel Euclidean distance in ProLab.
///
/// XYZ is normalized by the CMF's Y sum only; there is no white-point
/// correction besides the fixed D65 normalization inside ProLab.
pub fn prolab_distance(pair: &PreparedPair, cmf: ArrayView2<f64>) -> Result<f64> {
    pair.check_response("color matching function", cmf)?;
    let (gt, rc) = pair.flattened()?;
    let prolab_gt = xyz_to_prolab(spectra_to_xyz(gt, cmf).view())?;
    let prolab_rc = xyz_to_prolab(spectra_to_xyz(rc, cmf).view())?;

    let distances = Zip::from(prolab_gt.rows())
        .and(prolab_rc.rows())
        .map_collect(|a, b| {
            ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
        });
    let value = distances.mean().unwrap_or(f64::NAN);
    Ok(logged(Metric::ProLabDistance, value))
}

// ---------------------------------------------------------------------------
// Validated entry points
// ---------------------------------------------------------------------------

/// Mean ΔE between two spectral images rendered to Lab under `white_point`,
/// using [`StandardDeltaE`].
pub fn compute_delta_e_from_spectra<A>(
    ground_truth: ArrayView3<A>,
    recovered: ArrayView3<A>,
    cmf: ArrayView2<f64>,
    white_point: ArrayView1<f64>,
    formula: DeltaEFormula,
) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    let pair = PreparedPair::new(ground_truth, recovered)?;
    pair.check_response("color matching function", cmf)?;
    check_white_point(white_point, pair.bands())?;
    delta_e_from_spectra(&pair, cmf, white_point, formula, &StandardDeltaE)
}

pub fn compute_prolab_distance<A>(
    ground_truth: ArrayView3<A>,
    recovered: ArrayView3<A>,
    cmf: ArrayView2<f64>,
) -> Result<f64>
where
    A: Copy + Into<f64>,
{
    let pair = PreparedPair::new(ground_truth, recovered)?;
    prolab_distance(&pair, cmf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MetricsError;
    use ndarray::{Array1, Array2, Array3};

    fn toy_cmf() -> Array2<f64> {
        ndarray::array![
            [0.1, 0.0, 0.6],
            [0.3, 0.4, 0.2],
            [0.2, 0.9, 0.0],
            [0.8, 0.3, 0.0],
        ]
    }

    #[test]
    fn identical_spectra_have_zero_delta_e() {
        let x = Array3::from_shape_fn((3, 2, 4), |(h, w, c)| 0.1 + 0.2 * ((h + w + c) % 4) as f64);
        let wp = Array1::from_elem(4, 1.0);
        let cmf = toy_cmf();
        for formula in [DeltaEFormula::Cie1976, DeltaEFormula::Cie1994, DeltaEFormula::Cie2000] {
            let d = compute_delta_e_from_spectra(x.view(), x.view(), cmf.view(), wp.view(), formula)
                .unwrap();
            assert!(d.abs() < 1e-9, "{formula}: {d}");
        }
    }

    #[test]
    fn different_spectra_have_positive_delta_e() {
        let gt = Array3::from_elem((2, 2, 4), 0.6);
        let rc = Array3::from_elem((2, 2, 4), 0.3);
        let wp = Array1::from_elem(4, 1.0);
        let cmf = toy_cmf();
        let d = compute_delta_e_from_spectra(
            gt.view(),
            rc.view(),
            cmf.view(),
            wp.view(),
            DeltaEFormula::Cie1976,
        )
        .unwrap();
        assert!(d > 1.0);
    }

    #[test]
    fn delta_e_checks_cmf_depth() {
        let x = Array3::from_elem((2, 2, 5), 0.5);
        let wp = Array1::from_elem(5, 1.0);
        let cmf = toy_cmf();
        let err = compute_delta_e_from_spectra(
            x.view(),
            x.view(),
            cmf.view(),
            wp.view(),
            DeltaEFormula::Cie2000,
        )
        .unwrap_err();
        assert!(matches!(err, MetricsError::DimensionMismatch { expected: 5, found: 4, .. }));
    }

    #[test]
    fn prolab_distance_of_identical_images_is_zero() {
        let x = Array3::from_elem((2, 3, 4), 0.4);
        let d = compute_prolab_distance(x.view(), x.view(), toy_cmf().view()).unwrap();
        assert!(d.abs() < 1e-12);
    }

    #[test]
    fn prolab_distance_is_symmetric() {
        let gt = Array3::from_shape_fn((2, 2, 4), |(h, w, c)| 0.1 * (1 + h + w + c) as f64);
        let rc = Array3::from_elem((2, 2, 4), 0.35);
        let cmf = toy_cmf();
        let ab = compute_prolab_distance(gt.view(), rc.view(), cmf.view()).unwrap();
        let ba = compute_prolab_distance(rc.view(), gt.view(), cmf.view()).unwrap();
        assert!(ab > 0.0);
        assert!((ab - ba).abs() < 1e-9);
    }
}
