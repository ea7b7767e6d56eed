use ndarray::{array, Array1, Array2, Array3};
use spectral_metrics::color::convert::PROLAB_WHITE;
use spectral_metrics::{
    compute_appsa, compute_bpmrae, compute_delta_e_from_spectra, compute_gfc, compute_mange,
    compute_mrae, compute_mse, compute_msid, compute_prolab_distance, compute_psnr, compute_rmse,
    compute_sam, xyz_to_prolab, BackProjection, DeltaEFormula, MetricsError, DEFAULT_EPSILON,
};

/// Pixels whose squared norms are exact in binary, so cosines of a pixel
/// with itself come out at exactly 1.
fn exact_cube() -> Array3<f64> {
    array![
        [[0.5, 0.5, 0.5, 0.5], [0.75, 0.0, 0.0, 0.0]],
        [[0.25, 0.25, 0.25, 0.25], [0.0, 1.0, 0.0, 0.0]],
    ]
}

fn smooth_cube() -> Array3<f64> {
    Array3::from_shape_fn((6, 5, 8), |(h, w, c)| {
        0.05 + 0.8 * (((h * 3 + w * 5 + c * 7) % 13) as f64 / 13.0)
    })
}

fn toy_cmf(bands: usize) -> Array2<f64> {
    Array2::from_shape_fn((bands, 3), |(i, j)| {
        let centre = [0.8, 0.5, 0.2][j] * bands as f64;
        (-((i as f64 - centre).powi(2)) / 4.0).exp()
    })
}

#[test]
fn identical_images_have_zero_error() {
    let x = smooth_cube();
    assert_eq!(compute_mse(x.view(), x.view()).unwrap(), 0.0);
    assert_eq!(compute_rmse(x.view(), x.view()).unwrap(), 0.0);
    assert_eq!(compute_mrae(x.view(), x.view()).unwrap(), 0.0);
    assert!(compute_appsa(x.view(), x.view()).unwrap().abs() < 1e-6);
}

#[test]
fn identical_exact_images_have_zero_angle_and_unit_fit() {
    let x = exact_cube();
    assert_eq!(compute_sam(x.view(), x.view()).unwrap(), 0.0);
    assert_eq!(compute_gfc(x.view(), x.view()).unwrap(), 1.0);
}

#[test]
fn psnr_of_identical_images_is_bounded_by_epsilon() {
    let x = smooth_cube();
    let psnr = compute_psnr(x.view(), x.view()).unwrap();
    let expected = 20.0 * (1.0 / DEFAULT_EPSILON.sqrt()).log10();
    assert!((psnr - expected).abs() < 1e-9);
}

#[test]
fn angle_metrics_ignore_positive_scaling() {
    let x = smooth_cube();
    let half = x.mapv(|v| v * 0.5);
    assert!(compute_appsa(x.view(), half.view()).unwrap().abs() < 1e-6);
    assert!((compute_gfc(x.view(), half.view()).unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn mange_returns_a_spatial_map() {
    let gt = smooth_cube();
    let rc = gt.mapv(|v| (v * 1.1).min(1.0));
    let map = compute_mange(gt.view(), rc.view()).unwrap();
    assert_eq!(map.dim(), (6, 5));
}

#[test]
fn zero_pixels_degrade_sam_and_gfc_but_not_appsa() {
    let mut gt = smooth_cube();
    let mut rc = gt.mapv(|v| v * 0.9);
    gt.slice_mut(ndarray::s![2, 3, ..]).fill(0.0);
    rc.slice_mut(ndarray::s![2, 3, ..]).fill(0.0);

    assert!(!compute_sam(gt.view(), rc.view()).unwrap().is_finite());
    assert!(!compute_gfc(gt.view(), rc.view()).unwrap().is_finite());
    assert!(compute_appsa(gt.view(), rc.view()).unwrap().is_finite());
}

#[test]
fn single_band_single_pixel_scenario() {
    let gt = array![[[0.5]]];
    let rc = array![[[0.3]]];
    assert!((compute_mse(gt.view(), rc.view()).unwrap() - 0.04).abs() < 1e-12);
    assert!((compute_rmse(gt.view(), rc.view()).unwrap() - 0.2).abs() < 1e-12);
    assert!((compute_mrae(gt.view(), rc.view()).unwrap() - 0.4).abs() < 1e-12);
    assert!((compute_psnr(gt.view(), rc.view()).unwrap() - 13.9794).abs() < 1e-3);
}

#[test]
fn inputs_are_clamped_before_scoring() {
    let gt = array![[[1.5, -0.2]]];
    let rc = array![[[1.0, 0.0]]];
    assert_eq!(compute_mse(gt.view(), rc.view()).unwrap(), 0.0);
}

#[test]
fn narrow_inputs_are_widened() {
    let gt = array![[[128u8, 64]]];
    let rc = array![[[128u8, 64]]];
    // u8 values clamp to 1.0, so both pixels become [1, 1].
    assert_eq!(compute_mse(gt.view(), rc.view()).unwrap(), 0.0);

    let gt = array![[[0.5f32]]];
    let rc = array![[[0.25f32]]];
    assert!((compute_mse(gt.view(), rc.view()).unwrap() - 0.0625).abs() < 1e-12);
}

#[test]
fn shape_mismatch_is_fatal_for_every_metric() {
    let a = Array3::<f64>::zeros((2, 2, 3));
    let b = Array3::<f64>::zeros((2, 2, 4));
    let cmf = toy_cmf(3);
    let wp = Array1::ones(3);
    let results = [
        compute_appsa(a.view(), b.view()).err(),
        compute_mange(a.view(), b.view()).err(),
        compute_sam(a.view(), b.view()).err(),
        compute_mse(a.view(), b.view()).err(),
        compute_rmse(a.view(), b.view()).err(),
        compute_mrae(a.view(), b.view()).err(),
        compute_psnr(a.view(), b.view()).err(),
        compute_msid(a.view(), b.view()).err(),
        compute_gfc(a.view(), b.view()).err(),
        compute_bpmrae(a.view(), b.view(), BackProjection::Rgb).err(),
        compute_prolab_distance(a.view(), b.view(), cmf.view()).err(),
        compute_delta_e_from_spectra(a.view(), b.view(), cmf.view(), wp.view(), DeltaEFormula::Cie2000)
            .err(),
    ];
    for err in results {
        assert!(matches!(err, Some(MetricsError::ShapeMismatch { .. })), "{err:?}");
    }
}

#[test]
fn delta_e_of_identical_spectra_is_zero() {
    let x = smooth_cube();
    let cmf = toy_cmf(8);
    let wp = Array1::from_shape_fn(8, |i| 0.5 + 0.05 * i as f64);
    let d = compute_delta_e_from_spectra(x.view(), x.view(), cmf.view(), wp.view(), DeltaEFormula::Cie2000)
        .unwrap();
    assert!(d.abs() < 1e-9);
}

#[test]
fn delta_e_grows_with_the_error() {
    let gt = smooth_cube();
    let slightly = gt.mapv(|v| v * 0.95);
    let badly = gt.mapv(|v| v * 0.5);
    let cmf = toy_cmf(8);
    let wp = Array1::ones(8);
    for formula in [DeltaEFormula::Cie1976, DeltaEFormula::Cie1994, DeltaEFormula::Cie2000] {
        let small = compute_delta_e_from_spectra(gt.view(), slightly.view(), cmf.view(), wp.view(), formula)
            .unwrap();
        let large = compute_delta_e_from_spectra(gt.view(), badly.view(), cmf.view(), wp.view(), formula)
            .unwrap();
        assert!(small < large, "{formula}: {small} vs {large}");
    }
}

#[test]
fn prolab_reference_white_is_a_fixed_point() {
    let white = Array1::from(PROLAB_WHITE.to_vec());
    let lab = xyz_to_prolab(white.view()).unwrap();
    assert!((lab[0] - 100.0).abs() < 1e-9);
    assert!(lab[1].abs() < 1e-9);
    assert!(lab[2].abs() < 1e-9);
}

#[test]
fn prolab_distance_checks_cmf_depth() {
    let x = smooth_cube();
    let err = compute_prolab_distance(x.view(), x.view(), toy_cmf(7).view()).unwrap_err();
    assert!(matches!(err, MetricsError::DimensionMismatch { expected: 8, found: 7, .. }));
}

#[test]
fn bpmrae_projects_through_the_camera() {
    let gt = smooth_cube();
    let rc = gt.mapv(|v| v * 0.8);
    let crf = toy_cmf(8);
    let value = compute_bpmrae(gt.view(), rc.view(), BackProjection::Spectral(crf.view())).unwrap();
    // A uniform 20 % drop survives the linear projection unchanged.
    assert!((value - 0.2).abs() < 1e-9);
}

#[test]
fn msid_is_zero_for_identical_images() {
    let x = smooth_cube();
    assert!(compute_msid(x.view(), x.view()).unwrap().abs() < 1e-12);
}
