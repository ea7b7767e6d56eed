use ndarray::{Array, Array2, ArrayView, ArrayView1, ArrayView2, Dimension, Zip};

use crate::error::{MetricsError, Result};
use crate::metrics::preprocess::{check_response, check_white_point};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Reference white the ProLab transform normalizes XYZ by (D65).
pub const PROLAB_WHITE: [f64; 3] = [0.95047, 1.0, 1.08883];

/// Projective ProLab matrix, applied to the homogeneous column
/// (X/Xn, Y/Yn, Z/Zn, 1).
#[rustfmt::skip]
pub const PROLAB_MATRIX: [[f64; 4]; 4] = [
    [ 75.54,   486.66,  167.39,  0.0],
    [617.72,  -595.45,  -22.27,  0.0],
    [ 48.34,   194.94, -243.28,  0.0],
    [  0.7554,   3.8666,  1.6739, 1.0],
];

const DELTA: f64 = 6.0 / 29.0;

// ---------------------------------------------------------------------------
// Spectra → XYZ
// ---------------------------------------------------------------------------

/// Tristimulus values of (N, C) spectra, normalized by the sum of the
/// CMF's Y column.
pub fn spectra_to_xyz(spectra: ArrayView2<f64>, cmf: ArrayView2<f64>) -> Array2<f64> {
    let sum_y = cmf.column(1).sum();
    spectra.dot(&cmf) / sum_y
}

/// XYZ of the illuminant, normalized so that its Y is 1.
pub fn white_point_xyz(cmf: ArrayView2<f64>, white_point: ArrayView1<f64>) -> [f64; 3] {
    let norm = (&cmf.column(1) * &white_point).sum();
    let xyz = white_point.dot(&cmf);
    [xyz[0] / norm, xyz[1] / norm, xyz[2] / norm]
}

// ---------------------------------------------------------------------------
// XYZ → CIE Lab
// ---------------------------------------------------------------------------

/// CIE Lab companding: cube root above (6/29)³, linear below.
pub fn lab_f(t: f64) -> f64 {
    if t > DELTA.powi(3) {
        t.cbrt()
    } else {
        t / (3.0 * DELTA.powi(2)) + 4.0 / 29.0
    }
}

/// Convert an (N, 3) XYZ list to CIE Lab relative to `white`.
pub fn xyz_to_lab(xyz: ArrayView2<f64>, white: [f64; 3]) -> Array2<f64> {
    let [xw, yw, zw] = white;
    let mut lab = Array2::<f64>::zeros((xyz.nrows(), 3));
    Zip::from(lab.rows_mut())
        .and(xyz.rows())
        .for_each(|mut out, px| {
            let fx = lab_f(px[0] / xw);
            let fy = lab_f(px[1] / yw);
            let fz = lab_f(px[2] / zw);
            out[0] = 116.0 * fy - 16.0;
            out[1] = 500.0 * (fx - fy);
            out[2] = 200.0 * (fy - fz);
        });
    lab
}

/// Convert (N, C) spectra to (N, 3) CIE Lab.
///
/// Pixel XYZ is normalized by the CMF's Y sum; the reference white by the
/// illuminant-weighted Y sum.
pub fn spectra_to_lab(
    spectra: ArrayView2<f64>,
    cmf: ArrayView2<f64>,
    white_point: ArrayView1<f64>,
) -> Result<Array2<f64>> {
    let bands = spectra.ncols();
    check_response("color matching function", cmf, bands)?;
    check_white_point(white_point, bands)?;

    let white = white_point_xyz(cmf, white_point);
    let xyz = spectra_to_xyz(spectra, cmf);
    Ok(xyz_to_lab(xyz.view(), white))
}

// ---------------------------------------------------------------------------
// XYZ → ProLab
// ---------------------------------------------------------------------------

/// Convert XYZ to ProLab.
///
/// Accepts a single triple `(3,)`, a list `(N, 3)` or an image `(H, W, 3)`;
/// the output has the same shape as the input.
pub fn xyz_to_prolab<D>(xyz: ArrayView<f64, D>) -> Result<Array<f64, D>>
where
    D: Dimension,
{
    let last = xyz.shape().last().copied().unwrap_or(0);
    if last != 3 {
        return Err(MetricsError::DimensionMismatch {
            what: "XYZ components",
            expected: 3,
            found: last,
        });
    }

    let shape = xyz.raw_dim();
    let n = xyz.len() / 3;
    let flat = Array2::from_shape_vec((n, 3), xyz.iter().copied().collect())?;

    let mut out = Array2::<f64>::zeros((n, 3));
    Zip::from(out.rows_mut())
        .and(flat.rows())
        .for_each(|mut dst, src| {
            let lab = prolab([src[0], src[1], src[2]]);
            dst[0] = lab[0];
            dst[1] = lab[1];
            dst[2] = lab[2];
        });
    Ok(out.into_shape(shape)?)
}

/// ProLab of one XYZ triple.
pub fn prolab(xyz: [f64; 3]) -> [f64; 3] {
    let v = [
        xyz[0] / PROLAB_WHITE[0],
        xyz[1] / PROLAB_WHITE[1],
        xyz[2] / PROLAB_WHITE[2],
        1.0,
    ];
    let mut h = [0.0f64; 4];
    for (out, row) in h.iter_mut().zip(PROLAB_MATRIX.iter()) {
        *out = row.iter().zip(v.iter()).map(|(m, x)| m * x).sum();
    }
    [h[0] / h[3], h[1] / h[3], h[2] / h[3]]
}
