use log::debug;
use ndarray::{Array3, ArrayView1, ArrayView2, ArrayView3};

use crate::error::{MetricsError, Result};

/// Denominator stabilizer used by APPSA, MAngE, MRAE, BPMRAE, PSNR and MSID.
pub const DEFAULT_EPSILON: f64 = 1e-15;

// ---------------------------------------------------------------------------
// PreparedPair – validated, clamped, double precision inputs
// ---------------------------------------------------------------------------

/// A ground-truth / recovered pair that passed validation.
///
/// Both cubes are (H, W, C), `f64`, in standard layout.
#[derive(Debug, Clone)]
pub struct PreparedPair {
    pub ground_truth: Array3<f64>,
    pub recovered: Array3<f64>,
}

impl PreparedPair {
    /// Validate shapes and clamp both images into [0, 1].
    pub fn new<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<Self>
    where
        A: Copy + Into<f64>,
    {
        check_shapes(ground_truth.shape(), recovered.shape())?;
        debug!("preparing image pair of shape {:?}", ground_truth.shape());
        Ok(PreparedPair {
            ground_truth: clamp_unit(ground_truth),
            recovered: clamp_unit(recovered),
        })
    }

    /// Validate shapes only; values are converted but left unclamped.
    pub fn unclamped<A>(ground_truth: ArrayView3<A>, recovered: ArrayView3<A>) -> Result<Self>
    where
        A: Copy + Into<f64>,
    {
        check_shapes(ground_truth.shape(), recovered.shape())?;
        Ok(PreparedPair {
            ground_truth: to_f64(ground_truth),
            recovered: to_f64(recovered),
        })
    }

    pub fn dim(&self) -> (usize, usize, usize) {
        self.ground_truth.dim()
    }

    /// Number of spatial positions, H·W.
    pub fn pixels(&self) -> usize {
        let (h, w, _) = self.dim();
        h * w
    }

    /// Spectral depth C.
    pub fn bands(&self) -> usize {
        self.dim().2
    }

    /// Both images viewed as (H·W, C) pixel lists.
    pub fn flattened(&self) -> Result<(ArrayView2<'_, f64>, ArrayView2<'_, f64>)> {
        Ok((
            flatten_pixels(&self.ground_truth)?,
            flatten_pixels(&self.recovered)?,
        ))
    }

    /// Fails unless `response` is a (C, 3) matrix for this pair.
    pub fn check_response(&self, what: &'static str, response: ArrayView2<f64>) -> Result<()> {
        check_response(what, response, self.bands())
    }
}

// ---------------------------------------------------------------------------
// Checks
// ---------------------------------------------------------------------------

pub fn check_shapes(ground_truth: &[usize], recovered: &[usize]) -> Result<()> {
    if ground_truth != recovered {
        return Err(MetricsError::ShapeMismatch {
            ground_truth: ground_truth.to_vec(),
            recovered: recovered.to_vec(),
        });
    }
    if ground_truth.iter().any(|&d| d == 0) {
        return Err(MetricsError::EmptyImage(ground_truth.to_vec()));
    }
    Ok(())
}

/// A CMF or CRF must have one row per band and one column per tristimulus.
pub fn check_response(what: &'static str, response: ArrayView2<f64>, bands: usize) -> Result<()> {
    let (rows, cols) = response.dim();
    if rows != bands {
        return Err(MetricsError::DimensionMismatch {
            what,
            expected: bands,
            found: rows,
        });
    }
    if cols != 3 {
        return Err(MetricsError::DimensionMismatch {
            what: "response columns",
            expected: 3,
            found: cols,
        });
    }
    Ok(())
}

pub fn check_white_point(white_point: ArrayView1<f64>, bands: usize) -> Result<()> {
    if white_point.len() != bands {
        return Err(MetricsError::DimensionMismatch {
            what: "white point spectrum",
            expected: bands,
            found: white_point.len(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert to `f64` and clip into [0, 1]. NaN passes through.
pub fn clamp_unit<A>(image: ArrayView3<A>) -> Array3<f64>
where
    A: Copy + Into<f64>,
{
    Array3::from_shape_fn(image.dim(), |idx| image[idx].into().clamp(0.0, 1.0))
}

fn to_f64<A>(image: ArrayView3<A>) -> Array3<f64>
where
    A: Copy + Into<f64>,
{
    Array3::from_shape_fn(image.dim(), |idx| image[idx].into())
}

/// View an (H, W, C) cube as an (H·W, C) list of pixel spectra.
pub fn flatten_pixels(image: &Array3<f64>) -> Result<ArrayView2<'_, f64>> {
    let (h, w, c) = image.dim();
    Ok(image.view().into_shape((h * w, c))?)
}
