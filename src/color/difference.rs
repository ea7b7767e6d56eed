use std::fmt;
use std::str::FromStr;

use ndarray::{Array1, ArrayView1, ArrayView2, Zip};
use palette::color_difference::{Ciede2000, DeltaE};
use palette::white_point::D65;
use palette::Lab;
use serde::{Deserialize, Serialize};

use crate::error::{MetricsError, Result};

// ---------------------------------------------------------------------------
// DeltaEFormula
// ---------------------------------------------------------------------------

/// Which CIE color-difference formula to apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DeltaEFormula {
    /// ΔE*ab, Euclidean distance in Lab.
    Cie1976,
    /// ΔE*94 with graphic-arts weights.
    Cie1994,
    /// CIEDE2000.
    #[default]
    Cie2000,
}

impl DeltaEFormula {
    pub fn name(self) -> &'static str {
        match self {
            DeltaEFormula::Cie1976 => "CIE1976",
            DeltaEFormula::Cie1994 => "CIE1994",
            DeltaEFormula::Cie2000 => "CIE2000",
        }
    }
}

impl fmt::Display for DeltaEFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DeltaEFormula {
    type Err = MetricsError;

    /// Accepts "CIE2000", "cie 2000", "CIEDE2000" and the like.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        match key.as_str() {
            "CIE1976" | "CIE76" => Ok(DeltaEFormula::Cie1976),
            "CIE1994" | "CIE94" => Ok(DeltaEFormula::Cie1994),
            "CIE2000" | "CIEDE2000" => Ok(DeltaEFormula::Cie2000),
            _ => Err(MetricsError::UnknownDeltaEFormula(s.to_string())),
        }
    }
}

impl TryFrom<String> for DeltaEFormula {
    type Error = MetricsError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<DeltaEFormula> for String {
    fn from(formula: DeltaEFormula) -> Self {
        formula.name().to_string()
    }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Pairwise perceptual distance between two (N, 3) lists of Lab triples.
///
/// `reference` is the ground truth; asymmetric formulas (CIE1994) weight by it.
pub trait ColorDifferenceProvider {
    fn delta_e(
        &self,
        reference: ArrayView2<f64>,
        sample: ArrayView2<f64>,
        formula: DeltaEFormula,
    ) -> Result<Array1<f64>>;
}

/// The CIE formulas as standardized; CIE1976 and CIEDE2000 come from
/// `palette`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDeltaE;

impl ColorDifferenceProvider for StandardDeltaE {
    fn delta_e(
        &self,
        reference: ArrayView2<f64>,
        sample: ArrayView2<f64>,
        formula: DeltaEFormula,
    ) -> Result<Array1<f64>> {
        if reference.shape() != sample.shape() {
            return Err(MetricsError::ShapeMismatch {
                ground_truth: reference.shape().to_vec(),
                recovered: sample.shape().to_vec(),
            });
        }
        if reference.ncols() != 3 {
            return Err(MetricsError::DimensionMismatch {
                what: "Lab components",
                expected: 3,
                found: reference.ncols(),
            });
        }

        let distance: fn(ArrayView1<f64>, ArrayView1<f64>) -> f64 = match formula {
            DeltaEFormula::Cie1976 => cie1976,
            DeltaEFormula::Cie1994 => cie1994,
            DeltaEFormula::Cie2000 => ciede2000,
        };
        Ok(Zip::from(reference.rows())
            .and(sample.rows())
            .map_collect(|r, s| distance(r, s)))
    }
}

fn cie1976(r: ArrayView1<f64>, s: ArrayView1<f64>) -> f64 {
    let (reference, sample) = lab_pair(r, s);
    reference.delta_e(sample)
}

fn cie1994(r: ArrayView1<f64>, s: ArrayView1<f64>) -> f64 {
    const K1: f64 = 0.045;
    const K2: f64 = 0.015;

    let c1 = r[1].hypot(r[2]);
    let c2 = s[1].hypot(s[2]);
    let sc = 1.0 + K1 * c1;
    let sh = 1.0 + K2 * c1;

    let dl = r[0] - s[0];
    let dc = c1 - c2;
    let da = r[1] - s[1];
    let db = r[2] - s[2];
    // Rounding can push ΔH² a hair below zero for near-neutral pairs.
    let dh_sq = (da * da + db * db - dc * dc).max(0.0);

    (dl * dl + (dc / sc).powi(2) + dh_sq / (sh * sh)).sqrt()
}

fn ciede2000(r: ArrayView1<f64>, s: ArrayView1<f64>) -> f64 {
    let (reference, sample) = lab_pair(r, s);
    reference.difference(sample)
}

fn lab_pair(r: ArrayView1<f64>, s: ArrayView1<f64>) -> (Lab<D65, f64>, Lab<D65, f64>) {
    (Lab::new(r[0], r[1], r[2]), Lab::new(s[0], s[1], s[2]))
}
