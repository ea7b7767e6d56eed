use log::info;
use ndarray::{Array1, Array2, ArrayView3};

use crate::color::{self, ColorDifferenceProvider, StandardDeltaE};
use crate::config::MetricConfig;
use crate::data::model::{Metric, MetricReport, MetricResult, ResponseTable};
use crate::error::{MetricsError, Result};
use crate::metrics::preprocess::{check_white_point, PreparedPair};
use crate::metrics::similarity::{StructuralSimilarityProvider, WindowedSsim};
use crate::metrics::{angular, divergence, residual, similarity};

// ---------------------------------------------------------------------------
// Evaluator – configured front end over every metric
// ---------------------------------------------------------------------------

/// Runs metrics by name with configured stabilizers, response matrices and
/// providers.
pub struct Evaluator {
    config: MetricConfig,
    cmf: Option<Array2<f64>>,
    crf: Option<Array2<f64>>,
    white_point: Option<Array1<f64>>,
    color_difference: Box<dyn ColorDifferenceProvider>,
    structural_similarity: Box<dyn StructuralSimilarityProvider>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(MetricConfig::default())
    }
}

impl Evaluator {
    pub fn new(config: MetricConfig) -> Self {
        let ssim = WindowedSsim::new(config.ssim);
        Self {
            config,
            cmf: None,
            crf: None,
            white_point: None,
            color_difference: Box::new(StandardDeltaE),
            structural_similarity: Box::new(ssim),
        }
    }

    /// Color matching function (bands, 3) for DeltaE and ProLab.
    pub fn with_cmf(mut self, cmf: Array2<f64>) -> Self {
        self.cmf = Some(cmf);
        self
    }

    /// Camera response (bands, 3) for BPMRAE.
    pub fn with_crf(mut self, crf: Array2<f64>) -> Self {
        self.crf = Some(crf);
        self
    }

    /// Illuminant spectrum for DeltaE.
    pub fn with_white_point(mut self, white_point: Array1<f64>) -> Self {
        self.white_point = Some(white_point);
        self
    }

    pub fn with_cmf_table(self, table: ResponseTable) -> Self {
        self.with_cmf(table.values)
    }

    pub fn with_crf_table(self, table: ResponseTable) -> Self {
        self.with_crf(table.values)
    }

    pub fn with_color_difference(mut self, provider: Box<dyn ColorDifferenceProvider>) -> Self {
        self.color_difference = provider;
        self
    }

    pub fn with_structural_similarity(
        mut self,
        provider: Box<dyn StructuralSimilarityProvider>,
    ) -> Self {
        self.structural_similarity = provider;
        self
    }

    pub fn config(&self) -> &MetricConfig {
        &self.config
    }

    /// Metrics whose extra inputs are all configured.
    pub fn available(&self) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| match m {
                Metric::Bpmrae => self.crf.is_some(),
                Metric::DeltaE => self.cmf.is_some() && self.white_point.is_some(),
                Metric::ProLabDistance => self.cmf.is_some(),
                _ => true,
            })
            .collect()
    }

    /// Validate the pair and run one metric.
    pub fn evaluate<A>(
        &self,
        metric: Metric,
        ground_truth: ArrayView3<A>,
        recovered: ArrayView3<A>,
    ) -> Result<MetricResult>
    where
        A: Copy + Into<f64>,
    {
        let pair = PreparedPair::new(ground_truth, recovered)?;
        self.evaluate_prepared(metric, &pair)
    }

    /// Run every available metric on one pair, validating it once.
    ///
    /// The first failing metric aborts the whole report.
    pub fn evaluate_all<A>(
        &self,
        ground_truth: ArrayView3<A>,
        recovered: ArrayView3<A>,
    ) -> Result<MetricReport>
    where
        A: Copy + Into<f64>,
    {
        let pair = PreparedPair::new(ground_truth, recovered)?;
        let metrics = self.available();
        info!(
            "evaluating {} metrics on a {:?} pair",
            metrics.len(),
            pair.dim()
        );
        let mut report = MetricReport::new();
        for metric in metrics {
            report.insert(metric, self.evaluate_prepared(metric, &pair)?);
        }
        Ok(report)
    }

    /// Run one metric on an already validated pair.
    pub fn evaluate_prepared(&self, metric: Metric, pair: &PreparedPair) -> Result<MetricResult> {
        let eps = &self.config.epsilon;
        let result: MetricResult = match metric {
            Metric::Appsa => angular::appsa(pair, eps.appsa).into(),
            Metric::MangE => angular::mange(pair, eps.mange).into(),
            Metric::Sam => angular::sam(pair).into(),
            Metric::Mse => residual::mse(pair).into(),
            Metric::Rmse => residual::rmse(pair).into(),
            Metric::Mrae => residual::mrae(pair, eps.mrae).into(),
            Metric::Bpmrae => {
                let crf = require(&self.crf, metric, "camera response function")?;
                pair.check_response("camera response function", crf.view())?;
                residual::bpmrae(pair, crf.view(), eps.bpmrae)?.into()
            }
            Metric::Psnr => residual::psnr(pair, eps.psnr).into(),
            Metric::Msid => divergence::msid(pair, eps.msid).into(),
            Metric::Gfc => similarity::gfc(pair).into(),
            Metric::Mssim => similarity::mssim(pair, self.structural_similarity.as_ref())?.into(),
            Metric::DeltaE => {
                let cmf = require(&self.cmf, metric, "color matching function")?;
                let wp = require(&self.white_point, metric, "white point spectrum")?;
                pair.check_response("color matching function", cmf.view())?;
                check_white_point(wp.view(), pair.bands())?;
                color::delta_e_from_spectra(
                    pair,
                    cmf.view(),
                    wp.view(),
                    self.config.delta_e,
                    self.color_difference.as_ref(),
                )?
                .into()
            }
            Metric::ProLabDistance => {
                let cmf = require(&self.cmf, metric, "color matching function")?;
                color::prolab_distance(pair, cmf.view())?.into()
            }
        };

        if self.config.strict {
            result.ensure_finite(metric)
        } else {
            Ok(result)
        }
    }
}

fn require<'a, T>(input: &'a Option<T>, metric: Metric, what: &'static str) -> Result<&'a T> {
    input.as_ref().ok_or(MetricsError::MissingInput {
        metric: metric.name(),
        input: what,
    })
}
