use anyhow::{bail, Result};
use nalgebra::DMatrix;
use rand::Rng;
use rand_distr::{Bernoulli, Distribution, Normal, Poisson};
use serde::{Deserialize, Serialize};

use crate::priors::CovariateConfig;

/// Per-unit covariates, all of the same length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Covariates {
    log_area: Vec<f64>,
    indicator: Vec<u8>,
    count_covariate: Vec<u64>,
}

impl Covariates {
    /// Wrap fixed covariates
    ///
    /// * `log_area` - finite log-area per unit
    /// * `indicator` - binary group indicator, each 0 or 1
    /// * `count_covariate` - count covariate per unit
    pub fn new(log_area: Vec<f64>, indicator: Vec<u8>, count_covariate: Vec<u64>) -> Result<Self> {
        let n = log_area.len();
        if n == 0 {
            bail!("covariates must contain at least one unit");
        }
        if indicator.len() != n || count_covariate.len() != n {
            bail!(
                "covariate lengths differ: log_area {}, indicator {}, count_covariate {}",
                n,
                indicator.len(),
                count_covariate.len()
            );
        }
        if let Some(i) = indicator.iter().position(|&x| x > 1) {
            bail!("indicator[{}] = {} is not binary", i, indicator[i]);
        }
        if let Some(i) = log_area.iter().position(|x| !x.is_finite()) {
            bail!("log_area[{}] = {} is not finite", i, log_area[i]);
        }
        Ok(Self {
            log_area,
            indicator,
            count_covariate,
        })
    }

    /// Draw `n` fresh units
    pub fn sample<R: Rng + ?Sized>(
        n: usize,
        config: &CovariateConfig,
        rng: &mut R,
    ) -> Result<Self> {
        if n == 0 {
            bail!("number of units must be positive");
        }
        let sampler = CovariateSampler::new(config)?;
        let mut ret = Self::with_capacity(n);
        for _ in 0..n {
            let (a, x, c) = sampler.sample_unit(rng);
            ret.push(a, x, c);
        }
        Ok(ret)
    }

    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            log_area: Vec::with_capacity(n),
            indicator: Vec::with_capacity(n),
            count_covariate: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, log_area: f64, indicator: u8, count: u64) {
        self.log_area.push(log_area);
        self.indicator.push(indicator);
        self.count_covariate.push(count);
    }

    pub fn len(&self) -> usize {
        self.log_area.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log_area.is_empty()
    }

    pub fn log_area(&self) -> &[f64] {
        &self.log_area
    }

    pub fn indicator(&self) -> &[u8] {
        &self.indicator
    }

    pub fn count_covariate(&self) -> &[u64] {
        &self.count_covariate
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<u8>, Vec<u64>) {
        (self.log_area, self.indicator, self.count_covariate)
    }

    /// N x 4 design matrix with columns `[1, log_area, count, indicator]`
    pub fn design_matrix(&self) -> DMatrix<f64> {
        let n = self.len();
        DMatrix::from_fn(n, 4, |i, j| match j {
            0 => 1.0,
            1 => self.log_area[i],
            2 => self.count_covariate[i] as f64,
            _ => self.indicator[i] as f64,
        })
    }
}

/// Covariate distributions built once per call
pub(crate) struct CovariateSampler {
    log_area: Normal<f64>,
    indicator: Bernoulli,
    count: Poisson<f64>,
}

impl CovariateSampler {
    pub(crate) fn new(config: &CovariateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            log_area: Normal::new(config.log_area.mean, config.log_area.sd)?,
            indicator: Bernoulli::new(config.indicator_prob)?,
            count: Poisson::new(config.count_rate)?,
        })
    }

    /// Draw log-area, indicator and count covariate in this order
    pub(crate) fn sample_unit<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, u8, u64) {
        let log_area = self.log_area.sample(rng);
        let indicator = self.indicator.sample(rng) as u8;
        let count = self.count.sample(rng) as u64;
        (log_area, indicator, count)
    }
}
