use anyhow::{bail, Result};
use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::covariates::{CovariateSampler, Covariates};
use crate::outcome::OutcomeFamily;
use crate::params::TrueParams;
use crate::priors::{validate_count_rate, DgpConfig};

/// Ground truth together with the simulated dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimOut {
    pub intercept: f64,
    pub slope: f64,
    pub indicator_slope: f64,
    pub log_area: Vec<f64>,
    pub indicator: Vec<u8>,
    pub count_covariate: Vec<u64>,
    pub outcome: Vec<u64>,
}

/// Summary of the outcome counts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetSummary {
    pub num_units: usize,
    pub mean: f64,
    pub variance: f64,
    pub frac_zero: f64,
    pub max: u64,
}

impl SimOut {
    fn from_parts(params: TrueParams, covariates: Covariates, outcome: Vec<u64>) -> Self {
        let (log_area, indicator, count_covariate) = covariates.into_parts();
        Self {
            intercept: params.intercept,
            slope: params.slope,
            indicator_slope: params.indicator_slope,
            log_area,
            indicator,
            count_covariate,
            outcome,
        }
    }

    pub fn num_units(&self) -> usize {
        self.outcome.len()
    }

    pub fn params(&self) -> TrueParams {
        TrueParams {
            intercept: self.intercept,
            slope: self.slope,
            indicator_slope: self.indicator_slope,
        }
    }

    pub fn covariates(&self) -> Result<Covariates> {
        Covariates::new(
            self.log_area.clone(),
            self.indicator.clone(),
            self.count_covariate.clone(),
        )
    }

    /// Linear predictor recomputed from the returned fields
    pub fn log_rates(&self) -> Vec<f64> {
        let params = self.params();
        self.log_area
            .iter()
            .zip(self.indicator.iter())
            .zip(self.count_covariate.iter())
            .map(|((&a, &x), &c)| params.log_rate(a, x, c))
            .collect()
    }

    pub fn rates(&self) -> Vec<f64> {
        self.log_rates().into_iter().map(f64::exp).collect()
    }

    /// Average of `outcome[i] / rate[i]`, which should be close to one
    pub fn mean_rate_ratio(&self) -> f64 {
        let n = self.num_units();
        if n == 0 {
            return f64::NAN;
        }
        self.outcome
            .iter()
            .zip(self.rates())
            .map(|(&y, r)| y as f64 / r)
            .sum::<f64>()
            / n as f64
    }

    pub fn summary(&self) -> DatasetSummary {
        let n = self.num_units();
        let nf = n.max(1) as f64;
        let mean = self.outcome.iter().map(|&y| y as f64).sum::<f64>() / nf;
        let variance = if n > 1 {
            self.outcome
                .iter()
                .map(|&y| (y as f64 - mean).powi(2))
                .sum::<f64>()
                / (n - 1) as f64
        } else {
            0.0
        };
        let zeros = self.outcome.iter().filter(|&&y| y == 0).count();
        DatasetSummary {
            num_units: n,
            mean,
            variance,
            frac_zero: zeros as f64 / nf,
            max: self.outcome.iter().copied().max().unwrap_or(0),
        }
    }
}

/// Simulate a Poisson log-link dataset with the default priors
///
/// ```text
/// intercept ~ N(ln 4, 0.1), slope ~ N(-0.25, 0.1), b ~ N(-0.5, 1)
/// A(i) ~ N(1.5, 0.1), X(i) ~ Bernoulli(0.5), C(i) ~ Poisson(count_rate)
/// Y(i) ~ Poisson( exp(intercept + A(i) + slope * C(i) + b * X(i)) )
/// ```
///
/// * `rng` - randomness source, the only state this consumes
/// * `n` - number of units, at least one
/// * `count_rate` - mean of the count covariate, positive
pub fn simulate_dgp<R: Rng + ?Sized>(rng: &mut R, n: usize, count_rate: f64) -> Result<SimOut> {
    validate_count_rate(count_rate)?;
    simulate_dgp_with(rng, n, &DgpConfig::with_count_rate(count_rate))
}

/// Simulate parameters, covariates and outcomes from `config`
///
/// Parameters are drawn first, then each unit's log-area, indicator,
/// count covariate and outcome in turn.
pub fn simulate_dgp_with<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    config: &DgpConfig,
) -> Result<SimOut> {
    if n == 0 {
        bail!("number of units must be positive");
    }
    config.validate()?;
    let sampler = CovariateSampler::new(&config.covariates)?;

    let params = TrueParams::sample(&config.priors, rng)?;
    debug!("true parameters: {:?}", params);

    let mut covariates = Covariates::with_capacity(n);
    let mut outcome = Vec::with_capacity(n);

    for _ in 0..n {
        let (a, x, c) = sampler.sample_unit(rng);
        let rate = params.log_rate(a, x, c).exp();
        outcome.push(config.family.sample(rate, rng)?);
        covariates.push(a, x, c);
    }

    Ok(SimOut::from_parts(params, covariates, outcome))
}

/// Keep the covariates fixed; draw fresh parameters and the outcome only
pub fn simulate_outcome_given<R: Rng + ?Sized>(
    rng: &mut R,
    covariates: &Covariates,
    config: &DgpConfig,
) -> Result<SimOut> {
    config.priors.validate()?;
    config.family.validate()?;

    let params = TrueParams::sample(&config.priors, rng)?;
    let outcome = draw_outcomes(rng, &params, covariates, &config.family)?;
    Ok(SimOut::from_parts(params, covariates.clone(), outcome))
}

/// Draw outcomes for fixed parameters and covariates
pub fn draw_outcomes<R: Rng + ?Sized>(
    rng: &mut R,
    params: &TrueParams,
    covariates: &Covariates,
    family: &OutcomeFamily,
) -> Result<Vec<u64>> {
    family.validate()?;
    // check every rate before drawing anything
    let rates: Vec<f64> = (covariates.design_matrix() * params.coefficients())
        .iter()
        .map(|eta| eta.exp())
        .collect();
    if let Some(i) = rates.iter().position(|r| !r.is_finite()) {
        bail!("rate[{}] = {} is not finite", i, rates[i]);
    }
    rates.into_iter().map(|r| family.sample(r, rng)).collect()
}
