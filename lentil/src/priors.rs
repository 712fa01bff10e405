use anyhow::{bail, Result};
use log::debug;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::io::{open_buf_reader, open_buf_writer};
use crate::outcome::OutcomeFamily;

pub const DEFAULT_COUNT_RATE: f64 = 8.0;
pub const DEFAULT_INDICATOR_PROB: f64 = 0.5;

/// Normal(mean, sd) prior on a scalar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalPrior {
    pub mean: f64,
    pub sd: f64,
}

impl NormalPrior {
    pub fn new(mean: f64, sd: f64) -> Self {
        Self { mean, sd }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if !self.mean.is_finite() {
            bail!("{}: prior mean must be finite, got {}", name, self.mean);
        }
        if !(self.sd.is_finite() && self.sd > 0.0) {
            bail!("{}: prior sd must be positive, got {}", name, self.sd);
        }
        Ok(())
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<f64> {
        let dist = Normal::new(self.mean, self.sd)?;
        Ok(dist.sample(rng))
    }
}

/// Priors on the regression coefficients
///
/// ```text
/// intercept       ~ N(ln 4, 0.1)
/// slope           ~ N(-0.25, 0.1)
/// indicator_slope ~ N(-0.5, 1)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DgpPriors {
    pub intercept: NormalPrior,
    pub slope: NormalPrior,
    pub indicator_slope: NormalPrior,
}

impl Default for DgpPriors {
    fn default() -> Self {
        Self {
            intercept: NormalPrior::new(4_f64.ln(), 0.1),
            slope: NormalPrior::new(-0.25, 0.1),
            indicator_slope: NormalPrior::new(-0.5, 1.0),
        }
    }
}

impl DgpPriors {
    pub fn validate(&self) -> Result<()> {
        self.intercept.validate("intercept")?;
        self.slope.validate("slope")?;
        self.indicator_slope.validate("indicator_slope")?;
        Ok(())
    }
}

/// Distributions of the per-unit covariates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CovariateConfig {
    pub log_area: NormalPrior,
    pub indicator_prob: f64,
    /// mean of the Poisson count covariate
    pub count_rate: f64,
}

impl Default for CovariateConfig {
    fn default() -> Self {
        Self {
            log_area: NormalPrior::new(1.5, 0.1),
            indicator_prob: DEFAULT_INDICATOR_PROB,
            count_rate: DEFAULT_COUNT_RATE,
        }
    }
}

impl CovariateConfig {
    pub fn validate(&self) -> Result<()> {
        self.log_area.validate("log_area")?;
        if !(0.0..=1.0).contains(&self.indicator_prob) {
            bail!(
                "indicator probability must lie in [0, 1], got {}",
                self.indicator_prob
            );
        }
        validate_count_rate(self.count_rate)
    }
}

pub fn validate_count_rate(count_rate: f64) -> Result<()> {
    if !(count_rate.is_finite() && count_rate > 0.0) {
        bail!("count covariate rate must be positive, got {}", count_rate);
    }
    Ok(())
}

/// Everything the generator needs besides the sample size and the RNG
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DgpConfig {
    pub priors: DgpPriors,
    pub covariates: CovariateConfig,
    pub family: OutcomeFamily,
}

impl DgpConfig {
    pub fn with_count_rate(count_rate: f64) -> Self {
        Self {
            covariates: CovariateConfig {
                count_rate,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.priors.validate()?;
        self.covariates.validate()?;
        self.family.validate()
    }

    /// Read a (possibly partial) config from a JSON file
    pub fn from_json_file(path: &str) -> Result<Self> {
        let reader = open_buf_reader(path)?;
        let config: Self = serde_json::from_reader(reader)?;
        config.validate()?;
        debug!("read DGP config from {}: {:?}", path, config);
        Ok(config)
    }

    pub fn to_json_file(&self, path: &str) -> Result<()> {
        if Path::new(path).is_dir() {
            bail!("{} is a directory", path);
        }
        let mut writer = open_buf_writer(path)?;
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_priors_match_the_tutorial() {
        let priors = DgpPriors::default();
        assert!((priors.intercept.mean - 1.3862943611198906).abs() < 1e-12);
        assert_eq!(priors.slope, NormalPrior::new(-0.25, 0.1));
        assert_eq!(priors.indicator_slope, NormalPrior::new(-0.5, 1.0));
        assert!(DgpConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_constants() {
        assert!(NormalPrior::new(0.0, 0.0).validate("x").is_err());
        assert!(NormalPrior::new(f64::NAN, 1.0).validate("x").is_err());

        let cov = CovariateConfig {
            indicator_prob: 1.5,
            ..Default::default()
        };
        assert!(cov.validate().is_err());

        assert!(DgpConfig::with_count_rate(0.0).validate().is_err());
        assert!(DgpConfig::with_count_rate(-3.0).validate().is_err());
        assert!(DgpConfig::with_count_rate(f64::INFINITY).validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() -> anyhow::Result<()> {
        let config: DgpConfig = serde_json::from_str(r#"{"covariates": {"count_rate": 3.5}}"#)?;
        assert_eq!(config.covariates.count_rate, 3.5);
        assert_eq!(config.covariates.log_area, NormalPrior::new(1.5, 0.1));
        assert_eq!(config.priors, DgpPriors::default());
        assert_eq!(config.family, OutcomeFamily::Poisson);
        Ok(())
    }
}
