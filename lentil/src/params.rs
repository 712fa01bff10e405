use anyhow::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::priors::DgpPriors;

/// Ground-truth regression coefficients of one simulation run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrueParams {
    pub intercept: f64,
    pub slope: f64,
    pub indicator_slope: f64,
}

impl TrueParams {
    /// Draw `intercept`, `slope`, `indicator_slope` in this order
    pub fn sample<R: Rng + ?Sized>(priors: &DgpPriors, rng: &mut R) -> Result<Self> {
        let intercept = priors.intercept.sample(rng)?;
        let slope = priors.slope.sample(rng)?;
        let indicator_slope = priors.indicator_slope.sample(rng)?;
        Ok(Self {
            intercept,
            slope,
            indicator_slope,
        })
    }

    /// `intercept + log_area + slope * count + indicator_slope * indicator`
    #[inline]
    pub fn log_rate(&self, log_area: f64, indicator: u8, count: u64) -> f64 {
        self.intercept
            + log_area
            + self.slope * count as f64
            + self.indicator_slope * indicator as f64
    }

    /// Coefficients against the columns of
    /// [`Covariates::design_matrix`](crate::covariates::Covariates::design_matrix);
    /// the log-area offset has a fixed coefficient of one
    pub fn coefficients(&self) -> nalgebra::DVector<f64> {
        nalgebra::DVector::from_column_slice(&[
            self.intercept,
            1.0,
            self.slope,
            self.indicator_slope,
        ])
    }

    pub fn names() -> [&'static str; 3] {
        ["intercept", "slope", "indicator_slope"]
    }

    pub fn values(&self) -> [f64; 3] {
        [self.intercept, self.slope, self.indicator_slope]
    }
}
