use anyhow::{bail, Result};
use rand::Rng;
use rand_distr::{Distribution, Gamma, Poisson};
use serde::{Deserialize, Serialize};

/// Count distribution of the outcome given its mean `rate`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutcomeFamily {
    #[default]
    Poisson,
    /// Gamma-Poisson mixture with `Var[y] = rate + rate^2 / phi`
    NegativeBinomial { phi: f64 },
}

impl OutcomeFamily {
    pub fn validate(&self) -> Result<()> {
        if let Self::NegativeBinomial { phi } = self {
            if !(phi.is_finite() && *phi > 0.0) {
                bail!("negative binomial phi must be positive, got {}", phi);
            }
        }
        Ok(())
    }

    /// Draw one count with mean `rate`
    ///
    /// A zero rate (e.g. an underflowed `exp`) gives zero in both
    /// families without touching the RNG.
    pub fn sample<R: Rng + ?Sized>(&self, rate: f64, rng: &mut R) -> Result<u64> {
        check_rate(rate)?;
        if rate == 0.0 {
            return Ok(0);
        }
        match *self {
            Self::Poisson => sample_poisson(rate, rng),
            Self::NegativeBinomial { phi } => {
                let lambda = Gamma::new(phi, rate / phi)?.sample(rng);
                sample_poisson(lambda, rng)
            }
        }
    }

    pub fn variance(&self, rate: f64) -> f64 {
        match *self {
            Self::Poisson => rate,
            Self::NegativeBinomial { phi } => rate + rate * rate / phi,
        }
    }
}

fn check_rate(rate: f64) -> Result<()> {
    if !(rate.is_finite() && rate >= 0.0) {
        bail!("outcome rate must be non-negative and finite, got {}", rate);
    }
    Ok(())
}

/// Poisson draw with `Poisson(0)` taken as the point mass at zero
pub(crate) fn sample_poisson<R: Rng + ?Sized>(rate: f64, rng: &mut R) -> Result<u64> {
    if rate == 0.0 {
        return Ok(0);
    }
    let rpois = Poisson::new(rate)?;
    Ok(rpois.sample(rng) as u64)
}
