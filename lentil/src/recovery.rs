//! Posterior recovery checks against the known simulation truth.
//!
//! The posterior draws come from an external fitter; nothing here fits
//! a model.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::params::TrueParams;

/// Posterior draws for each regression coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorDraws {
    pub intercept: Vec<f64>,
    pub slope: Vec<f64>,
    pub indicator_slope: Vec<f64>,
}

impl PosteriorDraws {
    pub fn new(intercept: Vec<f64>, slope: Vec<f64>, indicator_slope: Vec<f64>) -> Result<Self> {
        let s = intercept.len();
        if s == 0 {
            bail!("no posterior draws");
        }
        if slope.len() != s || indicator_slope.len() != s {
            bail!(
                "unequal number of draws: intercept {}, slope {}, indicator_slope {}",
                s,
                slope.len(),
                indicator_slope.len()
            );
        }
        Ok(Self {
            intercept,
            slope,
            indicator_slope,
        })
    }

    pub fn num_draws(&self) -> usize {
        self.intercept.len()
    }
}

/// How well the draws of one parameter recover its true value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRecovery {
    pub name: Box<str>,
    pub truth: f64,
    pub posterior_mean: f64,
    pub posterior_sd: f64,
    pub z_score: f64,
    pub lower: f64,
    pub upper: f64,
    pub covered: bool,
    /// number of draws strictly below the truth
    pub rank: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryReport {
    pub level: f64,
    pub num_draws: usize,
    pub params: Vec<ParamRecovery>,
}

impl RecoveryReport {
    pub fn all_covered(&self) -> bool {
        self.params.iter().all(|p| p.covered)
    }

    pub fn get(&self, name: &str) -> Option<&ParamRecovery> {
        self.params.iter().find(|p| p.name.as_ref() == name)
    }

    /// Tab-separated table with a header line
    pub fn to_lines(&self) -> Vec<Box<str>> {
        let mut lines = vec![Box::from(
            "param\ttruth\tmean\tsd\tz\tlower\tupper\tcovered\trank",
        )];
        for p in &self.params {
            lines.push(
                format!(
                    "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                    p.name,
                    p.truth,
                    p.posterior_mean,
                    p.posterior_sd,
                    p.z_score,
                    p.lower,
                    p.upper,
                    p.covered,
                    p.rank
                )
                .into_boxed_str(),
            );
        }
        lines
    }
}

fn check_level(level: f64) -> Result<()> {
    if !(level > 0.0 && level < 1.0) {
        bail!("interval level must lie in (0, 1), got {}", level);
    }
    Ok(())
}

/// Linearly interpolated quantile of sorted data
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let w = pos - lo as f64;
    sorted[lo] * (1.0 - w) + sorted[hi] * w
}

/// Summarize posterior draws of one parameter against its truth
///
/// * `level` - mass of the central credible interval, e.g. 0.9
pub fn summarize_recovery(
    name: &str,
    truth: f64,
    draws: &[f64],
    level: f64,
) -> Result<ParamRecovery> {
    check_level(level)?;
    if draws.is_empty() {
        bail!("{}: no posterior draws", name);
    }
    if let Some(x) = draws.iter().find(|x| !x.is_finite()) {
        bail!("{}: non-finite posterior draw {}", name, x);
    }

    let s = draws.len() as f64;
    let mean = draws.iter().sum::<f64>() / s;
    let sd = if draws.len() > 1 {
        (draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (s - 1.0)).sqrt()
    } else {
        0.0
    };
    let z_score = if sd > 0.0 { (mean - truth) / sd } else { 0.0 };

    let mut sorted = draws.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let lower = quantile_sorted(&sorted, (1.0 - level) / 2.0);
    let upper = quantile_sorted(&sorted, (1.0 + level) / 2.0);
    let rank = sorted.partition_point(|&x| x < truth);

    Ok(ParamRecovery {
        name: Box::from(name),
        truth,
        posterior_mean: mean,
        posterior_sd: sd,
        z_score,
        lower,
        upper,
        covered: lower <= truth && truth <= upper,
        rank,
    })
}

pub fn check_recovery(
    truth: &TrueParams,
    draws: &PosteriorDraws,
    level: f64,
) -> Result<RecoveryReport> {
    let params = vec![
        summarize_recovery("intercept", truth.intercept, &draws.intercept, level)?,
        summarize_recovery("slope", truth.slope, &draws.slope, level)?,
        summarize_recovery(
            "indicator_slope",
            truth.indicator_slope,
            &draws.indicator_slope,
            level,
        )?,
    ];
    Ok(RecoveryReport {
        level,
        num_draws: draws.num_draws(),
        params,
    })
}

/// Histogram of SBC ranks; each rank lies in `0..=num_draws`
pub fn rank_histogram(ranks: &[usize], num_draws: usize, num_bins: usize) -> Result<Vec<usize>> {
    if num_bins == 0 {
        bail!("number of bins must be positive");
    }
    let support = num_draws + 1;
    if num_bins > support {
        bail!("{} bins exceed {} possible ranks", num_bins, support);
    }
    let mut hist = vec![0; num_bins];
    for &r in ranks {
        if r > num_draws {
            bail!("rank {} exceeds the number of draws {}", r, num_draws);
        }
        hist[r * num_bins / support] += 1;
    }
    Ok(hist)
}

/// Pearson chi-square statistic of a histogram against uniform counts
pub fn rank_uniformity_chi2(hist: &[usize]) -> f64 {
    let total: usize = hist.iter().sum();
    if hist.is_empty() || total == 0 {
        return 0.0;
    }
    let expected = total as f64 / hist.len() as f64;
    hist.iter()
        .map(|&h| (h as f64 - expected).powi(2) / expected)
        .sum()
}
