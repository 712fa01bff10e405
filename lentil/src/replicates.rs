use anyhow::{bail, Result};
use indicatif::ParallelProgressIterator;
use log::info;
use rand::SeedableRng;
use rayon::prelude::*;

use crate::priors::DgpConfig;
use crate::simulate::{simulate_dgp_with, SimOut};

pub struct ReplicateArgs {
    pub num_replicates: usize,
    pub num_units: usize,
    pub rseed: u64,
    pub config: DgpConfig,
}

/// Seed used for replicate `r`
#[inline]
pub fn replicate_seed(rseed: u64, r: usize) -> u64 {
    rseed.wrapping_add(r as u64)
}

/// Simulate independent datasets, replicate `r` seeded by `rseed + r`
///
/// The result is in replicate order. A failure in any replicate fails
/// the whole batch.
pub fn simulate_replicates(args: &ReplicateArgs) -> Result<Vec<SimOut>> {
    if args.num_replicates == 0 {
        bail!("number of replicates must be positive");
    }
    if args.num_units == 0 {
        bail!("number of units must be positive");
    }
    args.config.validate()?;

    info!(
        "simulating {} replicates of {} units each",
        args.num_replicates, args.num_units
    );

    let ret = (0..args.num_replicates)
        .into_par_iter()
        .progress_count(args.num_replicates as u64)
        .map(|r| {
            let mut rng = rand::rngs::StdRng::seed_from_u64(replicate_seed(args.rseed, r));
            simulate_dgp_with(&mut rng, args.num_units, &args.config)
        })
        .collect::<Result<Vec<_>>>()?;

    info!("simulated {} replicates", ret.len());
    Ok(ret)
}
