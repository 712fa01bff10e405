use anyhow::Result;
use clap::Args;
use log::info;
use rand::SeedableRng;

use lentil::io::{write_dataset_tsv, write_truth_json};
use lentil::simulate_dgp_with;

use crate::dgp_args::DgpArgs;

#[derive(Args, Debug, Clone)]
pub struct SimulateArgs {
    #[arg(
        short,
        long,
        help = "Output prefix: {out}.data.tsv.gz and {out}.truth.json"
    )]
    pub out: Box<str>,

    #[command(flatten)]
    pub dgp: DgpArgs,
}

pub fn simulate(args: &SimulateArgs) -> Result<()> {
    let config = args.dgp.to_config()?;
    info!(
        "simulating {} units, count rate {}, {:?} outcomes, seed {}",
        args.dgp.num_units, config.covariates.count_rate, config.family, args.dgp.seed
    );

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.dgp.seed);
    let sim = simulate_dgp_with(&mut rng, args.dgp.num_units, &config)?;

    let s = sim.summary();
    info!(
        "outcome mean {:.3}, variance {:.3}, zeros {:.1}%, max {}",
        s.mean,
        s.variance,
        100.0 * s.frac_zero,
        s.max
    );
    info!(
        "true parameters: intercept {:.4}, slope {:.4}, indicator slope {:.4}",
        sim.intercept, sim.slope, sim.indicator_slope
    );

    write_dataset_tsv(&sim, &format!("{}.data.tsv.gz", args.out))?;
    write_truth_json(&sim, &format!("{}.truth.json", args.out))?;

    info!("done");
    Ok(())
}
