use anyhow::Result;
use clap::Args;
use log::info;
use rayon::prelude::*;

use lentil::io::{write_dataset_tsv, write_truth_json};
use lentil::replicates::{simulate_replicates, ReplicateArgs};

use crate::dgp_args::DgpArgs;

#[derive(Args, Debug, Clone)]
pub struct ReplicateCmdArgs {
    #[arg(
        short,
        long,
        help = "Output prefix: {out}.{r}.data.tsv.gz and {out}.{r}.truth.json"
    )]
    pub out: Box<str>,

    #[arg(short = 'r', long, default_value = "100", help = "Number of replicates")]
    pub num_replicates: usize,

    #[command(flatten)]
    pub dgp: DgpArgs,
}

pub fn replicate(args: &ReplicateCmdArgs) -> Result<()> {
    let rep_args = ReplicateArgs {
        num_replicates: args.num_replicates,
        num_units: args.dgp.num_units,
        rseed: args.dgp.seed,
        config: args.dgp.to_config()?,
    };

    let sims = simulate_replicates(&rep_args)?;

    sims.par_iter()
        .enumerate()
        .map(|(r, sim)| -> Result<()> {
            write_dataset_tsv(sim, &format!("{}.{}.data.tsv.gz", args.out, r))?;
            write_truth_json(sim, &format!("{}.{}.truth.json", args.out, r))?;
            Ok(())
        })
        .collect::<Result<Vec<_>>>()?;

    info!("wrote {} replicates under {}", sims.len(), args.out);
    Ok(())
}
