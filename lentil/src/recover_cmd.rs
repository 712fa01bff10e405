use anyhow::Result;
use clap::Args;
use log::{info, warn};

use lentil::io::{read_posterior_draws_tsv, read_truth_json, write_lines};
use lentil::recovery::check_recovery;

#[derive(Args, Debug, Clone)]
pub struct RecoverArgs {
    #[arg(long, help = "True parameters written by `simulate`")]
    pub truth: Box<str>,

    #[arg(
        long,
        help = "Posterior draws with a header naming intercept, slope, indicator_slope"
    )]
    pub draws: Box<str>,

    #[arg(long, default_value = "0.9", help = "Central credible interval mass")]
    pub level: f64,

    #[arg(short, long, default_value = "stdout", help = "Output table")]
    pub out: Box<str>,
}

pub fn recover(args: &RecoverArgs) -> Result<()> {
    let truth = read_truth_json(&args.truth)?;
    let draws = read_posterior_draws_tsv(&args.draws)?;
    let report = check_recovery(&truth, &draws, args.level)?;

    for p in report.params.iter().filter(|p| !p.covered) {
        warn!(
            "{}: truth {:.4} outside [{:.4}, {:.4}]",
            p.name, p.truth, p.lower, p.upper
        );
    }
    if report.all_covered() {
        info!(
            "all parameters inside their {:.0}% intervals",
            100.0 * report.level
        );
    }

    write_lines(&report.to_lines(), &args.out)?;
    Ok(())
}
