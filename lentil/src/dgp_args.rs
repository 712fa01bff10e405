use anyhow::Result;
use clap::Args;
use log::info;

use lentil::{DgpConfig, OutcomeFamily};

/// Generator settings shared by the simulation commands
#[derive(Args, Debug, Clone)]
pub struct DgpArgs {
    #[arg(short = 'n', long, default_value = "100", help = "Number of units")]
    pub num_units: usize,

    #[arg(
        long,
        help = "Mean of the Poisson count covariate (default 8, or the config file's)"
    )]
    pub count_rate: Option<f64>,

    #[arg(
        long,
        help = "Draw negative binomial outcomes with this overdispersion phi"
    )]
    pub nb_phi: Option<f64>,

    #[arg(long, help = "JSON file with priors and covariate settings")]
    pub config: Option<Box<str>>,

    #[arg(long, default_value = "42", help = "Random seed")]
    pub seed: u64,
}

impl DgpArgs {
    /// Config file first, then explicit flags on top
    pub fn to_config(&self) -> Result<DgpConfig> {
        let mut config = match &self.config {
            Some(file) => {
                info!("reading generator config: {}", file);
                DgpConfig::from_json_file(file)?
            }
            None => DgpConfig::default(),
        };
        if let Some(rate) = self.count_rate {
            config.covariates.count_rate = rate;
        }
        if let Some(phi) = self.nb_phi {
            config.family = OutcomeFamily::NegativeBinomial { phi };
        }
        config.validate()?;
        Ok(config)
    }
}
