pub mod covariates;
pub mod io;
pub mod outcome;
pub mod params;
pub mod priors;
pub mod recovery;
pub mod replicates;
pub mod simulate;

pub use covariates::Covariates;
pub use outcome::OutcomeFamily;
pub use params::TrueParams;
pub use priors::{CovariateConfig, DgpConfig, DgpPriors, NormalPrior};
pub use simulate::{draw_outcomes, simulate_dgp, simulate_dgp_with, simulate_outcome_given, SimOut};
