mod dgp_args;
mod recover_cmd;
mod replicate_cmd;
mod simulate_cmd;

use recover_cmd::*;
use replicate_cmd::*;
use simulate_cmd::*;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

const LOGO: &str = include_str!("../logo.txt");

fn colorize_logo_line(line: &str) -> String {
    line.replace('o', &"o".truecolor(139, 90, 43).to_string())
        .replace('(', &"(".truecolor(160, 120, 60).to_string())
        .replace(')', &")".truecolor(160, 120, 60).to_string())
        .replace('~', &"~".green().to_string())
}

fn print_logo() {
    for line in LOGO.lines() {
        println!("  {}", colorize_logo_line(line));
    }
    println!(" {}", "Log-linEar couNT sImuLator".bold());
    println!();
}

/// Log-linEar couNT sImuLator
#[derive(Parser)]
#[command(name = "lentil", version, about, long_about, term_width = 80)]
struct Cli {
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate one count-regression dataset with its true parameters
    Simulate(SimulateArgs),
    /// Simulate many independent datasets for calibration studies
    #[command(alias = "rep")]
    Replicate(ReplicateCmdArgs),
    /// Compare posterior draws from an external fit with the truth
    Recover(RecoverArgs),
}

fn main() -> Result<()> {
    if std::env::args().any(|arg| arg == "--help" || arg == "-h") {
        print_logo();
    }

    let cli = Cli::parse();

    if cli.verbose {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    match &cli.commands {
        Commands::Simulate(args) => {
            simulate(args)?;
        }
        Commands::Replicate(args) => {
            replicate(args)?;
        }
        Commands::Recover(args) => {
            recover(args)?;
        }
    }

    Ok(())
}
