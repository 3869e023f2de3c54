use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use u_rota::error::RotaError;
use u_rota::input::load_csv;
use u_rota::logging;
use u_rota::rota::{report, FairnessStrategy, RotaConfig, RotaOutcome, RotaRunner};

#[derive(Parser, Debug)]
#[command(name = "u-rota")]
#[command(about = "Weekly main/standby shift rota assigner", long_about = None)]
struct Cli {
    /// Availability CSV (First, Last, email, days, <Day>_<period> columns)
    #[arg(short, long)]
    input: PathBuf,

    /// JSON configuration; missing fields take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Solver time budget in seconds
    #[arg(short, long)]
    time_limit: Option<u64>,

    /// Fairness formulation: variance or bottleneck
    #[arg(short, long)]
    strategy: Option<FairnessStrategy>,

    /// Also print the contact list
    #[arg(long)]
    contacts: bool,

    /// Print plain names in the grid instead of Name_label
    #[arg(long)]
    no_debug_info: bool,
}

fn load_config(cli: &Cli) -> Result<RotaConfig, RotaError> {
    let mut config = match &cli.config {
        Some(path) => RotaConfig::from_json_file(path)?,
        None => RotaConfig::default(),
    };
    if let Some(secs) = cli.time_limit {
        config.max_time_seconds = secs;
    }
    if let Some(strategy) = cli.strategy {
        config.fairness = strategy;
    }
    if cli.no_debug_info {
        config.debug_info = false;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), RotaError> {
    let config = load_config(cli)?;
    let problem = load_csv(&cli.input, &config)?;
    let RotaOutcome {
        quality,
        objective_value,
        roster,
        solve_time_ms,
    } = RotaRunner::run(&problem, &config)?;

    print!("{}", report::render_grid(&problem, &config, &roster));
    println!();
    println!();
    println!("TOTALS");
    println!();
    print!("{}", report::render_totals(&problem, &roster));
    if cli.contacts {
        println!();
        print!("{}", report::render_contacts(&problem, &config, &roster));
    }
    println!();
    match objective_value {
        Some(value) => println!("status: {quality:?}  objective: {value}  time: {solve_time_ms} ms"),
        None => println!("status: {quality:?}  time: {solve_time_ms} ms"),
    }
    Ok(())
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err @ RotaError::Infeasible) => {
            error!("{err}");
            ExitCode::from(2)
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
