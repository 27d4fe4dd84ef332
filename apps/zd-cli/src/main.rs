use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use zd_app::{AppResult, Solver};
use zd_calibrator::{ObservationSet, calibrate, format_results};
use zd_config::{Config, load_model};

#[derive(Parser)]
#[command(name = "zerodsolver")]
#[command(about = "0D/lumped-parameter hemodynamic network solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation from a JSON network configuration.
    Run {
        /// Path to the network configuration JSON.
        config_path: PathBuf,
        /// Path to write the result CSV to.
        output_path: PathBuf,
    },
    /// Recover block parameters from observed trajectories.
    Calibrate {
        /// Path to a JSON file containing the network configuration plus
        /// `y`/`dy` observation maps.
        config_path: PathBuf,
        /// Path to write the recovered parameter values to.
        output_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config_path, output_path } => cmd_run(&config_path, &output_path),
        Commands::Calibrate { config_path, output_path } => cmd_calibrate(&config_path, &output_path),
    }
}

fn read_config(path: &Path) -> AppResult<(String, Config)> {
    let text = std::fs::read_to_string(path).map_err(zd_config::ConfigError::from)?;
    let config: Config = serde_json::from_str(&text).map_err(zd_config::ConfigError::from)?;
    Ok((text, config))
}

fn cmd_run(config_path: &Path, output_path: &Path) -> AppResult<()> {
    let (_text, config) = read_config(config_path)?;

    let mut solver = Solver::from_config(&config)?;
    println!("running {} vessel network...", config.vessels.len());
    solver.run()?;

    if solver.output_last_cycle_only {
        let summary = solver.get_full_result_summary()?;
        zd_results::write_summary_csv(output_path, &summary)?;
    } else {
        let rows = solver.get_full_result()?;
        zd_results::write_csv(output_path, &rows)?;
    }
    println!("wrote results to {}", output_path.display());
    Ok(())
}

fn cmd_calibrate(config_path: &Path, output_path: &Path) -> AppResult<()> {
    let (text, config) = read_config(config_path)?;
    let (model, _sim_params) = load_model(&config)?;

    let observations = ObservationSet::from_json(&text)?;
    let samples = observations.to_dense(model.dofhandler())?;
    let alpha = calibrate(&model, &samples)?;
    let lines = format_results(&model, &alpha);

    std::fs::write(output_path, lines.join("\n") + "\n").map_err(zd_config::ConfigError::from)?;
    for line in &lines {
        println!("{line}");
    }
    println!("wrote calibrated parameters to {}", output_path.display());
    Ok(())
}
