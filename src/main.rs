use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use bird_ghg::config::CoreConfig;
use bird_ghg::records::{DatasetSnapshot, EmissionColumn, Gas, GasSelection, YearSeries};
use bird_ghg::selection::{Model, SelectionResolver, Stage};
use bird_ghg::synthetic::{generate, SyntheticParams};
use bird_ghg::utility::round_to;
use bird_ghg::{CoreError, Result};

/// Fits a regression between a region's emissions and a bird population index.
#[derive(Parser, Debug)]
#[command(name = "bird_ghg", version)]
struct Args {
    #[arg(long, default_value = "Canada")]
    region: String,

    #[arg(long, default_value = "Waterfowl")]
    species: String,

    /// A gas (CO2, CH4, N2O, HFC, PFC, SF6, NF3), Total, or "Multiple Regression"
    #[arg(long, default_value = "CO2")]
    gas: String,

    /// Emission amounts in kt: one value, or seven for multiple regression.
    /// Defaults to the region's most recent year.
    #[arg(long, value_delimiter = ',')]
    amount: Vec<f64>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the synthetic datasets
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => CoreConfig::from_path(path)?,
        None => CoreConfig::default(),
    };

    let raw = generate(&SyntheticParams::default(), &config.alignment, args.seed)?;
    let snapshot = raw.snapshot()?;

    let mut resolver = SelectionResolver::new(&config);
    resolver.record_choice(Stage::Region, &args.region)?;
    resolver.record_choice(Stage::Species, &args.species)?;
    resolver.record_choice(Stage::Gas, &args.gas)?;

    let model = resolver.build_model(&snapshot)?;
    let latest = |column| latest_value(&snapshot, args.region.trim(), column, config.alignment.end);

    println!("Region: {}  Species: {}  Gas: {}", args.region, args.species, args.gas);
    match (&model, resolver.selection().gas) {
        (Model::Simple(simple), Some(GasSelection::Column(column))) => {
            let amount = match args.amount.as_slice() {
                [] => latest(column)?,
                [amount] => *amount,
                other => {
                    return Err(CoreError::InvalidData(format!(
                        "expected one amount, got {}",
                        other.len()
                    )))
                }
            };
            println!(
                "Bird Population Change (From 1970) at {} kt: {} %",
                round_to(amount, 2),
                round_to(simple.predict_y(amount), 2)
            );
            let line = simple.line_of_best_fit();
            println!(
                "Regression line: ({}, {}) to ({}, {})",
                round_to(line.x[0], 2),
                round_to(line.y[0], 2),
                round_to(line.x[1], 2),
                round_to(line.y[1], 2)
            );
            match simple.predict_x(0.0) {
                Ok(x) => println!("Emissions for no change since 1970: {} kt", round_to(x, 2)),
                Err(e) => println!("Emissions for no change since 1970: n/a ({e})"),
            }
        }
        (Model::Multiple(multiple), _) => {
            let amounts: [f64; 7] = if args.amount.is_empty() {
                let mut amounts = [0.0; 7];
                for gas in Gas::ALL {
                    amounts[gas.index()] = latest(EmissionColumn::Gas(gas))?;
                }
                amounts
            } else {
                args.amount.as_slice().try_into().map_err(|_| {
                    CoreError::InvalidData(format!(
                        "expected seven amounts, got {}",
                        args.amount.len()
                    ))
                })?
            };
            for (gas, weight) in multiple.coefficients() {
                println!("{gas} Weight: {weight:.2e}");
            }
            println!(
                "Bird Population Change (From 1970): {} %",
                round_to(multiple.predict_value(amounts), 2)
            );
        }
        (Model::Simple(_), _) => {
            return Err(CoreError::InvalidData(
                "single-gas model without a single-gas selection".to_string(),
            ))
        }
    }
    println!("R^2 = {}", round_to(model.r_squared(), 2));
    Ok(())
}

fn latest_value(
    snapshot: &DatasetSnapshot,
    region: &str,
    column: EmissionColumn,
    year: i32,
) -> Result<f64> {
    snapshot
        .region(region)?
        .column(column)
        .value(year)
        .ok_or_else(|| CoreError::Range {
            start: year,
            end: year,
            reason: format!("no {} data for {region}", column.name()),
        })
}
