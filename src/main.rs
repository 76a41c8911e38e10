//! Itinerary Solver - Command Line Interface
//!
//! Builds a one-day itinerary from a CSV of points of interest.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itinerary_solver::benchmark::{generate_report, ScenarioSweep};
use itinerary_solver::exact::{BranchAndBound, BranchAndBoundConfig};
use itinerary_solver::heuristics::{ConstructionHeuristic, GreedyRatioHeuristic};
use itinerary_solver::instance::OrienteeringInstance;
use itinerary_solver::poi::{InstanceConfig, PoiDataset};

use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "itinerary-solver")]
#[command(version = "1.0")]
#[command(about = "Time-constrained itinerary planning (orienteering problem)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand that builds an instance
#[derive(clap::Args, Clone)]
struct DataArgs {
    /// CSV file of points of interest
    #[arg(long)]
    csv: PathBuf,

    /// Latitude of the hotel/depot
    #[arg(long, default_value = "-8.4095", allow_hyphen_values = true)]
    lat0: f64,

    /// Longitude of the hotel/depot
    #[arg(long, default_value = "115.1889", allow_hyphen_values = true)]
    lon0: f64,

    /// Average travel speed (km/h)
    #[arg(long, default_value = "30")]
    speed_kmh: f64,

    /// Weight of the rating in the stop value
    #[arg(long, default_value = "1.0")]
    w_rating: f64,

    /// Weight of the price level in the stop value
    #[arg(long, default_value = "0.0")]
    w_cost: f64,

    /// Only use N randomly sampled POIs (0 keeps them all)
    #[arg(long, default_value = "20")]
    sample_n: usize,

    /// Random seed for sampling
    #[arg(short, long, default_value = "42")]
    seed: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one itinerary with the greedy heuristic and branch-and-bound
    Solve {
        #[command(flatten)]
        data: DataArgs,

        /// Total time available (minutes)
        #[arg(short, long, default_value = "480")]
        time_limit: f64,

        /// Maximum number of node expansions
        #[arg(long, default_value = "100000")]
        max_nodes: usize,

        /// Wall-clock limit for branch-and-bound (seconds)
        #[arg(long)]
        time_cap: Option<f64>,

        /// Seed branch-and-bound with the greedy route
        #[arg(long)]
        warm_start: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Compare greedy and branch-and-bound over several time budgets
    Sweep {
        #[command(flatten)]
        data: DataArgs,

        /// Time budgets in minutes, comma separated
        #[arg(short, long, value_delimiter = ',', default_value = "120,240,480")]
        budgets: Vec<f64>,

        /// Maximum number of node expansions per scenario
        #[arg(long, default_value = "100000")]
        max_nodes: usize,

        /// Wall-clock limit per scenario (seconds)
        #[arg(long)]
        time_cap: Option<f64>,

        /// Seed each search with its greedy route
        #[arg(long)]
        warm_start: bool,

        /// Solve scenarios one after the other
        #[arg(long)]
        sequential: bool,
    },

    /// Show the cleaning report and instance statistics
    Analyze {
        #[command(flatten)]
        data: DataArgs,

        /// Total time available (minutes)
        #[arg(short, long, default_value = "480")]
        time_limit: f64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Solve { verbose: true, .. });
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Solve { data, time_limit, max_nodes, time_cap, warm_start, json, verbose } => {
            solve_itinerary(&data, time_limit, max_nodes, time_cap, warm_start, json, verbose)
        }
        Commands::Sweep { data, budgets, max_nodes, time_cap, warm_start, sequential } => {
            run_sweep(&data, budgets, max_nodes, time_cap, warm_start, sequential)
        }
        Commands::Analyze { data, time_limit } => analyze(&data, time_limit),
    }
}

fn load_dataset(data: &DataArgs) -> Result<PoiDataset> {
    let dataset = PoiDataset::from_csv_path(&data.csv)
        .with_context(|| format!("failed to load POIs from {:?}", data.csv))?;
    if data.sample_n > 0 && dataset.len() > data.sample_n {
        Ok(dataset.sample(data.sample_n, data.seed))
    } else {
        Ok(dataset)
    }
}

fn build_instance(dataset: &PoiDataset, data: &DataArgs, time_budget: f64) -> Result<OrienteeringInstance> {
    let config = InstanceConfig {
        depot_lat: data.lat0,
        depot_lon: data.lon0,
        speed_kmh: data.speed_kmh,
        time_budget,
        w_rating: data.w_rating,
        w_cost: data.w_cost,
    };
    let name = data
        .csv
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "itinerary".to_string());
    let instance = dataset
        .to_instance(&config)
        .context("failed to build the orienteering instance")?;
    Ok(instance.with_name(&name))
}

fn stop_label(instance: &OrienteeringInstance, stop: usize) -> String {
    instance
        .label(stop)
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("#{}", stop))
}

fn solve_itinerary(
    data: &DataArgs,
    time_limit: f64,
    max_nodes: usize,
    time_cap: Option<f64>,
    warm_start: bool,
    json: bool,
    verbose: bool,
) -> Result<()> {
    let dataset = load_dataset(data)?;
    let instance = build_instance(&dataset, data, time_limit)?;

    if verbose && !json {
        println!("{}", dataset.report);
        println!("{}", instance.statistics());
    }

    let greedy = GreedyRatioHeuristic::new().construct(&instance);

    let config = BranchAndBoundConfig {
        max_nodes,
        time_limit: time_cap,
        warm_start: if warm_start { Some(greedy.stops.clone()) } else { None },
        ..Default::default()
    };
    let result = BranchAndBound::new(config).solve(&instance)?;

    if json {
        let output = json!({
            "greedy": greedy,
            "branch_and_bound": result,
            "budget_exhausted": result.budget_exhausted(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("\n========== Greedy ==========");
    print!("{}", greedy);

    println!("\n========== Branch and Bound ==========");
    print!("{}", result);
    if result.budget_exhausted() {
        println!("  (search stopped by a limit: the route is feasible but not proven optimal)");
    }

    println!("\n========== Comparison ==========");
    println!("Greedy value: {:.2}", greedy.total_value);
    println!("B&B value:    {:.2}", result.best_value);

    println!("\nItinerary:");
    for (position, &stop) in result.best_route.iter().enumerate() {
        println!("  {:>2}. {}", position, stop_label(&instance, stop));
    }

    Ok(())
}

fn run_sweep(
    data: &DataArgs,
    budgets: Vec<f64>,
    max_nodes: usize,
    time_cap: Option<f64>,
    warm_start: bool,
    sequential: bool,
) -> Result<()> {
    let dataset = load_dataset(data)?;
    let instance = build_instance(&dataset, data, 0.0)?;

    let sweep = ScenarioSweep {
        budgets,
        config: BranchAndBoundConfig {
            max_nodes,
            time_limit: time_cap,
            ..Default::default()
        },
        warm_start,
        parallel: !sequential,
    };

    println!("Solving {} scenarios on {} stops...", sweep.budgets.len(), instance.num_stops());
    let results = sweep.run(&instance)?;
    print!("{}", generate_report(&results));

    Ok(())
}

fn analyze(data: &DataArgs, time_limit: f64) -> Result<()> {
    let dataset = load_dataset(data)?;
    let instance = build_instance(&dataset, data, time_limit)?;

    println!("{}", dataset.report);
    println!("{}", instance.statistics());

    Ok(())
}
