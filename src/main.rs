//! # Butterfly-facade CLI
//!
//! Command-line interface for the butterfly-facade library.
//! Opens a region, reports what it carries and answers graph and snapping queries.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use butterfly_facade::core::NodeId;
use butterfly_facade::spatial::{Approach, Bearing};
use butterfly_facade::{Algorithm, AnyFacade, BaseFacade, Coordinate, FacadeConfig, GraphView, MemoryMode};

mod cli;

/// Command-line interface for butterfly-facade
#[derive(Parser)]
#[command(name = "butterfly-facade")]
#[command(about = "Inspect and query contiguous routing datasets")]
#[command(long_about = "Serves a precomputed road network packed into one region file:
  butterfly-facade --region belgium.bfr inspect
  butterfly-facade --region belgium.bfr nearest --lon 4.3517 --lat 50.8503 --count 3
  butterfly-facade --region belgium.bfr --algorithm mld edges --node 42

Settings can also come from a JSON config (--config); flags override it.")]
#[command(version)]
struct Cli {
    /// Region file to open
    #[arg(long, global = true)]
    region: Option<PathBuf>,

    /// JSON facade config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Routing algorithm whose graph to load: ch or mld
    #[arg(long, global = true)]
    algorithm: Option<Algorithm>,

    /// Metric name, e.g. routability or duration
    #[arg(long, global = true)]
    metric: Option<String>,

    /// Profile exclude combination
    #[arg(long, global = true)]
    exclude: Option<usize>,

    /// Hold the region as a shared mapping or a private copy
    #[arg(long, global = true)]
    memory: Option<MemoryMode>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every dataset and the optional features the region carries
    Inspect,
    /// Snap a coordinate onto the network
    Nearest {
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Maximum number of candidates
        #[arg(long)]
        count: Option<usize>,
        /// Search radius in meters
        #[arg(long)]
        radius: Option<f64>,
        /// Accepted travel direction as "bearing,range"
        #[arg(long)]
        bearing: Option<Bearing>,
        /// Side of the road the point may be reached from
        #[arg(long, default_value_t = Approach::Unrestricted)]
        approach: Approach,
        /// Also consider segments routes cannot start on (needs --radius)
        #[arg(long)]
        all_edges: bool,
        /// Also return the nearest candidates outside tiny components
        #[arg(long)]
        big_component: bool,
    },
    /// Print the out-edges of a node of the loaded graph
    Edges {
        #[arg(long)]
        node: NodeId,
    },
}

fn main() {
    if let Err(e) = run() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Config file (or defaults) with flag overrides applied
fn resolve_config(cli: &Cli) -> Result<FacadeConfig> {
    let mut config = match &cli.config {
        Some(path) => FacadeConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FacadeConfig::default(),
    };
    if let Some(region) = &cli.region {
        config.region = region.clone();
    }
    if let Some(algorithm) = cli.algorithm {
        config.algorithm = algorithm;
    }
    if let Some(metric) = &cli.metric {
        config.metric = metric.clone();
    }
    if let Some(exclude) = cli.exclude {
        config.exclude_index = exclude;
    }
    if let Some(memory) = cli.memory {
        config.memory = memory;
    }
    Ok(config)
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = resolve_config(&cli)?;
    let region = config
        .open_region()
        .with_context(|| format!("failed to open region {}", config.region.display()))?;
    info!(region = %config.region.display(), memory = %config.memory, "region opened");

    match cli.command {
        Command::Inspect => {
            let attributes =
                BaseFacade::load(&region, config.exclude_index).context("failed to load common datasets")?;
            cli::print_json(&cli::InspectReport::new(&region, &attributes))?;
        }
        Command::Nearest {
            lon,
            lat,
            count,
            radius,
            bearing,
            approach,
            all_edges,
            big_component,
        } => {
            let attributes =
                BaseFacade::load(&region, config.exclude_index).context("failed to load common datasets")?;
            let input = Coordinate::from_degrees(lon, lat);
            if !input.is_valid() {
                bail!("coordinate {lon},{lat} is out of range");
            }

            if big_component {
                let alternatives = attributes
                    .nearest_candidates_with_alternative_from_big_component(input, radius, bearing, approach, all_edges);
                cli::print_json(&alternatives)?;
                return Ok(());
            }
            let candidates = match (count, radius) {
                (None, Some(radius)) => {
                    attributes.nearest_phantom_nodes_in_range(input, radius, bearing, approach, all_edges)
                }
                _ if all_edges => bail!("--all-edges searches a radius; pass --radius without --count"),
                (count, radius) => {
                    attributes.nearest_phantom_nodes(input, count.unwrap_or(1), radius, bearing, approach)
                }
            };
            cli::print_json(&candidates)?;
        }
        Command::Edges { node } => {
            let facade = AnyFacade::new(&region, config.algorithm, &config.metric, config.exclude_index)
                .with_context(|| format!("failed to build {} facade for metric {}", config.algorithm, config.metric))?;
            let graph = facade.graph();
            if node as usize >= graph.number_of_nodes() {
                bail!("node {node} out of range ({} nodes)", graph.number_of_nodes());
            }
            cli::print_json(&cli::NodeEdges::new(graph, node))?;
        }
    }
    Ok(())
}
