//! Fidelis Command-Line Interface
//!
//! Routes benchmark circuits onto noisy devices and compares routing
//! strategies.
//!
//! ```text
//! fidelis route   --target ring:5 --circuit ghz
//! fidelis route   --target device.json --circuit bv --secret 1011 --json
//! fidelis compare --target jakarta --circuit qft --trials 20 --skip-unplannable
//! ```

use clap::{Args, Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::RouterOptions;
use commands::{compare, route, version};

/// Fidelis - noise-aware qubit routing
#[derive(Parser)]
#[command(name = "fidelis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Circuit and device selection shared by all routing commands.
#[derive(Args, Debug)]
struct Workload {
    /// Target: a JSON target file or a preset (linear:N, ring:N, star:N,
    /// full:N, grid:RxC, jakarta)
    #[arg(short, long, env = "FIDELIS_TARGET")]
    target: String,

    /// Benchmark circuit (qft, bv, toffoli, ghz)
    #[arg(short, long, default_value = "ghz")]
    circuit: String,

    /// Bit string for qft and bv
    #[arg(long, default_value = "1011")]
    secret: String,

    /// Width of ghz and toffoli circuits (defaults to the device size)
    #[arg(long)]
    width: Option<u32>,

    /// Seed for sampling accuracies of preset targets
    #[arg(long, default_value = "42")]
    seed: u64,
}

/// Noise-aware router settings.
#[derive(Args, Debug)]
struct RouterArgs {
    /// Hop horizon for the alternative-edge search
    #[arg(long, default_value = "2")]
    search_depth: u32,

    /// Score every candidate edge from the gate's own edge
    #[arg(long)]
    exhaustive: bool,

    /// Split the circuit into ASAP layers instead of one gate per layer
    #[arg(long)]
    asap: bool,

    /// Score candidate edges whose relocation cannot be planned as zero
    #[arg(long)]
    skip_unplannable: bool,
}

impl From<&RouterArgs> for RouterOptions {
    fn from(args: &RouterArgs) -> Self {
        Self {
            search_depth: args.search_depth,
            exhaustive: args.exhaustive,
            asap: args.asap,
            skip_unplannable: args.skip_unplannable,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Route a benchmark circuit onto a target
    Route {
        #[command(flatten)]
        workload: Workload,

        #[command(flatten)]
        router: RouterArgs,

        /// Only restore adjacency; never relocate for fidelity
        #[arg(long)]
        basic: bool,

        /// Print a JSON report instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Compare basic and noise-aware routing on sampled accuracies
    Compare {
        #[command(flatten)]
        workload: Workload,

        #[command(flatten)]
        router: RouterArgs,

        /// Number of sampled accuracy graphs
        #[arg(long, default_value = "10")]
        trials: u32,
    },

    /// Show version information
    Version,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Route {
            workload,
            router,
            basic,
            json,
        } => route::execute(
            &workload.target,
            &workload.circuit,
            &workload.secret,
            workload.width,
            workload.seed,
            RouterOptions::from(&router),
            basic,
            json,
        ),

        Commands::Compare {
            workload,
            router,
            trials,
        } => compare::execute(
            &workload.target,
            &workload.circuit,
            &workload.secret,
            workload.width,
            trials,
            workload.seed,
            RouterOptions::from(&router),
        ),

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
