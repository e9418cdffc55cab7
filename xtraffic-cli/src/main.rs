//! XTraffic CLI - replay synthetic remote traffic through the interpolation engine.

mod commands;
mod error;
mod scenario;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::simulate::{ModeArg, SimulateArgs};

#[derive(Parser)]
#[command(name = "xtraffic")]
#[command(version, about = "Remote aircraft interpolation for flight simulator pilot clients", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed a synthetic approach and landing through the engine and print the interpolated stream
    Simulate {
        /// Configuration file (default: ~/.xtraffic/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Interpolator, overrides the configuration
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Number of remote aircraft
        #[arg(long, default_value = "3")]
        aircraft: usize,

        /// Render rate in frames per second
        #[arg(long, default_value = "30")]
        hz: u32,

        /// Simulation length in seconds
        #[arg(long, default_value = "60")]
        seconds: u64,

        /// Maximum network delay of a report in milliseconds
        #[arg(long, default_value = "300")]
        jitter_ms: u64,

        /// Print every Nth frame
        #[arg(long, default_value = "30")]
        every: u64,
    },

    /// Print the effective configuration
    Config {
        /// Configuration file (default: ~/.xtraffic/config.ini)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Simulate {
            config,
            mode,
            aircraft,
            hz,
            seconds,
            jitter_ms,
            every,
        } => commands::simulate::run(SimulateArgs {
            config,
            mode,
            aircraft,
            hz,
            seconds,
            jitter_ms,
            every,
        }),
        Commands::Config { config } => commands::config::run(config),
    };

    if let Err(e) = result {
        e.exit();
    }
}
