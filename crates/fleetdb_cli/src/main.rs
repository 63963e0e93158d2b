//! FleetDB CLI
//!
//! Command-line tools for FleetDB driver snapshots.
//!
//! # Commands
//!
//! - `generate` - Write a synthetic driver snapshot
//! - `inspect` - Display snapshot statistics and index sizes
//! - `search` - Find drivers by name prefix or substring
//! - `nearby` - Radius, k-nearest and best-in-radius queries
//! - `top` - Highest or lowest rated drivers
//! - `compact` - Rewrite a snapshot through a compacted registry
//! - `verify` - Check a snapshot loads cleanly and its indexes agree

mod commands;

use clap::{Parser, Subcommand};
use commands::{BestBy, OutputFormat, Session};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// FleetDB command-line driver registry tools.
#[derive(Parser)]
#[command(name = "fleetdb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the driver snapshot (CSV)
    #[arg(global = true, short, long)]
    file: Option<PathBuf>,

    /// Spatial grid cell size
    #[arg(global = true, long, default_value_t = 1.0)]
    cell_size: f64,

    /// Skip malformed rows instead of failing the load
    #[arg(global = true, long)]
    lenient: bool,

    /// Output format
    #[arg(global = true, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a synthetic driver snapshot
    Generate {
        /// Number of drivers to generate
        #[arg(short = 'n', long, default_value_t = 100)]
        count: u64,

        /// Random seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },

    /// Display snapshot statistics and index sizes
    Inspect,

    /// Find drivers by name
    Search {
        /// Match names starting with this text
        #[arg(short, long, conflicts_with = "contains", required_unless_present = "contains")]
        prefix: Option<String>,

        /// Match names containing this text
        #[arg(short, long)]
        contains: Option<String>,
    },

    /// Find drivers near a point
    Nearby {
        /// X coordinate of the query point
        #[arg(short, long, allow_negative_numbers = true)]
        x: f64,

        /// Y coordinate of the query point
        #[arg(short, long, allow_negative_numbers = true)]
        y: f64,

        /// Search radius
        #[arg(short, long, conflicts_with = "k", required_unless_present = "k")]
        radius: Option<f64>,

        /// Number of nearest drivers
        #[arg(short, long)]
        k: Option<usize>,

        /// Pick the single best driver within the radius
        #[arg(short, long, value_enum, requires = "radius")]
        best: Option<BestBy>,
    },

    /// List the highest rated drivers
    Top {
        /// Number of drivers to list
        #[arg(short, long, default_value_t = 10)]
        k: usize,

        /// List the lowest rated drivers instead
        #[arg(short, long)]
        lowest: bool,
    },

    /// Rewrite the snapshot through a compacted registry
    Compact {
        /// Show what would be done without writing
        #[arg(short, long)]
        dry_run: bool,
    },

    /// Verify that the snapshot loads cleanly and its indexes agree
    Verify,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let session = Session {
        cell_size: cli.cell_size,
        lenient: cli.lenient,
        format: cli.format,
    };

    match cli.command {
        Commands::Generate { count, seed, force } => {
            let path = cli.file.ok_or("Snapshot path required for generate")?;
            commands::generate::run(&path, &session, count, seed, force)?;
        }
        Commands::Inspect => {
            let path = cli.file.ok_or("Snapshot path required for inspect")?;
            commands::inspect::run(&path, &session)?;
        }
        Commands::Search { prefix, contains } => {
            let path = cli.file.ok_or("Snapshot path required for search")?;
            let query = match (prefix, contains) {
                (Some(prefix), _) => commands::search::Query::Prefix(prefix),
                (None, Some(fragment)) => commands::search::Query::Contains(fragment),
                (None, None) => return Err("Either --prefix or --contains is required".into()),
            };
            commands::search::run(&path, &session, &query)?;
        }
        Commands::Nearby {
            x,
            y,
            radius,
            k,
            best,
        } => {
            let path = cli.file.ok_or("Snapshot path required for nearby")?;
            let query = match (radius, k, best) {
                (Some(radius), _, Some(by)) => commands::nearby::Query::Best { radius, by },
                (Some(radius), _, None) => commands::nearby::Query::Radius(radius),
                (None, Some(k), _) => commands::nearby::Query::Nearest(k),
                (None, None, _) => return Err("Either --radius or --k is required".into()),
            };
            commands::nearby::run(&path, &session, (x, y), &query)?;
        }
        Commands::Top { k, lowest } => {
            let path = cli.file.ok_or("Snapshot path required for top")?;
            commands::top::run(&path, &session, k, !lowest)?;
        }
        Commands::Compact { dry_run } => {
            let path = cli.file.ok_or("Snapshot path required for compact")?;
            commands::compact::run(&path, &session, dry_run)?;
        }
        Commands::Verify => {
            let path = cli.file.ok_or("Snapshot path required for verify")?;
            commands::verify::run(&path, &session)?;
        }
        Commands::Version => {
            println!("FleetDB CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("FleetDB Core v{}", fleetdb_core::VERSION);
        }
    }

    Ok(())
}
