//! Command-line interface for the OpenJobMarket server.

use clap::{Parser, Subcommand};

/// OpenJobMarket - map-based job marketplace backend
#[derive(Parser)]
#[command(name = "openjobmarket")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    #[command(alias = "-s", alias = "--serve")]
    Serve,

    /// Create a default config file
    #[command(alias = "--init")]
    Init,

    /// Check database connectivity and print a short status summary
    #[command(alias = "-c", alias = "--check")]
    Check,
}
