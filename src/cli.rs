//! Command-line interface: one subcommand per pipeline stage.
//!
//! Every stage is an independent process invocation sharing nothing but the
//! store; scheduling (cron or otherwise) lives outside this binary.

use clap::{Parser, Subcommand};

// ---

/// aqiflow - air quality monitoring and forecasting pipelines
#[derive(Parser, Debug)]
#[command(name = "aqiflow")]
#[command(about = "Air quality monitoring and forecasting pipelines", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch the current hour's readings and upsert them into the store
    Ingest,

    /// Fetch the past day of hourly readings and upsert each complete hour
    Backfill,

    /// Run the model tournament and append the winner to the registry
    Train,

    /// Score the current champion against the last day of observations
    Accuracy(AccuracyArgs),

    /// Serve the HTTP API for readings, registry and forecasts
    Serve(ServeArgs),
}

#[derive(Parser, Debug)]
pub struct AccuracyArgs {
    /// How many recent observed hours to score against
    #[arg(long, default_value = "24")]
    pub hours: u32,
}

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Port to bind the API server on
    #[arg(long, default_value = "8080")]
    pub port: u16,
}
