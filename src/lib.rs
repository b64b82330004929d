//! Core library for the `aqiflow` air quality monitoring project.
//!
//! Three batch stages share this crate: ingestion pulls hourly weather and
//! pollution readings into the store, training runs a model tournament and
//! appends the champion to the registry, and the forecast path drives the
//! winning model recursively over upcoming weather. The `serve` stage
//! exposes the read-only API the dashboard consumes.
//!
//! Module boundaries follow the Explicit Module Boundary Pattern (EMBP):
//! `routes` and `commands` are gateways over their directories, and the
//! re-exports below are the names sibling modules are expected to use.

pub mod aqi;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod forecast;
pub mod ingest;
pub mod ml;
pub mod models;
pub mod routes;
pub mod schema;
pub mod store;
pub mod train;

pub use config::Config;
pub use error::{PipelineError, Result};

// These are re-exported for routes/*.rs and the integration tests, that way
// refactoring is easier since consumers only need to know the crate root,
// not which module owns each type.
pub use forecast::{ForecastRun, DEFAULT_SEED_LAG};
pub use models::{ForecastPoint, Reading, WeatherPoint};
pub use train::{LeaderboardEntry, ModelArtifact};
