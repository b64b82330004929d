//! Stage entry points dispatched from `main.rs`.
//!
//! Each submodule is one batch run: build its collaborators explicitly,
//! do the work, log the outcome. No state survives the invocation.

mod accuracy;
mod backfill;
mod ingest;
mod serve;
mod train;

pub use accuracy::run as run_accuracy;
pub use backfill::run as run_backfill;
pub use ingest::run as run_ingest;
pub use serve::run as run_serve;
pub use train::run as run_train;
