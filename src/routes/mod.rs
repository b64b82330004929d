use axum::Router;
use sqlx::PgPool;

use crate::Config;

mod forecast;
mod health;
mod readings;
mod registry;

// ---

pub fn router(pool: PgPool, config: Config) -> Router {
    // ---
    Router::new()
        .merge(readings::router())
        .merge(registry::router())
        .merge(forecast::router())
        .merge(health::router())
        .with_state((pool, config))
}
