pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod search;
pub mod utils;

use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}
