//! Database connection pool

use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};

use backoffice_shared::config::DatabaseSettings;

pub async fn create_pool(url: &str, settings: &DatabaseSettings) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect(url)
        .await
}
