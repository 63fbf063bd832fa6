pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod observability;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::{
    config::config_model::StorageBackend,
    infrastructure::{
        axum_http::http_serve,
        in_memory::subscriptions::SubscriptionInMemory,
        postgres::{postgres_connection, repositories::subscriptions::SubscriptionPostgres},
    },
};

pub async fn run() -> Result<()> {
    let dotenvy_env = config::config_loader::load()?;
    info!("ENV has been loaded");

    let dotenvy_env = Arc::new(dotenvy_env);

    match dotenvy_env.database.backend {
        StorageBackend::Postgres => {
            let database_url = dotenvy_env
                .database
                .url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is required for postgres storage"))?;
            let postgres_pool = postgres_connection::establish_connection(&database_url)?;
            info!("Postgres connection has been established");

            let repository = SubscriptionPostgres::new(Arc::new(postgres_pool));
            http_serve::start(dotenvy_env, Arc::new(repository)).await?;
        }
        StorageBackend::Memory => {
            info!("Using in-memory subscription storage");
            http_serve::start(dotenvy_env, Arc::new(SubscriptionInMemory::new())).await?;
        }
    }

    Ok(())
}
