use anyhow::{Context, Result};

use super::config_model::{Database, DotEnvyConfig, Server, StorageBackend};

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    load_from(|key| std::env::var(key).ok())
}

pub fn load_from<F>(env: F) -> Result<DotEnvyConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let server = Server {
        port: env("SERVER_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse()
            .context("SERVER_PORT is invalid")?,
        body_limit: env("SERVER_BODY_LIMIT")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("SERVER_BODY_LIMIT is invalid")?,
        timeout: env("SERVER_TIMEOUT")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .context("SERVER_TIMEOUT is invalid")?,
    };

    let backend = StorageBackend::try_from(env("STORAGE_BACKEND").unwrap_or_default().as_str())
        .context("STORAGE_BACKEND is invalid")?;

    let url = env("DATABASE_URL").and_then(|v| {
        let trimmed = v.trim().to_string();
        (!trimmed.is_empty()).then_some(trimmed)
    });

    if backend == StorageBackend::Postgres && url.is_none() {
        anyhow::bail!("DATABASE_URL is invalid");
    }

    Ok(DotEnvyConfig {
        server,
        database: Database { backend, url },
    })
}
