//! Order Store Binary
//!
//! Opens the order store, applies pending migrations and prints every stored
//! order as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin order-store
//! ```
//!
//! # Environment Variables
//!
//! - `ORDER_STORE_CONFIG`: Path to the YAML config (default: config.yaml;
//!   built-in defaults when the file does not exist)
//! - `RUST_LOG`: Log filter, overrides `observability.logging.level`

use anyhow::Context;
use order_store::config::{DEFAULT_CONFIG_PATH, load_config_or_default};
use order_store::observability::init_logging;
use order_store::{OrderDto, OrderRepository, SqliteOrderRepository};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let config_path =
        std::env::var("ORDER_STORE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config_or_default(Some(&config_path))
        .with_context(|| format!("loading configuration from {config_path}"))?;

    init_logging(&config.observability.logging).context("initializing logging")?;

    tracing::info!(
        config = %config_path,
        database = %config.persistence.database_url,
        "Starting order store"
    );

    let repo = SqliteOrderRepository::connect(&config.persistence)
        .await
        .context("opening order store")?;

    let orders = repo.find_all().await.context("loading orders")?;
    let dtos: Vec<OrderDto> = orders.iter().map(OrderDto::from).collect();
    println!("{}", serde_json::to_string_pretty(&dtos)?);

    tracing::info!(count = dtos.len(), "Order store ready");
    repo.close().await;

    Ok(())
}

/// Load `.env` from the working directory or the nearest ancestor.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
