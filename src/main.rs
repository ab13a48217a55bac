//! OpenSASE Catalog - variant configuration and cart service

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use opensase_catalog::api::{router, AppState};
use opensase_catalog::config::AppConfig;
use opensase_catalog::services::{CartService, CatalogService};
use opensase_catalog::store::MemoryCartStore;
use opensase_catalog::ColorCardRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())).with(tracing_subscriber::fmt::layer()).init();

    let registry = Arc::new(ColorCardRegistry::standard());
    tracing::info!(cards = registry.len(), "color card registry loaded");
    let state = AppState {
        catalog: Arc::new(CatalogService::new(registry)),
        carts: Arc::new(CartService::new(Arc::new(MemoryCartStore::new()), config.cart_cas_retries)),
        currency: config.default_currency.clone(),
    };

    let addr = config.listen_addr();
    tracing::info!("🚀 OpenSASE Catalog listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, router(state)).await?;
    Ok(())
}
