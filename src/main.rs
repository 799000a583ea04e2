use std::env;
use std::error::Error;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use leave_engine::api::{create_router, AppState};
use leave_engine::config::ConfigLoader;
use leave_engine::service::ReviewService;
use leave_engine::store::InMemoryLeaveStore;

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_ADDR: &str = "0.0.0.0:3000";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config_dir = env::var("LEAVE_ENGINE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let addr = env::var("LEAVE_ENGINE_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir)?;
    info!(
        policy = %config.metadata().name,
        version = %config.metadata().version,
        "Loaded leave policy from {}",
        config_dir
    );

    let store = match env::var("LEAVE_ENGINE_SEED") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)?;
            let store = InMemoryLeaveStore::from_json(&json)?;
            info!(seed = %path, "Seeded leave store");
            store
        }
        Err(_) => InMemoryLeaveStore::new(),
    };

    let service = ReviewService::new(Arc::new(store), config.policy().clone());
    let router = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "Leave engine listening");
    axum::serve(listener, router).await?;

    Ok(())
}
