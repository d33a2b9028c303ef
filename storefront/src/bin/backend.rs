use std::error::Error;
use std::sync::Arc;

use commerce::{
    executable_utils::{AppState, initialize_executable, install_metrics_exporter, run_backend},
    storage::ProdStorage,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    println!("Starting backend...");
    let config = initialize_executable()?;
    install_metrics_exporter(&config.backend)?;

    let storage = Arc::new(ProdStorage::new(&config.common.database_url).await?);
    storage.ensure_schema().await?;

    let state = AppState::new(storage, &config.checkout);
    run_backend(config.backend, state).await
}
