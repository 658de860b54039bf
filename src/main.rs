use dotenvy::dotenv;
use product_base::{api::ProductApi, config, context::AppContext, errors::Result};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const STARTUP_PAGE: u64 = 20;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load config.toml (defaults when absent)
    let app_config = config::load_default_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Open the database and wire the services
    let context = AppContext::from_config(&app_config)
        .await
        .inspect(|_| info!("Services initialized."))
        .inspect_err(|e| error!("Failed to initialize services: {}", e))?;

    // 5. Report what the store currently holds
    let api = ProductApi::new(context);
    let listing = api.get_all_products(STARTUP_PAGE, 0).await;
    let count = listing.payload.as_ref().map_or(0, Vec::len);
    info!(
        "Product service ready ({} products on the first page, status {}).",
        count,
        listing.http_status()
    );

    Ok(())
}
