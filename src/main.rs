use dotenvy::dotenv;
use tourbook::{
    config::{catalog, database},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the catalog configuration
    let catalog_config = catalog::load_default_config()
        .inspect_err(|e| error!("Failed to load catalog configuration: {e}"))?;
    info!(
        tours = catalog_config.tours.len(),
        promo_codes = catalog_config.promo_codes.len(),
        "Loaded catalog configuration."
    );

    // 4. Initialize database
    let db = database::create_connection()
        .await
        .inspect(|_| info!("Database connection established."))
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db)
        .await
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Seed tours, schedules, and promo codes (idempotent)
    catalog::seed_catalog(&db, &catalog_config)
        .await
        .inspect(|_| info!("Catalog seeded successfully."))
        .inspect_err(|e| error!("Failed to seed catalog: {e}"))?;

    Ok(())
}
