use pos_register::{
    config::AppConfig,
    db::{DEFAULT_PRODUCTS, create_pool, run_migrations, seed_default_products},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url, 1).await?;
    // Ensure migrations are applied.
    run_migrations(&pool).await?;

    let inserted = seed_default_products(&pool).await?;

    println!(
        "Seed completed. {inserted} of {} default products inserted.",
        DEFAULT_PRODUCTS.len()
    );
    Ok(())
}
