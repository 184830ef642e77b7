#![allow(dead_code)]

use pos_register::{
    config::SaleConfig,
    db::{create_pool, run_migrations, seed_default_products},
    dto::sales::{RecordSaleRequest, SaleLineRequest},
    state::AppState,
};
use rust_decimal::Decimal;

pub const COFFEE: i64 = 1;
pub const TEA: i64 = 2;
pub const SANDWICH: i64 = 3;

/// Fresh in-memory store with the schema applied and the default catalog seeded.
pub async fn setup_state(sale: SaleConfig) -> anyhow::Result<AppState> {
    setup_state_at("sqlite::memory:", 1, sale).await
}

pub async fn setup_state_at(
    database_url: &str,
    max_connections: u32,
    sale: SaleConfig,
) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url, max_connections).await?;
    run_migrations(&pool).await?;
    seed_default_products(&pool).await?;
    Ok(AppState::new(pool, sale))
}

pub fn line(product_id: i64, qty: i32, price: Decimal) -> SaleLineRequest {
    SaleLineRequest {
        product_id: Some(product_id),
        qty: Some(qty),
        price: Some(price),
        name: None,
    }
}

pub fn sale(items: Vec<SaleLineRequest>, total: Decimal) -> RecordSaleRequest {
    RecordSaleRequest {
        items: Some(items),
        total: Some(total),
        customer_name: None,
    }
}

pub async fn count_rows(state: &AppState, table: &str) -> anyhow::Result<i64> {
    let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(&state.pool)
        .await?;
    Ok(count)
}
