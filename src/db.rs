use std::{str::FromStr, time::Duration};

use anyhow::Result;
use sea_orm::{DatabaseConnection, SqlxSqliteConnector};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub type DbPool = SqlitePool;
pub type OrmConn = DatabaseConnection;

/// Catalog inserted on bootstrap when missing. Prices are whole currency units.
pub const DEFAULT_PRODUCTS: [(&str, i64); 3] = [("Coffee", 50), ("Tea", 40), ("Sandwich", 100)];

/// Open the SQLite pool backing both the raw queries and the ORM.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    // Every connection to `:memory:` opens its own database, so keep exactly one alive.
    let pool = if is_memory_url(database_url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?
    };
    Ok(pool)
}

/// Wrap the sqlx pool in a SeaORM connection sharing the same connections.
pub fn orm_from_pool(pool: &DbPool) -> OrmConn {
    SqlxSqliteConnector::from_sqlx_sqlite_pool(pool.clone())
}

pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Insert the default catalog, leaving existing products untouched.
/// Returns how many rows were actually added.
pub async fn seed_default_products(pool: &DbPool) -> Result<u64> {
    let mut inserted = 0;
    for (name, price) in DEFAULT_PRODUCTS {
        let result = sqlx::query("INSERT OR IGNORE INTO products (name, price) VALUES (?, ?)")
            .bind(name)
            .bind(price as f64)
            .execute(pool)
            .await?;
        inserted += result.rows_affected();
    }
    Ok(inserted)
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}
