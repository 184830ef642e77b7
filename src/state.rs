use crate::{
    config::SaleConfig,
    db::{DbPool, OrmConn, orm_from_pool},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub sale: SaleConfig,
}

impl AppState {
    pub fn new(pool: DbPool, sale: SaleConfig) -> Self {
        let orm = orm_from_pool(&pool);
        Self { pool, orm, sale }
    }
}
