use sea_orm::{EntityTrait, QueryOrder};

use crate::{
    entity::products::{Column, Entity as Products, Model as ProductModel},
    error::AppResult,
    models::Product,
    state::AppState,
};

/// The whole catalog in insertion order.
pub async fn list_products(state: &AppState) -> AppResult<Vec<Product>> {
    let items = Products::find()
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(product_from_entity)
        .collect();
    Ok(items)
}

pub(crate) fn product_from_entity(model: ProductModel) -> Product {
    Product {
        id: model.id,
        name: model.name,
        price: model.price,
    }
}
