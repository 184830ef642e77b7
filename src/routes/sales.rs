use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
};

use crate::{
    dto::sales::{RecordSaleRequest, SaleCreated, SaleWithItems},
    error::{AppResult, ErrorBody},
    services::sale_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sale", post(record_sale))
        .route("/sales/{id}", get(get_sale))
}

#[utoipa::path(
    post,
    path = "/api/sale",
    request_body = RecordSaleRequest,
    responses(
        (status = 200, description = "Sale recorded", body = SaleCreated),
        (status = 400, description = "Empty or invalid sale data", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    ),
    tag = "Sales"
)]
pub async fn record_sale(
    State(state): State<AppState>,
    payload: Result<Json<RecordSaleRequest>, JsonRejection>,
) -> AppResult<Json<SaleCreated>> {
    let Json(payload) = payload?;
    let created = sale_service::record_sale(&state, payload).await?;
    Ok(Json(created))
}

#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    params(
        ("id" = i64, Path, description = "Sale ID")
    ),
    responses(
        (status = 200, description = "Sale with its line items", body = SaleWithItems),
        (status = 404, description = "Sale not found", body = ErrorBody),
    ),
    tag = "Sales"
)]
pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<SaleWithItems>> {
    let sale = sale_service::get_sale(&state, id).await?;
    Ok(Json(sale))
}
