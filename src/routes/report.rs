use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    routing::get,
};

use crate::{
    dto::sales::{DailyReport, ReportQuery},
    error::{AppResult, ErrorBody},
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/report", get(daily_report))
}

#[utoipa::path(
    get,
    path = "/api/report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Sale count and income for one day", body = DailyReport),
        (status = 400, description = "Malformed date", body = ErrorBody),
    ),
    tag = "Reports"
)]
pub async fn daily_report(
    State(state): State<AppState>,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> AppResult<Json<DailyReport>> {
    let Query(query) = query?;
    let date = query.date.unwrap_or_else(report_service::today);
    let report = report_service::daily_report(&state, date).await?;
    Ok(Json(report))
}
