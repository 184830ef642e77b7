use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use crate::{
    dto::sales::DailyReport,
    error::{AppError, AppResult},
    state::AppState,
};

/// Money is reported to the cent; SQLite sums `REAL` columns as doubles.
pub(crate) const MONEY_SCALE: u32 = 2;

/// The calendar day sales are booked on, from the server's local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub async fn daily_report(state: &AppState, date: NaiveDate) -> AppResult<DailyReport> {
    let (total_sales, income): (i64, Option<f64>) =
        sqlx::query_as("SELECT COUNT(id), SUM(total) FROM sales WHERE sale_date = ?")
            .bind(date)
            .fetch_one(&state.pool)
            .await?;

    let total_income = match income {
        Some(value) => Decimal::try_from(value)
            .map_err(|err| AppError::Internal(anyhow::anyhow!("income out of range: {err}")))?
            .round_dp(MONEY_SCALE),
        None => Decimal::ZERO,
    };

    Ok(DailyReport {
        total_sales,
        total_income,
    })
}
