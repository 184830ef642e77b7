use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};

use crate::{
    config::SaleConfig,
    dto::sales::{RecordSaleRequest, SaleCreated, SaleLineRequest, SaleWithItems},
    entity::{
        products::{Column as ProdCol, Entity as Products},
        sale_items::{
            ActiveModel as SaleItemActive, Column as SaleItemCol, Entity as SaleItems,
            Model as SaleItemModel,
        },
        sales::{ActiveModel as SaleActive, Entity as Sales, Model as SaleModel},
    },
    error::{AppError, AppResult},
    models::{Sale, SaleItem},
    services::report_service::{MONEY_SCALE, today},
    state::AppState,
};

/// A checkout that passed structural validation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidatedSale {
    pub lines: Vec<ValidLine>,
    pub total: Decimal,
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ValidLine {
    pub product_id: i64,
    pub qty: i32,
    pub price: Decimal,
}

impl ValidLine {
    fn subtotal(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.qty))
    }
}

impl TryFrom<&SaleLineRequest> for ValidLine {
    type Error = &'static str;

    fn try_from(line: &SaleLineRequest) -> Result<Self, Self::Error> {
        let product_id = line.product_id.ok_or("missing product_id")?;
        let qty = line.qty.ok_or("missing qty")?;
        let price = line.price.ok_or("missing price")?;
        if qty <= 0 {
            return Err("qty must be positive");
        }
        if price < Decimal::ZERO {
            return Err("price must not be negative");
        }
        let line = Self {
            product_id,
            qty,
            price,
        };
        line.subtotal().ok_or("amount out of range")?;
        Ok(line)
    }
}

pub(crate) fn validate_sale(
    payload: &RecordSaleRequest,
    config: SaleConfig,
) -> AppResult<ValidatedSale> {
    let items = payload
        .items
        .as_deref()
        .filter(|items| !items.is_empty())
        .ok_or_else(|| AppError::validation("Invalid sale data: no items"))?;
    let submitted_total = payload
        .total
        .ok_or_else(|| AppError::validation("Invalid sale data: missing total"))?;

    let mut lines = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match ValidLine::try_from(item) {
            Ok(line) => lines.push(line),
            Err(reason) if config.skip_invalid_lines => {
                tracing::warn!(index, reason, "skipping invalid sale line");
            }
            Err(reason) => {
                return Err(AppError::validation(format!(
                    "Invalid sale line {index}: {reason}"
                )));
            }
        }
    }
    if lines.is_empty() {
        return Err(AppError::validation("Invalid sale data: no valid items"));
    }

    let total = lines
        .iter()
        .try_fold(Decimal::ZERO, |acc, line| acc.checked_add(line.subtotal()?))
        .ok_or_else(|| AppError::validation("Invalid sale data: total out of range"))?;
    // Clients sum prices as doubles, so totals are compared to the cent.
    if total.round_dp(MONEY_SCALE) != submitted_total.round_dp(MONEY_SCALE) {
        return Err(AppError::validation(format!(
            "Total {submitted_total} does not match line items ({total})"
        )));
    }

    let customer_name = payload
        .customer_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned);

    Ok(ValidatedSale {
        lines,
        total,
        customer_name,
    })
}

/// Record a checkout dated to the server's current day.
pub async fn record_sale(state: &AppState, payload: RecordSaleRequest) -> AppResult<SaleCreated> {
    record_sale_on(state, payload, today()).await
}

/// Persist the sale header and all of its lines in one transaction.
pub async fn record_sale_on(
    state: &AppState,
    payload: RecordSaleRequest,
    sale_date: NaiveDate,
) -> AppResult<SaleCreated> {
    let sale = validate_sale(&payload, state.sale)?;

    let txn = state.orm.begin().await?;

    // The header insert goes first so SQLite takes the write lock before any read.
    let header = SaleActive {
        id: NotSet,
        total: Set(sale.total),
        sale_date: Set(sale_date),
        customer_name: Set(sale.customer_name.clone()),
    }
    .insert(&txn)
    .await?;

    let wanted: BTreeSet<i64> = sale.lines.iter().map(|line| line.product_id).collect();
    let known: BTreeSet<i64> = Products::find()
        .select_only()
        .column(ProdCol::Id)
        .filter(ProdCol::Id.is_in(wanted.iter().copied()))
        .into_tuple::<i64>()
        .all(&txn)
        .await?
        .into_iter()
        .collect();
    if let Some(missing) = wanted.difference(&known).next() {
        txn.rollback().await?;
        return Err(AppError::validation(format!("Unknown product {missing}")));
    }

    for line in &sale.lines {
        SaleItemActive {
            id: NotSet,
            sale_id: Set(header.id),
            product_id: Set(line.product_id),
            qty: Set(line.qty),
            price: Set(line.price),
        }
        .insert(&txn)
        .await?;
    }

    txn.commit().await?;

    tracing::info!(
        sale_id = header.id,
        total = %header.total,
        items = sale.lines.len(),
        "sale recorded"
    );

    Ok(SaleCreated {
        message: "Sale recorded".to_string(),
        sale_id: header.id,
    })
}

pub async fn get_sale(state: &AppState, id: i64) -> AppResult<SaleWithItems> {
    let sale = match Sales::find_by_id(id).one(&state.orm).await? {
        Some(s) => s,
        None => return Err(AppError::NotFound),
    };

    let items = SaleItems::find()
        .filter(SaleItemCol::SaleId.eq(sale.id))
        .order_by_asc(SaleItemCol::Id)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(sale_item_from_entity)
        .collect();

    Ok(SaleWithItems {
        sale: sale_from_entity(sale),
        items,
    })
}

fn sale_from_entity(model: SaleModel) -> Sale {
    Sale {
        id: model.id,
        total: model.total,
        sale_date: model.sale_date,
        customer_name: model.customer_name,
    }
}

fn sale_item_from_entity(model: SaleItemModel) -> SaleItem {
    SaleItem {
        id: model.id,
        sale_id: model.sale_id,
        product_id: model.product_id,
        qty: model.qty,
        price: model.price,
    }
}
