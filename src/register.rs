//! A cashier's session: catalog, cart, tendered cash and the checkout flow.

use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError, CartLine, CheckoutError, CheckoutOptions},
    client::{ClientError, PosApi},
    config::ClientConfig,
    dto::sales::DailyReport,
    models::Product,
};

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("Product {0} is not in the catalog")]
    UnknownProduct(i64),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Checkout progress, logged on every transition. `complete_sale` always
/// returns to `Idle`; callers read the result from [`CheckoutOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckoutState {
    Idle,
    Validating,
    Rejected,
    Submitting,
    Committed,
    Failed,
}

#[derive(Debug)]
pub enum CheckoutOutcome {
    /// The sale is durable; the cart has been cleared.
    Committed { sale_id: i64, change: Decimal },
    /// Caught before any request was sent; the cart is untouched.
    Rejected(CheckoutError),
    /// The recorder could not be reached or refused the sale; the cart is kept for retry.
    Failed(ClientError),
}

pub struct Register<A> {
    api: A,
    options: CheckoutOptions,
    cart: Cart,
    cash: Decimal,
    customer_name: String,
    catalog: Vec<Product>,
    report: Option<DailyReport>,
    state: CheckoutState,
}

impl<A: PosApi> Register<A> {
    pub fn new(api: A, options: CheckoutOptions) -> Self {
        Self {
            api,
            options,
            cart: Cart::new(),
            cash: Decimal::ZERO,
            customer_name: String::new(),
            catalog: Vec::new(),
            report: None,
            state: CheckoutState::Idle,
        }
    }

    pub fn from_config(api: A, config: &ClientConfig) -> Self {
        Self::new(
            api,
            CheckoutOptions {
                require_customer_name: config.require_customer_name,
            },
        )
    }

    /// Load the catalog, then the daily report.
    pub async fn start(&mut self) -> Result<(), RegisterError> {
        self.reload_catalog().await?;
        self.refresh_report().await?;
        Ok(())
    }

    pub async fn reload_catalog(&mut self) -> Result<(), RegisterError> {
        self.catalog = self.api.list_products().await?;
        Ok(())
    }

    pub async fn refresh_report(&mut self) -> Result<&DailyReport, RegisterError> {
        let report = self.api.daily_report().await?;
        Ok(self.report.insert(report))
    }

    pub fn catalog(&self) -> &[Product] {
        &self.catalog
    }

    pub fn report(&self) -> Option<&DailyReport> {
        self.report.as_ref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    pub fn cash(&self) -> Decimal {
        self.cash
    }

    pub fn add_product(&mut self, product_id: i64) -> Result<(), RegisterError> {
        let product = self
            .catalog
            .iter()
            .find(|p| p.id == product_id)
            .ok_or(RegisterError::UnknownProduct(product_id))?;
        self.cart.add(product);
        Ok(())
    }

    pub fn decrement_line(&mut self, index: usize) -> Result<(), RegisterError> {
        self.cart.decrement(index)?;
        Ok(())
    }

    /// Negative amounts count as no cash tendered.
    pub fn set_cash(&mut self, amount: Decimal) {
        self.cash = amount.max(Decimal::ZERO);
    }

    /// Take the cash field as typed; anything unparsable counts as zero.
    pub fn set_cash_input(&mut self, input: &str) {
        let amount = Decimal::from_str(input.trim()).unwrap_or(Decimal::ZERO);
        self.set_cash(amount);
    }

    pub fn set_customer_name(&mut self, name: impl Into<String>) {
        self.customer_name = name.into();
    }

    pub fn change(&self) -> Decimal {
        self.cart.change_for(self.cash)
    }

    /// Validate the cart and submit it.
    pub async fn complete_sale(&mut self) -> CheckoutOutcome {
        self.transition(CheckoutState::Validating);
        let validated = self.cart.validate_checkout(
            self.cash,
            Some(self.customer_name.as_str()),
            self.options,
        );
        let snapshot = match validated {
            Ok(snapshot) => snapshot,
            Err(reason) => {
                self.transition(CheckoutState::Rejected);
                self.transition(CheckoutState::Idle);
                return CheckoutOutcome::Rejected(reason);
            }
        };

        self.transition(CheckoutState::Submitting);
        let change = self.change();
        let submitted = self.api.record_sale(&snapshot.to_request()).await;
        match submitted {
            Ok(created) => {
                self.transition(CheckoutState::Committed);
                tracing::info!(sale_id = created.sale_id, total = %snapshot.total(), "sale committed");
                self.cart.reset();
                self.cash = Decimal::ZERO;
                self.customer_name.clear();
                self.refresh_after_commit().await;
                self.transition(CheckoutState::Idle);
                CheckoutOutcome::Committed {
                    sale_id: created.sale_id,
                    change,
                }
            }
            Err(err) => {
                self.transition(CheckoutState::Failed);
                tracing::warn!(error = %err, "sale submission failed, cart kept");
                self.transition(CheckoutState::Idle);
                CheckoutOutcome::Failed(err)
            }
        }
    }

    // The sale is already durable; a failed refresh only leaves stale views.
    async fn refresh_after_commit(&mut self) {
        if let Err(err) = self.reload_catalog().await {
            tracing::warn!(error = %err, "catalog reload failed");
        }
        if let Err(err) = self.refresh_report().await {
            tracing::warn!(error = %err, "report refresh failed");
        }
    }

    fn transition(&mut self, next: CheckoutState) {
        tracing::debug!(from = ?self.state, to = ?next, "checkout state");
        self.state = next;
    }
}
