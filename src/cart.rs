//! The in-progress sale held by a register before it is submitted.
//!
//! A [`Cart`] keeps at most one [`CartLine`] per product, in the order the
//! products were first added. Totals are always derived from the lines, never
//! stored, so they cannot drift from what the cashier sees.

use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    dto::sales::{RecordSaleRequest, SaleLineRequest},
    models::Product,
};

/// One product's aggregated quantity, with name and price captured when the
/// product was first added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub price: Decimal,
    pub qty: i32,
}

impl CartLine {
    /// Saturates at `Decimal::MAX` rather than overflowing.
    pub fn subtotal(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.qty))
    }
}

impl fmt::Display for CartLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} = {}", self.name, self.qty, self.subtotal())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("No cart line at index {index} (cart has {len})")]
    LineOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("Cart is empty!")]
    EmptyCart,

    #[error("Not enough cash! Total is {total}, tendered {tendered}")]
    InsufficientCash { total: Decimal, tendered: Decimal },

    #[error("Customer name is required")]
    MissingCustomerName,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckoutOptions {
    pub require_customer_name: bool,
}

/// Frozen copy of a cart that passed checkout validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSnapshot {
    lines: Vec<CartLine>,
    total: Decimal,
    customer_name: Option<String>,
}

impl CheckoutSnapshot {
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    /// The body posted to `/api/sale`.
    pub fn to_request(&self) -> RecordSaleRequest {
        let items = self
            .lines
            .iter()
            .map(|line| SaleLineRequest {
                product_id: Some(line.product_id),
                qty: Some(line.qty),
                price: Some(line.price),
                name: Some(line.name.clone()),
            })
            .collect();
        RecordSaleRequest {
            items: Some(items),
            total: Some(self.total),
            customer_name: self.customer_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.subtotal()))
    }

    /// Add one unit of `product`, merging into its existing line if present.
    pub fn add(&mut self, product: &Product) {
        match self
            .lines
            .iter_mut()
            .find(|line| line.product_id == product.id)
        {
            Some(line) => line.qty = line.qty.saturating_add(1),
            None => self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                qty: 1,
            }),
        }
    }

    /// Remove one unit from the line at `index`, dropping the line once empty.
    pub fn decrement(&mut self, index: usize) -> Result<(), CartError> {
        let len = self.lines.len();
        let line = self
            .lines
            .get_mut(index)
            .ok_or(CartError::LineOutOfRange { index, len })?;
        line.qty -= 1;
        if line.qty <= 0 {
            self.lines.remove(index);
        }
        Ok(())
    }

    /// Change owed for `cash`; never negative.
    pub fn change_for(&self, cash: Decimal) -> Decimal {
        cash.saturating_sub(self.total()).max(Decimal::ZERO)
    }

    pub fn validate_checkout(
        &self,
        cash: Decimal,
        customer_name: Option<&str>,
        options: CheckoutOptions,
    ) -> Result<CheckoutSnapshot, CheckoutError> {
        if self.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let total = self.total();
        if cash < total {
            return Err(CheckoutError::InsufficientCash {
                total,
                tendered: cash,
            });
        }
        let customer_name = customer_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_owned);
        if options.require_customer_name && customer_name.is_none() {
            return Err(CheckoutError::MissingCustomerName);
        }
        Ok(CheckoutSnapshot {
            lines: self.lines.clone(),
            total,
            customer_name,
        })
    }

    pub fn reset(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn product(id: i64, name: &str, price: Decimal) -> Product {
        Product {
            id,
            name: name.to_string(),
            price,
        }
    }

    fn coffee() -> Product {
        product(1, "Coffee", dec!(50))
    }

    fn sandwich() -> Product {
        product(3, "Sandwich", dec!(100))
    }

    #[test]
    fn repeated_add_merges_into_one_line() {
        let mut cart = Cart::new();
        cart.add(&coffee());
        cart.add(&sandwich());
        cart.add(&coffee());

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.lines()[0].qty, 2);
        assert_eq!(cart.lines()[1].qty, 1);
        assert_eq!(cart.total(), dec!(200));
    }

    #[test]
    fn line_keeps_price_snapshot() {
        let mut cart = Cart::new();
        cart.add(&coffee());
        cart.add(&product(1, "Coffee", dec!(75)));

        assert_eq!(cart.lines()[0].price, dec!(50));
        assert_eq!(cart.total(), dec!(100));
    }

    #[test]
    fn decrement_removes_line_at_zero() {
        let mut cart = Cart::new();
        cart.add(&coffee());
        cart.add(&coffee());
        cart.add(&sandwich());

        cart.decrement(0).unwrap();
        assert_eq!(cart.lines()[0].qty, 1);
        assert_eq!(cart.len(), 2);

        cart.decrement(0).unwrap();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.lines()[0].product_id, 3);
    }

    #[test]
    fn decrement_out_of_range_leaves_cart_alone() {
        let mut cart = Cart::new();
        cart.add(&coffee());
        let before = cart.clone();

        assert_eq!(
            cart.decrement(4),
            Err(CartError::LineOutOfRange { index: 4, len: 1 })
        );
        assert_eq!(cart, before);
    }

    #[test]
    fn change_is_clamped_at_zero() {
        let mut cart = Cart::new();
        cart.add(&sandwich());

        assert_eq!(cart.change_for(dec!(150)), dec!(50));
        assert_eq!(cart.change_for(dec!(100)), dec!(0));
        assert_eq!(cart.change_for(dec!(20)), dec!(0));
    }

    #[test]
    fn empty_cart_is_rejected_first() {
        let cart = Cart::new();
        let options = CheckoutOptions {
            require_customer_name: true,
        };
        assert_eq!(
            cart.validate_checkout(dec!(0), None, options),
            Err(CheckoutError::EmptyCart)
        );
    }

    #[test]
    fn insufficient_cash_is_rejected() {
        let mut cart = Cart::new();
        cart.add(&sandwich());
        assert_eq!(
            cart.validate_checkout(dec!(99.99), None, CheckoutOptions::default()),
            Err(CheckoutError::InsufficientCash {
                total: dec!(100),
                tendered: dec!(99.99)
            })
        );
    }

    #[test]
    fn customer_name_only_required_when_configured() {
        let mut cart = Cart::new();
        cart.add(&coffee());
        let strict = CheckoutOptions {
            require_customer_name: true,
        };

        assert_eq!(
            cart.validate_checkout(dec!(50), Some("  "), strict),
            Err(CheckoutError::MissingCustomerName)
        );
        assert!(
            cart.validate_checkout(dec!(50), None, CheckoutOptions::default())
                .is_ok()
        );

        let snapshot = cart.validate_checkout(dec!(50), Some("Ana"), strict).unwrap();
        assert_eq!(snapshot.customer_name(), Some("Ana"));
    }

    #[test]
    fn snapshot_becomes_sale_request() {
        let mut cart = Cart::new();
        cart.add(&coffee());
        cart.add(&coffee());
        cart.add(&sandwich());

        let snapshot = cart
            .validate_checkout(dec!(500), None, CheckoutOptions::default())
            .unwrap();
        let request = snapshot.to_request();

        assert_eq!(request.total, Some(dec!(200)));
        let items = request.items.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_id, Some(1));
        assert_eq!(items[0].qty, Some(2));
        assert_eq!(items[1].price, Some(dec!(100)));
    }

    #[test]
    fn reset_empties_cart() {
        let mut cart = Cart::new();
        cart.add(&coffee());
        cart.reset();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn huge_prices_saturate_instead_of_overflowing() {
        let mut cart = Cart::new();
        cart.add(&product(1, "Gold", Decimal::MAX));
        cart.add(&product(1, "Gold", Decimal::MAX));
        cart.add(&product(2, "Silver", Decimal::MAX));

        assert_eq!(cart.lines()[0].subtotal(), Decimal::MAX);
        assert_eq!(cart.total(), Decimal::MAX);
        assert_eq!(cart.change_for(dec!(10)), Decimal::ZERO);
        assert!(matches!(
            cart.validate_checkout(dec!(10), None, CheckoutOptions::default()),
            Err(CheckoutError::InsufficientCash { .. })
        ));
    }

    #[test]
    fn line_renders_for_display() {
        let mut cart = Cart::new();
        cart.add(&coffee());
        cart.add(&coffee());
        assert_eq!(cart.lines()[0].to_string(), "Coffee x 2 = 100");
    }
}
