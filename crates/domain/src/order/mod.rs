//! The order aggregate carried through the checkout saga.

pub mod value_objects;

pub use value_objects::{OrderProduct, Product, ProductId};

use chrono::{DateTime, Utc};
use common::TransactionId;
use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

/// Largest drift tolerated between the declared and recomputed amount.
///
/// Amounts travel as binary floats on the wire, so exact equality cannot be
/// demanded of payloads produced by other services.
pub const AMOUNT_TOLERANCE: f64 = 0.005;

/// An order and its line items.
///
/// `total_amount` and `total_items` are projections of `products`; build
/// orders through [`Order::new`] or call [`Order::recompute_totals`] after
/// editing the line items so they stay consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Assigned by the order service once persisted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub transaction_id: TransactionId,
    pub created_at: DateTime<Utc>,
    pub total_amount: f64,
    pub total_items: u32,
    #[serde(default)]
    pub products: Vec<OrderProduct>,
}

impl Order {
    /// Creates an order with totals computed from the line items.
    pub fn new(
        transaction_id: TransactionId,
        created_at: DateTime<Utc>,
        products: Vec<OrderProduct>,
    ) -> Self {
        let mut order = Self {
            id: None,
            transaction_id,
            created_at,
            total_amount: 0.0,
            total_items: 0,
            products,
        };
        order.recompute_totals();
        order
    }

    /// Sets the persisted order ID.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Appends a line item and refreshes the totals.
    pub fn add_product(&mut self, item: OrderProduct) {
        self.products.push(item);
        self.recompute_totals();
    }

    /// Recomputes `total_amount` and `total_items` from the line items.
    pub fn recompute_totals(&mut self) {
        self.total_amount = self.computed_amount();
        self.total_items = self.computed_items();
    }

    /// Returns true if the order has at least one line item.
    pub fn has_items(&self) -> bool {
        !self.products.is_empty()
    }

    fn computed_amount(&self) -> f64 {
        self.products.iter().map(OrderProduct::total_value).sum()
    }

    fn computed_items(&self) -> u32 {
        self.products
            .iter()
            .fold(0u32, |acc, p| acc.saturating_add(p.quantity))
    }

    /// Checks the transaction ID, every line item, and the denormalized totals.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.transaction_id.is_blank() {
            return Err(PayloadError::MissingField("transactionId"));
        }
        for item in &self.products {
            item.validate()?;
        }

        let actual_amount = self.computed_amount();
        let actual_items = self.computed_items();
        let amount_drift = (self.total_amount - actual_amount).abs();
        if actual_items != self.total_items
            || !self.total_amount.is_finite()
            || amount_drift > AMOUNT_TOLERANCE
        {
            return Err(PayloadError::InconsistentTotals {
                declared_items: self.total_items,
                declared_amount: self.total_amount,
                actual_items,
                actual_amount,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_products() -> Vec<OrderProduct> {
        vec![
            OrderProduct::new(Product::new("COMIC_BOOKS", 15.5), 2),
            OrderProduct::new(Product::new("BOOKS", 9.9), 1),
        ]
    }

    #[test]
    fn test_new_computes_totals() {
        let order = Order::new(TransactionId::new("tx-1"), Utc::now(), sample_products());
        assert_eq!(order.total_items, 3);
        assert!((order.total_amount - 40.9).abs() < 1e-9);
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_empty_order_is_consistent() {
        let order = Order::new(TransactionId::new("tx-1"), Utc::now(), Vec::new());
        assert_eq!(order.total_items, 0);
        assert_eq!(order.total_amount, 0.0);
        assert!(!order.has_items());
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_add_product_refreshes_totals() {
        let mut order = Order::new(TransactionId::new("tx-1"), Utc::now(), Vec::new());
        order.add_product(OrderProduct::new(Product::new("MOVIES", 20.0), 4));
        assert_eq!(order.total_items, 4);
        assert_eq!(order.total_amount, 80.0);
    }

    #[test]
    fn test_inconsistent_totals_rejected() {
        let mut order = Order::new(TransactionId::new("tx-1"), Utc::now(), sample_products());
        order.total_items = 7;
        assert!(matches!(
            order.validate(),
            Err(PayloadError::InconsistentTotals {
                declared_items: 7,
                actual_items: 3,
                ..
            })
        ));

        let mut order = Order::new(TransactionId::new("tx-1"), Utc::now(), sample_products());
        order.total_amount += 1.0;
        assert!(matches!(
            order.validate(),
            Err(PayloadError::InconsistentTotals { .. })
        ));
    }

    #[test]
    fn test_small_float_drift_tolerated() {
        let mut order = Order::new(TransactionId::new("tx-1"), Utc::now(), sample_products());
        order.total_amount += 0.001;
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_blank_transaction_id_rejected() {
        let order = Order::new(TransactionId::new(""), Utc::now(), sample_products());
        assert_eq!(
            order.validate(),
            Err(PayloadError::MissingField("transactionId"))
        );
    }

    #[test]
    fn test_absent_id_is_omitted_on_the_wire() {
        let order = Order::new(TransactionId::new("tx-1"), Utc::now(), sample_products());
        let json = serde_json::to_value(&order).unwrap();
        assert!(json.get("id").is_none());
        assert_eq!(json["transactionId"], "tx-1");
        assert_eq!(json["totalItems"], 3);

        let with_id = order.with_id("");
        let json = serde_json::to_value(&with_id).unwrap();
        assert_eq!(json["id"], "");
        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, Some(String::new()));
    }

    #[test]
    fn test_line_item_order_preserved() {
        let order = Order::new(TransactionId::new("tx-1"), Utc::now(), sample_products());
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        let codes: Vec<&str> = back.products.iter().map(|p| p.product.code.as_str()).collect();
        assert_eq!(codes, vec!["COMIC_BOOKS", "BOOKS"]);
        assert_eq!(order, back);
    }
}
