//! Value objects for order line items.

use serde::{Deserialize, Serialize};

use crate::error::PayloadError;

/// Product identifier (SKU / catalogue code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Creates a new product ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the product ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ProductId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A catalogue product with its unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Catalogue code.
    pub code: ProductId,

    /// Price per unit, in the currency's major unit.
    pub unit_value: f64,
}

impl Product {
    /// Creates a new product.
    pub fn new(code: impl Into<ProductId>, unit_value: f64) -> Self {
        Self {
            code: code.into(),
            unit_value,
        }
    }
}

/// A line item of an order: a product and how many of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderProduct {
    pub product: Product,
    pub quantity: u32,
}

impl OrderProduct {
    /// Creates a new line item.
    pub fn new(product: Product, quantity: u32) -> Self {
        Self { product, quantity }
    }

    /// Returns `unit_value * quantity`.
    pub fn total_value(&self) -> f64 {
        self.product.unit_value * f64::from(self.quantity)
    }

    /// Checks the line item on its own, independent of the order totals.
    pub fn validate(&self) -> Result<(), PayloadError> {
        if self.product.code.as_str().trim().is_empty() {
            return Err(PayloadError::MissingField("product.code"));
        }
        if self.quantity == 0 {
            return Err(PayloadError::InvalidQuantity {
                code: self.product.code.to_string(),
                quantity: self.quantity,
            });
        }
        let value = self.product.unit_value;
        if !value.is_finite() || value < 0.0 {
            return Err(PayloadError::InvalidUnitValue {
                code: self.product.code.to_string(),
                value,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_string_conversion() {
        let id = ProductId::new("COMIC_BOOKS");
        assert_eq!(id.as_str(), "COMIC_BOOKS");

        let id2: ProductId = "BOOKS".into();
        assert_eq!(id2.as_str(), "BOOKS");
    }

    #[test]
    fn test_order_product_total_value() {
        let item = OrderProduct::new(Product::new("BOOKS", 12.5), 3);
        assert_eq!(item.total_value(), 37.5);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let item = OrderProduct::new(Product::new("BOOKS", 12.5), 0);
        assert!(matches!(
            item.validate(),
            Err(PayloadError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    #[test]
    fn test_negative_and_nan_unit_value_rejected() {
        let negative = OrderProduct::new(Product::new("BOOKS", -1.0), 1);
        assert!(matches!(
            negative.validate(),
            Err(PayloadError::InvalidUnitValue { .. })
        ));

        let nan = OrderProduct::new(Product::new("BOOKS", f64::NAN), 1);
        assert!(matches!(
            nan.validate(),
            Err(PayloadError::InvalidUnitValue { .. })
        ));
    }

    #[test]
    fn test_blank_code_rejected() {
        let item = OrderProduct::new(Product::new("  ", 1.0), 1);
        assert_eq!(
            item.validate(),
            Err(PayloadError::MissingField("product.code"))
        );
    }

    #[test]
    fn test_wire_field_names() {
        let item = OrderProduct::new(Product::new("MOVIES", 9.99), 2);
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["product"]["code"], "MOVIES");
        assert_eq!(json["product"]["unitValue"], 9.99);
        assert_eq!(json["quantity"], 2);
    }
}
