//! The business payload slot of a saga envelope.

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::PayloadError;
use crate::order::Order;

/// Business aggregate threaded through a saga by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    Order(Order),
    Document(Document),
}

impl Payload {
    /// Returns the payload kind name.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Order(_) => "Order",
            Payload::Document(_) => "Document",
        }
    }

    /// Validates the wrapped aggregate's invariants.
    pub fn validate(&self) -> Result<(), PayloadError> {
        match self {
            Payload::Order(order) => order.validate(),
            Payload::Document(document) => document.validate(),
        }
    }

    pub fn as_order(&self) -> Option<&Order> {
        match self {
            Payload::Order(order) => Some(order),
            Payload::Document(_) => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Payload::Document(document) => Some(document),
            Payload::Order(_) => None,
        }
    }
}

impl From<Order> for Payload {
    fn from(order: Order) -> Self {
        Payload::Order(order)
    }
}

impl From<Document> for Payload {
    fn from(document: Document) -> Self {
        Payload::Document(document)
    }
}
