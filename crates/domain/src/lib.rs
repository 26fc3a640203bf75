//! Business payloads carried inside saga envelopes.
//!
//! The orchestrator never interprets these beyond validation; they travel
//! by value from hop to hop and each participant may return an updated copy.
//! - `Order` aggregate with its line items
//! - `Document` aggregate for the document pipeline
//! - `Payload` sum type selecting one of them on the wire

pub mod document;
pub mod error;
pub mod order;
pub mod payload;

pub use document::Document;
pub use error::{PayloadError, Result};
pub use order::{Order, OrderProduct, Product, ProductId};
pub use payload::Payload;
