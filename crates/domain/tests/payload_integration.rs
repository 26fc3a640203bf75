//! Integration tests for payloads as participants exchange them.

use domain::{Document, Order, OrderProduct, Payload, PayloadError, Product};

const ORDER_JSON: &str = r#"{
    "type": "Order",
    "data": {
        "id": "ord-17",
        "transactionId": "tx-17",
        "createdAt": "2024-03-01T12:00:00Z",
        "totalAmount": 40.99,
        "totalItems": 3,
        "products": [
            { "product": { "code": "COMIC_BOOKS", "unitValue": 15.5 }, "quantity": 2 },
            { "product": { "code": "BOOKS", "unitValue": 9.99 }, "quantity": 1 }
        ]
    }
}"#;

#[test]
fn test_order_from_participant_validates() {
    let payload: Payload = serde_json::from_str(ORDER_JSON).unwrap();
    payload.validate().unwrap();

    let order = payload.as_order().unwrap();
    assert_eq!(order.id.as_deref(), Some("ord-17"));
    assert_eq!(order.transaction_id.as_str(), "tx-17");
    assert_eq!(order.total_items, 3);
    assert!(order.has_items());
}

#[test]
fn test_tampered_totals_are_rejected() {
    let tampered = ORDER_JSON.replace("\"totalAmount\": 40.99", "\"totalAmount\": 50.0");
    let payload: Payload = serde_json::from_str(&tampered).unwrap();

    assert!(matches!(
        payload.validate(),
        Err(PayloadError::InconsistentTotals { declared_items: 3, .. })
    ));
}

#[test]
fn test_participant_edits_order_and_recomputes() {
    let payload: Payload = serde_json::from_str(ORDER_JSON).unwrap();
    let mut order: Order = payload.as_order().unwrap().clone();

    order.add_product(OrderProduct::new(Product::new("MOVIES", 4.5), 2));
    order.validate().unwrap();
    assert_eq!(order.total_items, 5);
    assert!((order.total_amount - 49.99).abs() < 1e-9);

    order.products.clear();
    assert!(order.validate().is_err());
    order.recompute_totals();
    order.validate().unwrap();
    assert!(!order.has_items());
}

#[test]
fn test_document_revision_survives_the_wire() {
    let first = Document::new(3, 11, "handbook.md", "draft");
    let second = first.revise("final").unwrap();

    assert_eq!(second.version, Some(2));
    assert_eq!(second.document_id, first.document_id);

    let payload: Payload = second.into();
    let json = serde_json::to_string(&payload).unwrap();
    let back: Payload = serde_json::from_str(&json).unwrap();
    assert_eq!(back.as_document().unwrap().text.as_deref(), Some("final"));
}

#[test]
fn test_document_version_cannot_overflow() {
    let mut document = Document::new(1, 99, "log.txt", "");
    document.version = Some(u32::MAX);

    assert_eq!(
        document.revise("more"),
        Err(PayloadError::VersionOverflow {
            document_id: Some(99)
        })
    );
}

#[test]
fn test_unknown_payload_type_is_rejected() {
    let result = serde_json::from_str::<Payload>(r#"{"type":"Invoice","data":{}}"#);
    assert!(result.is_err());
}

#[test]
fn test_document_with_null_fields_from_participant() {
    let json = r#"{"type":"Document","data":{"projectId":null,"documentId":5,"name":null}}"#;
    let payload: Payload = serde_json::from_str(json).unwrap();
    payload.validate().unwrap();

    let document = payload.as_document().unwrap();
    assert_eq!(document.document_id, Some(5));
    assert!(document.project_id.is_none());
    assert!(document.name.is_none());
    assert!(document.version.is_none());
}
