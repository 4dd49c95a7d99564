//! Unit tests for provider payload normalization

use cryptonotify::error::NotifyError;
use cryptonotify::services::coinmarketcap::normalize;

fn conversion_payload() -> &'static str {
    r#"{
        "data": {
            "symbol": "BTC",
            "id": "1",
            "amount": 1,
            "quote": [
                {"cryptoId": 2781, "symbol": "USD", "price": 51234.5}
            ]
        }
    }"#
}

#[test]
fn flattens_the_conversion_payload() {
    let quote = normalize(conversion_payload()).unwrap();
    assert_eq!(quote.source_symbol, "BTC");
    assert_eq!(quote.source_id, 1);
    assert_eq!(quote.source_amount.to_string(), "1");
    assert_eq!(quote.target_symbol, "USD");
    assert_eq!(quote.target_id, 2781);
    assert_eq!(quote.target_amount.to_string(), "51234.5");
}

#[test]
fn only_the_first_quote_leg_is_used() {
    let raw = r#"{
        "data": {
            "symbol": "BTC",
            "id": "1",
            "amount": 1,
            "quote": [
                {"cryptoId": 2781, "symbol": "USD", "price": 51234.5},
                {"cryptoId": 2790, "symbol": "EUR", "price": 47000.1}
            ]
        }
    }"#;
    let quote = normalize(raw).unwrap();
    assert_eq!(quote.target_symbol, "USD");
}

#[test]
fn empty_quote_list_is_malformed() {
    let raw = r#"{"data": {"symbol": "BTC", "id": "1", "amount": 1, "quote": []}}"#;
    match normalize(raw).unwrap_err() {
        NotifyError::MalformedResponse { reason } => {
            assert!(reason.contains("quote leg"), "reason: {}", reason)
        }
        other => panic!("expected a malformed response, got {:?}", other),
    }
}

#[test]
fn absent_quote_field_is_malformed() {
    let raw = r#"{"data": {"symbol": "BTC", "id": "1", "amount": 1}}"#;
    assert!(matches!(
        normalize(raw).unwrap_err(),
        NotifyError::MalformedResponse { .. }
    ));
}

#[test]
fn non_numeric_source_id_is_malformed() {
    let raw = r#"{
        "data": {
            "symbol": "BTC",
            "id": "bitcoin",
            "amount": 1,
            "quote": [{"cryptoId": 2781, "symbol": "USD", "price": 51234.5}]
        }
    }"#;
    match normalize(raw).unwrap_err() {
        NotifyError::MalformedResponse { reason } => {
            assert!(reason.contains("bitcoin"), "reason: {}", reason)
        }
        other => panic!("expected a malformed response, got {:?}", other),
    }
}

#[test]
fn truncated_body_is_malformed() {
    assert!(matches!(
        normalize("{\"data\": {").unwrap_err(),
        NotifyError::MalformedResponse { .. }
    ));
    assert!(matches!(
        normalize("").unwrap_err(),
        NotifyError::MalformedResponse { .. }
    ));
}

#[test]
fn error_page_instead_of_json_is_malformed() {
    assert!(matches!(
        normalize("<html>rate limited</html>").unwrap_err(),
        NotifyError::MalformedResponse { .. }
    ));
}
