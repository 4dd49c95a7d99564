//! Canonical conversion quote shape.

use rust_decimal::Decimal;

/// One conversion quote, reduced from the provider payload to the six
/// fields the evaluator needs.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedQuote {
    pub source_symbol: String,
    pub source_id: i64,
    pub source_amount: Decimal,
    pub target_symbol: String,
    pub target_id: i64,
    pub target_amount: Decimal,
}
