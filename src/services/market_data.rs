//! Rate source interface for the exchange data provider.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::error::NotifyError;

/// Query parameters for one conversion request.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub source_id: i64,
    pub target_id: i64,
    /// Amount of the source coin being converted.
    pub amount: Decimal,
}

/// A provider of conversion quotes and symbol listings.
///
/// Implementations return raw response bodies. Decoding stays with the
/// caller so a malformed payload is reported against the job that asked
/// for it, and the listing snapshot can be persisted verbatim.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the conversion payload for one request.
    async fn exchange_quote(&self, request: &QuoteRequest) -> Result<String, NotifyError>;

    /// Fetch the full symbol listing snapshot.
    async fn symbol_snapshot(&self) -> Result<String, NotifyError>;
}
