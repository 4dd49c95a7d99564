//! CoinMarketCap-style provider: HTTP client and payload normalization.
//!
//! The conversion payload nests the quote under `data` and is inconsistent
//! about id types: the source id arrives as a string while the quote leg
//! carries a numeric `cryptoId`. Normalization flattens all of that into a
//! [`NormalizedQuote`] and turns every shape problem into a
//! `MalformedResponse` for the calling job.

use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;

use crate::config::EndpointPolicy;
use crate::error::NotifyError;
use crate::models::NormalizedQuote;
use crate::services::market_data::{QuoteRequest, RateSource};

#[derive(Debug, Deserialize)]
struct ConversionEnvelope {
    data: ConversionData,
}

#[derive(Debug, Deserialize)]
struct ConversionData {
    symbol: String,
    id: String,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    amount: Decimal,
    #[serde(default)]
    quote: Vec<QuoteLeg>,
}

#[derive(Debug, Deserialize)]
struct QuoteLeg {
    symbol: String,
    #[serde(rename = "cryptoId")]
    crypto_id: i64,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    price: Decimal,
}

/// Decode a raw conversion payload into the canonical quote shape.
pub fn normalize(raw: &str) -> Result<NormalizedQuote, NotifyError> {
    let envelope: ConversionEnvelope = serde_json::from_str(raw)
        .map_err(|e| NotifyError::malformed(format!("conversion payload: {}", e)))?;
    let data = envelope.data;

    let source_id: i64 = data
        .id
        .parse()
        .map_err(|_| NotifyError::malformed(format!("source id {:?} is not numeric", data.id)))?;

    let leg = data
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| NotifyError::malformed("conversion payload has no quote leg"))?;

    Ok(NormalizedQuote {
        source_symbol: data.symbol,
        source_id,
        source_amount: data.amount,
        target_symbol: leg.symbol,
        target_id: leg.crypto_id,
        target_amount: leg.price,
    })
}

/// HTTP-backed rate source for the configured endpoints.
pub struct CmcRateSource {
    client: reqwest::Client,
    exchange_endpoint: String,
    data_endpoint: String,
}

impl CmcRateSource {
    pub fn new(endpoint: &EndpointPolicy) -> Self {
        Self {
            client: reqwest::Client::new(),
            exchange_endpoint: endpoint.exchange_endpoint.clone(),
            data_endpoint: endpoint.data_endpoint.clone(),
        }
    }
}

#[async_trait]
impl RateSource for CmcRateSource {
    async fn exchange_quote(&self, request: &QuoteRequest) -> Result<String, NotifyError> {
        // The endpoint expects the amount with four fixed decimals.
        let amount = request
            .amount
            .round_dp_with_strategy(4, RoundingStrategy::MidpointNearestEven);
        let amount = format!("{:.4}", amount);
        let source_id = request.source_id.to_string();
        let target_id = request.target_id.to_string();

        let response = self
            .client
            .get(&self.exchange_endpoint)
            .query(&[
                ("amount", amount.as_str()),
                ("id", source_id.as_str()),
                ("convert_id", target_id.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }

    async fn symbol_snapshot(&self) -> Result<String, NotifyError> {
        let response = self
            .client
            .get(&self.data_endpoint)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.text().await?)
    }
}
