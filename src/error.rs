//! Error taxonomy for the notification pass.
//!
//! Only `Configuration` is fatal, and only at startup. Every other variant
//! is contained to the job that raised it so one bad job never takes the
//! pass down.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    #[error("malformed provider response: {reason}")]
    MalformedResponse { reason: String },

    #[error("invalid comparison operator {found:?}, expected >, < or =")]
    InvalidComparisonOperator { found: String },

    #[error("exchange rate request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("email dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("failed to persist job state: {0}")]
    Persistence(#[from] std::io::Error),
}

impl NotifyError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into(),
        }
    }
}

/// Failures on the mail path, from address parsing to the SMTP session.
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("invalid mail address {address:?}: {source}")]
    Address {
        address: String,
        source: lettre::address::AddressError,
    },

    #[error("failed to compose message: {0}")]
    Compose(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
