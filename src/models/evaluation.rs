//! Threshold evaluation primitives.

use std::fmt;
use std::str::FromStr;

use crate::error::NotifyError;

/// Comparison operator configured on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Greater,
    Less,
    Equal,
}

impl FromStr for Comparison {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ">" => Ok(Self::Greater),
            "<" => Ok(Self::Less),
            "=" => Ok(Self::Equal),
            other => Err(NotifyError::InvalidComparisonOperator {
                found: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Greater => ">",
            Self::Less => "<",
            Self::Equal => "=",
        };
        f.write_str(symbol)
    }
}

/// Result of evaluating one job against a quote.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationOutcome {
    /// The quote describes a different pair than the job monitors.
    NotApplicable,
    /// Pair matched but the configured target has not been reached.
    NotTriggered { detail: String },
    /// Target reached; subject and body are ready to send.
    Triggered { subject: String, message: String },
}
