//! Shared data models spanning the notification pipeline.

pub mod evaluation;
pub mod outcome;
pub mod quote;

pub use evaluation::{Comparison, EvaluationOutcome};
pub use outcome::{JobOutcome, PassSummary};
pub use quote::NormalizedQuote;
