//! Job processing: evaluation, state ledger and the polling pass.

pub mod context;
pub mod evaluator;
pub mod ledger;
pub mod runner;

pub use context::JobContext;
pub use ledger::JobLedger;
pub use runner::PassRunner;
