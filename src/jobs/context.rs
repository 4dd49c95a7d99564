//! Job context for dependency injection

use std::sync::Arc;

use crate::services::mailer::Dispatcher;
use crate::services::market_data::RateSource;

/// Collaborators handed to the pass runner.
///
/// Bundles the outward-facing dependencies so the pass itself never
/// reaches for process state:
/// - Rate source (conversion quotes and listing snapshots)
/// - Dispatcher (alert mail, possibly disabled)
pub struct JobContext {
    pub source: Arc<dyn RateSource>,
    pub dispatcher: Dispatcher,
}

impl JobContext {
    pub fn new(source: Arc<dyn RateSource>, dispatcher: Dispatcher) -> Self {
        Self { source, dispatcher }
    }
}
