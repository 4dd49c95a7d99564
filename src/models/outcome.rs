//! Terminal per-job states for one polling pass.

/// How a single job ended. The pass never aborts on a failed job, so every
/// job reaches exactly one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// Notification ceiling reached before the pass, provider untouched.
    SkippedExhausted,
    /// A coin symbol did not resolve in the catalog, provider untouched.
    SkippedUnresolved { symbol: String },
    FetchFailed,
    MalformedResponse,
    InvalidOperator { found: String },
    /// Quote was for a different pair than the job monitors.
    NotApplicable,
    NotTriggered,
    DispatchFailed,
    /// Target reached and the success was recorded. `delivered` is false
    /// when dispatch is disabled and the alert was counted without mail.
    Notified { delivered: bool },
}

/// Aggregate view of one pass, in job order.
#[derive(Debug, Default, Clone)]
pub struct PassSummary {
    pub outcomes: Vec<JobOutcome>,
}

impl PassSummary {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn notified(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, JobOutcome::Notified { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    JobOutcome::SkippedExhausted | JobOutcome::SkippedUnresolved { .. }
                )
            })
            .count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o,
                    JobOutcome::FetchFailed
                        | JobOutcome::MalformedResponse
                        | JobOutcome::InvalidOperator { .. }
                        | JobOutcome::DispatchFailed
                )
            })
            .count()
    }
}
