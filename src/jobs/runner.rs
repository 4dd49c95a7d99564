//! Sequential polling pass over the configured jobs.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::catalog::{SymbolCatalog, UNRESOLVED_ID};
use crate::config::JobSpec;
use crate::jobs::context::JobContext;
use crate::jobs::evaluator;
use crate::jobs::ledger::JobLedger;
use crate::models::{EvaluationOutcome, JobOutcome, PassSummary};
use crate::services::coinmarketcap;
use crate::services::mailer::DispatchOutcome;
use crate::services::market_data::QuoteRequest;

/// Runs one strictly sequential pass over the job list.
///
/// Jobs are processed in configuration order, one at a time. A failing job
/// is logged, recorded in the summary and left behind; the pass always
/// reaches the last job.
pub struct PassRunner {
    ctx: JobContext,
    catalog: SymbolCatalog,
    ledger: JobLedger,
}

impl PassRunner {
    pub fn new(ctx: JobContext, catalog: SymbolCatalog, ledger: JobLedger) -> Self {
        Self {
            ctx,
            catalog,
            ledger,
        }
    }

    /// Process every job once, pausing between jobs that reached the
    /// provider. The exchange endpoint is a free tier; the pause keeps us
    /// considerate. Jobs skipped before fetching do not pause, and the
    /// pass ends after the last job with no trailing delay.
    pub async fn run_pass(&mut self) -> PassSummary {
        let total = self.ledger.len();
        let delay = Duration::from_secs(self.ledger.servers().delay);
        info!(jobs = total, "Starting notification pass over {} jobs", total);

        let mut outcomes = Vec::with_capacity(total);
        for index in 0..total {
            let outcome = self.process_job(index).await;
            let touched_provider = !matches!(
                outcome,
                JobOutcome::SkippedExhausted | JobOutcome::SkippedUnresolved { .. }
            );
            outcomes.push(outcome);

            let last = index + 1 == total;
            if touched_provider && !last && !delay.is_zero() {
                sleep(delay).await;
            }
        }

        let summary = PassSummary { outcomes };
        info!(
            jobs = summary.total(),
            notified = summary.notified(),
            skipped = summary.skipped(),
            failures = summary.failures(),
            "Pass complete: {} jobs, {} notified, {} skipped, {} failed",
            summary.total(),
            summary.notified(),
            summary.skipped(),
            summary.failures()
        );
        summary
    }

    async fn process_job(&mut self, index: usize) -> JobOutcome {
        let job = self.ledger.job(index).clone();

        if self.ledger.is_exhausted(index) {
            info!(
                job = index,
                source = %job.source_coin,
                target = %job.target_coin,
                "Not monitoring job #{} for {} {} {} due to maximum email sent limit reached",
                index,
                job.source_coin,
                job.comparison,
                job.target_coin
            );
            return JobOutcome::SkippedExhausted;
        }

        let source_id = self.catalog.resolve(&job.source_coin);
        if source_id == UNRESOLVED_ID {
            warn!(
                job = index,
                symbol = %job.source_coin,
                "Skipping job #{}: symbol {} is not in the catalog",
                index,
                job.source_coin
            );
            return JobOutcome::SkippedUnresolved {
                symbol: job.source_coin.clone(),
            };
        }
        let target_id = self.catalog.resolve(&job.target_coin);
        if target_id == UNRESOLVED_ID {
            warn!(
                job = index,
                symbol = %job.target_coin,
                "Skipping job #{}: symbol {} is not in the catalog",
                index,
                job.target_coin
            );
            return JobOutcome::SkippedUnresolved {
                symbol: job.target_coin.clone(),
            };
        }

        let request = QuoteRequest {
            source_id,
            target_id,
            amount: job.source_value,
        };
        let raw = match self.ctx.source.exchange_quote(&request).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    job = index,
                    error = %e,
                    "Job #{} fetch failed: {}",
                    index,
                    e
                );
                return JobOutcome::FetchFailed;
            }
        };

        let quote = match coinmarketcap::normalize(&raw) {
            Ok(quote) => quote,
            Err(e) => {
                error!(
                    job = index,
                    error = %e,
                    "Job #{} skipped after fetch: {}",
                    index,
                    e
                );
                return JobOutcome::MalformedResponse;
            }
        };

        // The only error out of evaluate is an unparseable operator.
        let evaluation = match evaluator::evaluate(&job, &quote) {
            Ok(evaluation) => evaluation,
            Err(e) => {
                error!(
                    job = index,
                    comparison = %job.comparison,
                    "Job #{} skipped: {}",
                    index,
                    e
                );
                return JobOutcome::InvalidOperator {
                    found: job.comparison.clone(),
                };
            }
        };

        match evaluation {
            EvaluationOutcome::NotApplicable => {
                warn!(
                    job = index,
                    quote_pair = %format!("{}/{}", quote.source_symbol, quote.target_symbol),
                    "Job #{} got a quote for {}/{} instead of {}/{}, not evaluating",
                    index,
                    quote.source_symbol,
                    quote.target_symbol,
                    job.source_coin,
                    job.target_coin
                );
                JobOutcome::NotApplicable
            }
            EvaluationOutcome::NotTriggered { detail } => {
                info!(job = index, "{}", detail);
                JobOutcome::NotTriggered
            }
            EvaluationOutcome::Triggered { subject, message } => {
                self.notify(index, &job, &subject, &message).await
            }
        }
    }

    async fn notify(
        &mut self,
        index: usize,
        job: &JobSpec,
        subject: &str,
        message: &str,
    ) -> JobOutcome {
        info!(job = index, "{}", message);

        let delivered = match self.ctx.dispatcher.dispatch(&job.email, subject, message).await {
            Ok(DispatchOutcome::Sent) => true,
            Ok(DispatchOutcome::Disabled) => false,
            Err(e) => {
                error!(
                    job = index,
                    to = %job.email,
                    error = %e,
                    "Job #{} alert not delivered: {}",
                    index,
                    e
                );
                return JobOutcome::DispatchFailed;
            }
        };

        if let Err(e) = self.ledger.record_success(index) {
            error!(
                job = index,
                error = %e,
                "Job #{} count advanced in memory only: {}",
                index,
                e
            );
        }

        JobOutcome::Notified { delivered }
    }
}
