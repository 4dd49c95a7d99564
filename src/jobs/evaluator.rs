//! Threshold evaluation for configured jobs.
//!
//! Amount rendering follows the precision the operator wrote into the
//! configuration: a target of `0.250` renders rates with three fractional
//! digits, a target of `10` with none. Rendering never feeds back into the
//! numeric comparisons; only `=` works on rendered strings.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::JobSpec;
use crate::error::NotifyError;
use crate::models::{Comparison, EvaluationOutcome, NormalizedQuote};

/// Fractional digits carried by a configured value, as written in the
/// document.
pub fn fractional_digits(value: &Decimal) -> u32 {
    value.scale()
}

/// Render a value with a fixed number of fractional digits, rounding to
/// nearest (ties to even) and zero-padding short tails.
pub fn render_fixed(value: &Decimal, digits: u32) -> String {
    let rounded = value.round_dp_with_strategy(digits, RoundingStrategy::MidpointNearestEven);
    format!("{:.*}", digits as usize, rounded)
}

/// Evaluate one job against a normalized quote.
///
/// The pair check runs first: a quote for some other pair is
/// `NotApplicable` even when the job's operator is unparseable. An
/// unparseable operator on a matching pair is the only error here.
pub fn evaluate(job: &JobSpec, quote: &NormalizedQuote) -> Result<EvaluationOutcome, NotifyError> {
    if !pair_matches(job, quote) {
        return Ok(EvaluationOutcome::NotApplicable);
    }

    let comparison = Comparison::from_str(job.comparison.trim())?;

    let source_digits = fractional_digits(&job.source_value);
    let target_digits = fractional_digits(&job.target_value);

    let source_rendered = render_fixed(&job.source_value, source_digits);
    let target_rendered = render_fixed(&job.target_value, target_digits);
    // The current rate renders at the target's precision so it reads
    // against the configured target.
    let rate_rendered = render_fixed(&quote.target_amount, target_digits);

    let triggered = match comparison {
        Comparison::Greater => job.target_value < quote.target_amount,
        Comparison::Less => job.target_value > quote.target_amount,
        Comparison::Equal => target_rendered == rate_rendered,
    };

    if triggered {
        let subject = format!(
            "Monitored Target Price for {} {} {} Reached",
            job.source_coin, comparison, job.target_coin
        );
        let message = format!(
            "Current conversion rate of {} {} is {} {}, which has reached the configured target of {} {} {} {} {}",
            source_rendered,
            job.source_coin,
            rate_rendered,
            job.target_coin,
            source_rendered,
            job.source_coin,
            comparison,
            target_rendered,
            job.target_coin,
        );
        Ok(EvaluationOutcome::Triggered { subject, message })
    } else {
        let detail = format!(
            "Current conversion rate of {} {} is {} {}, has not reached the configured target of {} {} {} {} {} yet",
            source_rendered,
            job.source_coin,
            rate_rendered,
            job.target_coin,
            source_rendered,
            job.source_coin,
            comparison,
            target_rendered,
            job.target_coin,
        );
        Ok(EvaluationOutcome::NotTriggered { detail })
    }
}

fn pair_matches(job: &JobSpec, quote: &NormalizedQuote) -> bool {
    quote.source_symbol.eq_ignore_ascii_case(&job.source_coin)
        && quote.target_symbol.eq_ignore_ascii_case(&job.target_coin)
}
