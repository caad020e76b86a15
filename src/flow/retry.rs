//! Retry wrapper for flow steps
//!
//! Runs a step up to a configured number of attempts, sleeping a uniformly
//! random pause between failed attempts. Exhausting all attempts is not an
//! error: the last outcome is returned verbatim and callers inspect it.

use std::time::Duration;
use tracing::{debug, info};

use crate::config::PauseRange;
use crate::flow::StepOutcome;

/// Run `op` up to `attempts` times, pausing between failed attempts
///
/// Returns the first successful outcome immediately. An `Err` from `op`
/// propagates at once; failures are retried and the final outcome is
/// returned as-is after the last attempt.
pub async fn run_with_retry<F>(label: &str, attempts: u32, pause: PauseRange, mut op: F) -> eyre::Result<StepOutcome>
where
    F: AsyncFnMut() -> eyre::Result<StepOutcome>,
{
    let mut last = StepOutcome::failure();

    for attempt in 1..=attempts {
        last = op().await?;

        if last.is_success() {
            debug!(label, attempt, "Step succeeded");
            return Ok(last);
        }

        // Don't sleep after the last attempt
        if attempt < attempts {
            let pause_secs = pause.pick();
            info!(label, attempt, attempts, pause_secs, "Step failed, sleeping before next attempt");
            tokio::time::sleep(Duration::from_secs(pause_secs)).await;
        }
    }

    debug!(label, attempts, "Step failed after all attempts");
    Ok(last)
}
