//! Per-account flow driver
//!
//! Runs one account through its flow: startup jitter, `initialize`, the main
//! `execute` step, then the inter-account pause. Each step goes through the
//! retry wrapper with the configured attempt count. Errors never escape the
//! driver: they are logged with the account index and the pass ends.

use std::time::Duration;

use tracing::{error, info, warn};

use crate::account::Account;
use crate::flow::retry::run_with_retry;
use crate::flow::{FlowFactory, RunContext};

/// Drive one account through its flow, containing all errors
pub async fn run_account(account: &Account, ctx: &RunContext, factory: &dyn FlowFactory) {
    if let Err(err) = drive(account, ctx, factory).await {
        error!(index = account.index, error = %err, "Account flow failed");
    }
}

async fn drive(account: &Account, ctx: &RunContext, factory: &dyn FlowFactory) -> eyre::Result<()> {
    let settings = &ctx.config.settings;

    // Startup jitter desynchronizes concurrently scheduled accounts
    let pause_secs = settings.random_initialization_pause.pick();
    info!(index = account.index, pause_secs, "Sleeping before start");
    tokio::time::sleep(Duration::from_secs(pause_secs)).await;

    let mut flow = factory.build(account, ctx);

    let init = run_with_retry(
        "initialize",
        settings.attempts,
        settings.pause_between_attempts,
        async || flow.initialize().await,
    )
    .await?;

    // A failed initialize does not gate the main step
    if !init.is_success() {
        warn!(
            index = account.index,
            detail = init.detail().unwrap_or(""),
            "Initialize did not succeed, continuing to main flow"
        );
    }

    let main = run_with_retry(
        "flow",
        settings.attempts,
        settings.pause_between_attempts,
        async || flow.execute().await,
    )
    .await?;

    if !main.is_success() {
        warn!(
            index = account.index,
            detail = main.detail().unwrap_or(""),
            "Main flow did not succeed"
        );
    }

    // The pause runs on every concurrent task to avoid synchronized bursts
    // on shared external resources
    if !settings.use_single_account {
        let pause_secs = settings.random_pause_between_accounts.pick();
        info!(index = account.index, pause_secs, "Sleeping before next account");
        tokio::time::sleep(Duration::from_secs(pause_secs)).await;
    } else {
        info!(index = account.index, "Single account mode, skipping inter-account pause");
    }

    Ok(())
}
