//! Runner - top-level orchestrator for one batch run
//!
//! The runner is responsible for:
//! - Selecting and validating the accounts to process
//! - Ordering (optional shuffle) and the single-account collapse
//! - Fan-out/fan-in dispatch gated by a counting semaphore
//! - The single-account infinite loop with error containment
//! - Clean exit on the shutdown signal

pub mod select;

pub use select::{select_accounts, validate_selection};

use std::sync::Arc;
use std::time::Duration;

use eyre::Result;
use futures::future::join_all;
use rand::seq::SliceRandom;
use tokio::sync::{Semaphore, mpsc};
use tracing::{error, info};

use crate::account::Account;
use crate::config::Config;
use crate::flow::{FlowFactory, RunContext, run_account};
use crate::tasks::TaskData;

/// Fallback delay after an error in the single-account loop
const SINGLE_LOOP_BACKOFF: Duration = Duration::from_secs(5);

/// Orchestrates one run over the selected accounts
pub struct Runner {
    config: Arc<Config>,
    ctx: RunContext,
    factory: Arc<dyn FlowFactory>,
}

impl Runner {
    pub fn new(config: Arc<Config>, task_data: Arc<TaskData>, factory: Arc<dyn FlowFactory>) -> Self {
        let ctx = RunContext::new(config.clone(), task_data);
        Self { config, ctx, factory }
    }

    /// Run the batch: select, validate, order, dispatch
    ///
    /// A message on `shutdown_rx` stops the single-account loop cleanly;
    /// multi-account runs complete on their own.
    pub async fn run(&self, all_accounts: Vec<Account>, mut shutdown_rx: mpsc::Receiver<()>) -> Result<()> {
        let settings = &self.config.settings;

        let mut selected = select_accounts(&all_accounts, settings);
        validate_selection(&selected)?;

        // Range is reported over the selection before any reordering
        let min_index = selected.iter().map(|a| a.index).min().unwrap_or(0);
        let max_index = selected.iter().map(|a| a.index).max().unwrap_or(0);
        info!(min_index, max_index, "Starting with accounts");

        if settings.shuffle_accounts {
            selected.shuffle(&mut rand::rng());
        }

        if settings.use_single_account {
            selected.truncate(1);
            info!(index = selected[0].index, "Single account mode, only processing one account");
        }

        let order = selected.iter().map(|a| a.index.to_string()).collect::<Vec<_>>().join(" ");
        info!(%order, "Accounts order");

        let semaphore = Arc::new(Semaphore::new(settings.threads));

        if settings.use_single_account {
            let account = selected.remove(0);
            self.run_single_loop(account, semaphore, &mut shutdown_rx).await;
            Ok(())
        } else {
            self.run_batch(selected, semaphore).await;
            Ok(())
        }
    }

    /// Multi-account mode: one gated task per account, fan-out/fan-in
    async fn run_batch(&self, accounts: Vec<Account>, semaphore: Arc<Semaphore>) {
        let mut tasks = Vec::with_capacity(accounts.len());

        for account in accounts {
            let semaphore = semaphore.clone();
            let ctx = self.ctx.clone();
            let factory = self.factory.clone();

            tasks.push(tokio::spawn(async move {
                // Permit is dropped on every exit path of the body
                match semaphore.acquire_owned().await {
                    Ok(_permit) => run_account(&account, &ctx, factory.as_ref()).await,
                    Err(err) => {
                        error!(index = account.index, error = %err, "Semaphore closed before dispatch");
                    }
                }
            }));
        }

        // No sibling cancellation: every task runs to completion
        for result in join_all(tasks).await {
            if let Err(err) = result {
                error!(error = %err, "Account task panicked");
            }
        }

        info!("All account flows finished");
    }

    /// Single-account mode: loop the one account until shutdown
    ///
    /// Ordinary errors never terminate the loop; they are logged and
    /// followed by a fixed backoff.
    async fn run_single_loop(&self, account: Account, semaphore: Arc<Semaphore>, shutdown_rx: &mut mpsc::Receiver<()>) {
        info!(index = account.index, "Starting infinite loop for single account mode");

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Shutdown received, stopping single account loop");
                    break;
                }
                result = self.single_pass(&semaphore, &account) => {
                    let pause = match result {
                        Ok(()) => {
                            let pause_secs = self.config.settings.random_pause_between_accounts.pick();
                            info!(pause_secs, "Single account cycle completed, pausing before next cycle");
                            Duration::from_secs(pause_secs)
                        }
                        Err(err) => {
                            error!(error = %err, "Error in single account loop");
                            SINGLE_LOOP_BACKOFF
                        }
                    };

                    tokio::select! {
                        _ = shutdown_rx.recv() => {
                            info!("Shutdown received during pause, stopping single account loop");
                            break;
                        }
                        _ = tokio::time::sleep(pause) => {}
                    }
                }
            }
        }
    }

    /// One gated driver pass for the single-account loop
    async fn single_pass(&self, semaphore: &Arc<Semaphore>, account: &Account) -> Result<()> {
        let _permit = semaphore.clone().acquire_owned().await?;
        run_account(account, &self.ctx, self.factory.as_ref()).await;
        Ok(())
    }
}
