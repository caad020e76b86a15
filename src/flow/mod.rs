//! Account flow execution
//!
//! A flow is the business-specific sequence of steps run once per account:
//! an `initialize` step followed by the main `execute` step, both retried
//! through [`run_with_retry`]. The driver owns pacing (startup jitter,
//! inter-account pause) and contains every error at the account boundary.
//!
//! # Modules
//!
//! - [`step`] - the explicit success/failure outcome type
//! - [`retry`] - bounded retry wrapper with randomized pauses
//! - [`driver`] - per-account driver
//! - [`chatter`] - concrete flow generating messages via the text adapter

pub mod chatter;
pub mod driver;
pub mod retry;
pub mod step;

pub use driver::run_account;
pub use retry::run_with_retry;
pub use step::StepOutcome;

use std::sync::Arc;

use async_trait::async_trait;

use crate::account::Account;
use crate::config::Config;
use crate::tasks::TaskData;

/// Read-only context shared by every concurrent account flow
#[derive(Clone)]
pub struct RunContext {
    /// Process-wide configuration, immutable after startup
    pub config: Arc<Config>,

    /// Task payload prepared once before account iteration begins
    pub task_data: Arc<TaskData>,
}

impl RunContext {
    pub fn new(config: Arc<Config>, task_data: Arc<TaskData>) -> Self {
        Self { config, task_data }
    }
}

/// The business-specific steps run for one account
///
/// Both steps report through [`StepOutcome`]; an `Err` means the step hit
/// something unrecoverable and ends the account's pass at the driver
/// boundary.
#[async_trait]
pub trait AccountFlow: Send {
    /// Prepare the flow (sessions, clients, warm-up calls)
    async fn initialize(&mut self) -> eyre::Result<StepOutcome>;

    /// Run the main task for this account
    async fn execute(&mut self) -> eyre::Result<StepOutcome>;
}

/// Builds a fresh flow instance per account
pub trait FlowFactory: Send + Sync {
    fn build(&self, account: &Account, ctx: &RunContext) -> Box<dyn AccountFlow>;
}
