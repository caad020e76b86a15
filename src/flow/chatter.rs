//! Chatter flow - generates messages through the text adapter
//!
//! The concrete flow behind the `chatter` task: `initialize` readies the
//! Gemini client, `execute` draws a prompt from the shared bank and asks
//! for a completion through the account's proxy.

use async_trait::async_trait;
use rand::Rng;
use tracing::{info, warn};

use crate::account::Account;
use crate::flow::{AccountFlow, FlowFactory, RunContext, StepOutcome};
use crate::llm::GeminiClient;

/// Builds a [`ChatterFlow`] per account
pub struct ChatterFactory;

impl FlowFactory for ChatterFactory {
    fn build(&self, account: &Account, ctx: &RunContext) -> Box<dyn AccountFlow> {
        Box::new(ChatterFlow {
            account: account.clone(),
            ctx: ctx.clone(),
            client: None,
        })
    }
}

/// One account's chatter flow
pub struct ChatterFlow {
    account: Account,
    ctx: RunContext,
    client: Option<GeminiClient>,
}

#[async_trait]
impl AccountFlow for ChatterFlow {
    async fn initialize(&mut self) -> eyre::Result<StepOutcome> {
        if self.account.proxy.is_none() {
            warn!(index = self.account.index, "Account has no proxy, requests go out directly");
        }

        let client = GeminiClient::from_config(&self.ctx.config.llm)?;
        self.client = Some(client);

        Ok(StepOutcome::success())
    }

    async fn execute(&mut self) -> eyre::Result<StepOutcome> {
        let Some(client) = &self.client else {
            return Ok(StepOutcome::failure_with("client not initialized"));
        };

        let data = &self.ctx.task_data;
        if data.prompts.is_empty() {
            return Ok(StepOutcome::failure_with("prompt bank is empty"));
        }

        let prompt = {
            let pick = rand::rng().random_range(0..data.prompts.len());
            data.prompts[pick].as_str()
        };

        let (success, text) = client.ask(&data.system_prompt, prompt, self.account.proxy.as_ref()).await;

        if success {
            info!(index = self.account.index, chars = text.len(), "Generated chatter message");
            Ok(StepOutcome::success_with(text))
        } else {
            Ok(StepOutcome::failure_with(text))
        }
    }
}
