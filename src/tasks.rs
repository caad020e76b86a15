//! Task selection and payload preparation
//!
//! One task is chosen per run from a fixed menu. Its payload is prepared
//! once before account iteration begins and shared read-only across every
//! concurrent flow.

use eyre::{Context, Result};
use tracing::info;

use crate::config::Config;

/// The fixed task menu
pub const MAIN_MENU: &[&str] = &["chatter", "exit"];

/// A runnable task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Generate and send AI chatter messages per account
    Chatter,

    /// Terminate the run with no accounts processed
    Exit,
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chatter => "chatter",
            Self::Exit => "exit",
        }
    }
}

impl std::str::FromStr for Task {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chatter" => Ok(Self::Chatter),
            "exit" => Ok(Self::Exit),
            _ => Err(format!("Unknown task: {}. Use one of: {}", s, MAIN_MENU.join(", "))),
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Task payload prepared once per run, shared read-only by all flows
#[derive(Debug, Clone, Default)]
pub struct TaskData {
    /// System prompt sent ahead of each generated message
    pub system_prompt: String,

    /// User prompt bank the flows draw from
    pub prompts: Vec<String>,
}

/// Prepare the payload for the selected task
pub async fn prepare_data(config: &Config, task: Task) -> Result<TaskData> {
    match task {
        Task::Exit => Ok(TaskData::default()),
        Task::Chatter => {
            let prompts = match &config.chatter.prompts_file {
                Some(path) => {
                    let content = tokio::fs::read_to_string(path)
                        .await
                        .context(format!("Failed to read prompts file {}", path.display()))?;
                    serde_yaml::from_str::<Vec<String>>(&content)
                        .context(format!("Failed to parse prompts file {}", path.display()))?
                }
                None => default_prompts(),
            };

            if prompts.is_empty() {
                return Err(eyre::eyre!("prompt bank is empty"));
            }

            info!(count = prompts.len(), "Prepared chatter prompt bank");
            Ok(TaskData {
                system_prompt: config.chatter.system_prompt.clone(),
                prompts,
            })
        }
    }
}

fn default_prompts() -> Vec<String> {
    [
        "Write a short greeting for a community chat.",
        "Share a one-line thought about today.",
        "Ask a casual question to start a conversation.",
        "React briefly to some good news a friend shared.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
