//! Flockrun configuration types and loading

use eyre::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main Flockrun configuration
///
/// Built once before scheduling begins and shared read-only by every
/// concurrent account flow. Nothing mutates it after `load`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheduling, retry and pacing settings
    pub settings: Settings,

    /// Generative-text provider configuration
    pub llm: LlmConfig,

    /// Chatter task configuration
    pub chatter: ChatterConfig,

    /// Path to the account roster file
    #[serde(rename = "accounts-file")]
    pub accounts_file: PathBuf,
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        if self.settings.threads == 0 {
            return Err(eyre::eyre!("threads must be at least 1"));
        }
        if self.settings.attempts == 0 {
            return Err(eyre::eyre!("attempts must be at least 1"));
        }

        let [start, end] = self.settings.accounts_range;
        if (start != 0 || end != 0) && start > end {
            return Err(eyre::eyre!(
                "accounts-range start ({}) is greater than end ({})",
                start,
                end
            ));
        }

        for (name, range) in [
            ("pause-between-attempts", &self.settings.pause_between_attempts),
            ("random-initialization-pause", &self.settings.random_initialization_pause),
            ("random-pause-between-accounts", &self.settings.random_pause_between_accounts),
        ] {
            if range.lo > range.hi {
                return Err(eyre::eyre!("{} has inverted bounds [{}, {}]", name, range.lo, range.hi));
            }
        }

        // Check the provider API key environment variable is set
        if std::env::var(&self.llm.api_key_env).is_err() {
            return Err(eyre::eyre!(
                "API key not found. Set the {} environment variable.",
                self.llm.api_key_env
            ));
        }

        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project-local config: ./flockrun.yml
        let local_config = PathBuf::from("flockrun.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", local_config.display(), e);
                }
            }
        }

        // Try user config: ~/.config/flockrun/flockrun.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("flockrun").join("flockrun.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Scheduling, retry and pacing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Maximum concurrent account flows
    pub threads: usize,

    /// Inclusive index range to process; [0, 0] means "use allow-list or all"
    #[serde(rename = "accounts-range")]
    pub accounts_range: [u32; 2],

    /// Explicit account indices to process (only consulted when the range is [0, 0])
    #[serde(rename = "exact-accounts-to-use")]
    pub exact_accounts_to_use: Vec<u32>,

    /// Shuffle the selected accounts before dispatch
    #[serde(rename = "shuffle-accounts")]
    pub shuffle_accounts: bool,

    /// Collapse the selection to one account and loop it indefinitely
    #[serde(rename = "use-single-account")]
    pub use_single_account: bool,

    /// Attempts per flow step
    pub attempts: u32,

    /// Pause bounds between retry attempts, in seconds
    #[serde(rename = "pause-between-attempts")]
    pub pause_between_attempts: PauseRange,

    /// Startup jitter bounds per account, in seconds
    #[serde(rename = "random-initialization-pause")]
    pub random_initialization_pause: PauseRange,

    /// Pause bounds after each account flow, in seconds
    #[serde(rename = "random-pause-between-accounts")]
    pub random_pause_between_accounts: PauseRange,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            threads: 5,
            accounts_range: [0, 0],
            exact_accounts_to_use: Vec::new(),
            shuffle_accounts: true,
            use_single_account: false,
            attempts: 5,
            pause_between_attempts: PauseRange::new(3, 10),
            random_initialization_pause: PauseRange::new(5, 30),
            random_pause_between_accounts: PauseRange::new(15, 60),
        }
    }
}

/// Inclusive pause bounds in integer seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u64; 2]", into = "[u64; 2]")]
pub struct PauseRange {
    pub lo: u64,
    pub hi: u64,
}

impl PauseRange {
    pub fn new(lo: u64, hi: u64) -> Self {
        Self { lo, hi }
    }

    /// Draw a uniform duration within the bounds, inclusive
    pub fn pick(&self) -> u64 {
        if self.lo >= self.hi {
            return self.lo;
        }
        rand::rng().random_range(self.lo..=self.hi)
    }
}

impl From<[u64; 2]> for PauseRange {
    fn from([lo, hi]: [u64; 2]) -> Self {
        Self { lo, hi }
    }
}

impl From<PauseRange> for [u64; 2] {
    fn from(range: PauseRange) -> Self {
        [range.lo, range.hi]
    }
}

/// Generative-text provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Model identifier
    pub model: String,

    /// Environment variable containing the API key
    #[serde(rename = "api-key-env")]
    pub api_key_env: String,

    /// API base URL
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum tokens per response
    #[serde(rename = "max-output-tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            max_output_tokens: 8192,
            timeout_ms: 120_000,
        }
    }
}

/// Chatter task configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatterConfig {
    /// System prompt sent ahead of each generated message
    #[serde(rename = "system-prompt")]
    pub system_prompt: String,

    /// Optional YAML file with a list of user prompts
    #[serde(rename = "prompts-file")]
    pub prompts_file: Option<PathBuf>,
}

impl Default for ChatterConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a casual member of an online community. \
                            Reply with one short, friendly message."
                .to_string(),
            prompts_file: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            llm: LlmConfig::default(),
            chatter: ChatterConfig::default(),
            accounts_file: PathBuf::from("accounts.yml"),
        }
    }
}
