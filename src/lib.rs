//! Flockrun - account automation runner
//!
//! Flockrun loads a roster of accounts (credentials plus an assigned proxy),
//! selects a subset by range or allow-list, and drives each account through
//! a pluggable flow with bounded retries and randomized pacing. Concurrency
//! is gated by a counting semaphore; single-account mode loops one account
//! indefinitely until a shutdown signal arrives.
//!
//! # Core Concepts
//!
//! - **Immutable run state**: config and task payload are built once and
//!   shared read-only across all concurrent flows
//! - **Explicit outcomes**: every flow step reports success or failure
//!   through one tagged type, never an ambiguous shape
//! - **Contained failures**: errors stop one account's pass, never the batch
//! - **Per-call proxies**: the text adapter threads each account's proxy
//!   through its own HTTP client, never process-wide state
//!
//! # Modules
//!
//! - [`account`] - roster types, proxy parsing, loading
//! - [`config`] - configuration types and loading
//! - [`flow`] - step outcomes, retry wrapper, per-account driver
//! - [`runner`] - selection, validation and dispatch
//! - [`llm`] - generative-text adapter
//! - [`tasks`] - task menu and payload preparation
//! - [`version`] - best-effort release check
//! - [`cli`] - command-line interface

pub mod account;
pub mod cli;
pub mod config;
pub mod flow;
pub mod llm;
pub mod runner;
pub mod tasks;
pub mod version;

// Re-export commonly used types
pub use account::{Account, Proxy, load_accounts};
pub use config::{ChatterConfig, Config, LlmConfig, PauseRange, Settings};
pub use flow::{AccountFlow, FlowFactory, RunContext, StepOutcome, run_account, run_with_retry};
pub use llm::{GeminiClient, LlmError};
pub use runner::{Runner, select_accounts, validate_selection};
pub use tasks::{Task, TaskData};
