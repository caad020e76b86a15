//! Integration tests for Flockrun
//!
//! These tests verify end-to-end behavior of selection, retry, dispatch and
//! the concurrency bound using scripted flows instead of real API calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use flockrun::account::{Account, load_accounts};
use flockrun::config::{Config, PauseRange};
use flockrun::flow::{AccountFlow, FlowFactory, RunContext, StepOutcome, run_with_retry};
use flockrun::runner::{Runner, select_accounts};
use flockrun::tasks::TaskData;

fn roster(indices: &[u32]) -> Vec<Account> {
    indices
        .iter()
        .map(|i| serde_yaml::from_str(&format!("index: {i}\nproxy: \"10.0.0.{i}:8080\"")).unwrap())
        .collect()
}

fn fast_config() -> Config {
    let mut config = Config::default();
    config.settings.attempts = 1;
    config.settings.shuffle_accounts = false;
    config.settings.pause_between_attempts = PauseRange::new(0, 0);
    config.settings.random_initialization_pause = PauseRange::new(0, 0);
    config.settings.random_pause_between_accounts = PauseRange::new(0, 0);
    config
}

// =============================================================================
// Selection Tests
// =============================================================================

#[test]
fn test_range_three_to_five_selects_exactly_that_range() {
    let all = roster(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    let mut config = fast_config();
    config.settings.accounts_range = [3, 5];

    let selected: Vec<u32> = select_accounts(&all, &config.settings).iter().map(|a| a.index).collect();

    assert_eq!(selected, vec![3, 4, 5]);
}

#[test]
fn test_allow_list_two_and_four() {
    let all = roster(&[1, 2, 3, 4, 5]);
    let mut config = fast_config();
    config.settings.accounts_range = [0, 0];
    config.settings.exact_accounts_to_use = vec![2, 4];

    let selected: Vec<u32> = select_accounts(&all, &config.settings).iter().map(|a| a.index).collect();

    assert_eq!(selected, vec![2, 4]);
}

#[test]
fn test_zero_range_and_empty_allow_list_keeps_everything() {
    let all = roster(&[1, 2, 3, 4, 5]);
    let config = fast_config();

    let selected = select_accounts(&all, &config.settings);

    assert_eq!(selected.len(), all.len());
}

// =============================================================================
// Retry Wrapper Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_retry_returns_after_kth_success() {
    let mut calls = 0u32;

    let outcome = run_with_retry("step", 10, PauseRange::new(1, 1), async || {
        calls += 1;
        if calls == 4 {
            Ok(StepOutcome::success())
        } else {
            Ok(StepOutcome::failure())
        }
    })
    .await
    .unwrap();

    assert!(outcome.is_success());
    assert_eq!(calls, 4);
}

#[tokio::test(start_paused = true)]
async fn test_retry_exhaustion_returns_last_failure() {
    let mut calls = 0u32;

    let outcome = run_with_retry("step", 3, PauseRange::new(0, 0), async || {
        calls += 1;
        Ok(StepOutcome::failure_with(format!("attempt {calls}")))
    })
    .await
    .unwrap();

    assert!(!outcome.is_success());
    assert_eq!(calls, 3);
    assert_eq!(outcome.detail(), Some("attempt 3"));
}

// =============================================================================
// Dispatch / Concurrency Tests
// =============================================================================

struct GaugedFlow {
    current: Arc<AtomicU32>,
    peak: Arc<AtomicU32>,
}

#[async_trait]
impl AccountFlow for GaugedFlow {
    async fn initialize(&mut self) -> eyre::Result<StepOutcome> {
        Ok(StepOutcome::success())
    }

    async fn execute(&mut self) -> eyre::Result<StepOutcome> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        // Hold the slot long enough for siblings to pile up on the semaphore
        tokio::time::sleep(Duration::from_millis(100)).await;

        self.current.fetch_sub(1, Ordering::SeqCst);
        Ok(StepOutcome::success())
    }
}

struct GaugedFactory {
    current: Arc<AtomicU32>,
    peak: Arc<AtomicU32>,
}

impl FlowFactory for GaugedFactory {
    fn build(&self, _account: &Account, _ctx: &RunContext) -> Box<dyn AccountFlow> {
        Box::new(GaugedFlow {
            current: self.current.clone(),
            peak: self.peak.clone(),
        })
    }
}

#[tokio::test]
async fn test_concurrency_never_exceeds_thread_limit() {
    let current = Arc::new(AtomicU32::new(0));
    let peak = Arc::new(AtomicU32::new(0));

    let mut config = fast_config();
    config.settings.threads = 2;

    let runner = Runner::new(
        Arc::new(config),
        Arc::new(TaskData::default()),
        Arc::new(GaugedFactory {
            current: current.clone(),
            peak: peak.clone(),
        }),
    );

    let (_tx, rx) = mpsc::channel(1);
    runner.run(roster(&[1, 2, 3, 4]), rx).await.unwrap();

    assert!(peak.load(Ordering::SeqCst) >= 1, "flows should have run");
    assert!(
        peak.load(Ordering::SeqCst) <= 2,
        "no more than 2 flows may run at once, saw {}",
        peak.load(Ordering::SeqCst)
    );
    assert_eq!(current.load(Ordering::SeqCst), 0);
}

struct IndexRecordingFlow {
    index: u32,
    seen: Arc<std::sync::Mutex<Vec<u32>>>,
}

#[async_trait]
impl AccountFlow for IndexRecordingFlow {
    async fn initialize(&mut self) -> eyre::Result<StepOutcome> {
        Ok(StepOutcome::success())
    }

    async fn execute(&mut self) -> eyre::Result<StepOutcome> {
        self.seen.lock().unwrap().push(self.index);
        Ok(StepOutcome::success())
    }
}

struct IndexRecordingFactory {
    seen: Arc<std::sync::Mutex<Vec<u32>>>,
}

impl FlowFactory for IndexRecordingFactory {
    fn build(&self, account: &Account, _ctx: &RunContext) -> Box<dyn AccountFlow> {
        Box::new(IndexRecordingFlow {
            index: account.index,
            seen: self.seen.clone(),
        })
    }
}

#[tokio::test]
async fn test_single_account_mode_reduces_to_one_account() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));

    let mut config = fast_config();
    config.settings.use_single_account = true;

    let runner = Runner::new(
        Arc::new(config),
        Arc::new(TaskData::default()),
        Arc::new(IndexRecordingFactory { seen: seen.clone() }),
    );

    let (tx, rx) = mpsc::channel(1);
    let handle = {
        let accounts = roster(&[1, 2, 3]);
        tokio::spawn(async move { runner.run(accounts, rx).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    tx.send(()).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("runner should stop after shutdown")
        .unwrap()
        .unwrap();

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty(), "the single account should have run at least once");

    // Shuffle is off, so the collapsed selection is the first account
    assert!(seen.iter().all(|&i| i == 1), "only one account may run, saw {:?}", seen);
}

// =============================================================================
// Roster Tests
// =============================================================================

#[test]
fn test_roster_load_and_select_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.yml");
    std::fs::write(
        &path,
        "- index: 1\n  proxy: \"alice:pw@10.0.0.1:8080\"\n  token: \"t1\"\n\
         - index: 2\n  proxy: \"\"\n  token: \"t2\"\n\
         - index: 3\n  proxy: \"10.0.0.3:8080\"\n  token: \"t3\"\n",
    )
    .unwrap();

    let accounts = load_accounts(&path).unwrap();
    assert_eq!(accounts.len(), 3);
    assert!(accounts[1].proxy.is_none());

    let mut config = fast_config();
    config.settings.accounts_range = [2, 3];

    let selected: Vec<u32> = select_accounts(&accounts, &config.settings).iter().map(|a| a.index).collect();
    assert_eq!(selected, vec![2, 3]);
}

// =============================================================================
// Config Tests
// =============================================================================

#[test]
fn test_partial_config_yaml_merges_with_defaults() {
    let yaml = "settings:\n  threads: 3\n  use-single-account: true\n";
    let config: Config = serde_yaml::from_str(yaml).unwrap();

    assert_eq!(config.settings.threads, 3);
    assert!(config.settings.use_single_account);
    assert_eq!(config.settings.attempts, 5);
    assert_eq!(config.llm.model, "gemini-2.0-flash");
}
