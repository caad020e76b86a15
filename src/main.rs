//! Flockrun - account automation runner
//!
//! CLI entry point: resolves the task, prepares its payload, loads the
//! roster and hands everything to the runner.

use std::sync::Arc;

use clap::Parser;
use eyre::{Context, Result};
use tracing::{info, warn};

use flockrun::account::load_accounts;
use flockrun::cli::{Cli, Command};
use flockrun::config::Config;
use flockrun::flow::FlowFactory;
use flockrun::flow::chatter::ChatterFactory;
use flockrun::runner::{Runner, select_accounts};
use flockrun::tasks::{self, MAIN_MENU, Task};
use flockrun::version;

/// GitHub repository checked for newer releases
const RELEASE_OWNER: &str = "flockrun";
const RELEASE_REPO: &str = "flockrun";

fn setup_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    match cli.command {
        Some(Command::Run { task }) => cmd_run(config, &task).await,
        Some(Command::ListTasks) => cmd_list_tasks(),
        Some(Command::Accounts) => cmd_accounts(&config),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

/// Run a task over the selected accounts
async fn cmd_run(config: Config, task_name: &str) -> Result<()> {
    let task: Task = task_name.parse().map_err(|e: String| eyre::eyre!(e))?;

    if task == Task::Exit {
        info!("Exit selected, no accounts will be processed");
        return Ok(());
    }

    config.validate()?;

    // Best-effort: an unreachable GitHub API never blocks a run
    if let Err(err) = version::check_version(RELEASE_OWNER, RELEASE_REPO, env!("CARGO_PKG_VERSION")).await {
        warn!(error = %err, "Failed to check version, continuing with current build");
    }

    let task_data = tasks::prepare_data(&config, task).await?;
    let accounts = load_accounts(&config.accounts_file)?;

    let factory: Arc<dyn FlowFactory> = match task {
        Task::Chatter => Arc::new(ChatterFactory),
        Task::Exit => unreachable!("handled above"),
    };

    let runner = Runner::new(Arc::new(config), Arc::new(task_data), factory);

    // Ctrl-C feeds the shutdown channel; the single-account loop exits
    // cleanly, batch runs finish their accounts on their own
    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, requesting shutdown");
            let _ = shutdown_tx.send(()).await;
        }
    });

    info!(task = %task, "Starting run");
    runner.run(accounts, shutdown_rx).await
}

/// List the available tasks
fn cmd_list_tasks() -> Result<()> {
    println!("Available tasks:");
    for name in MAIN_MENU {
        println!("  {}", name);
    }
    Ok(())
}

/// Preview the account selection without dispatching anything
fn cmd_accounts(config: &Config) -> Result<()> {
    let accounts = load_accounts(&config.accounts_file)?;
    let selected = select_accounts(&accounts, &config.settings);

    println!("Roster: {} accounts, {} selected", accounts.len(), selected.len());
    println!(
        "Selection: range {:?}, allow-list {:?}, shuffle {}, single-account {}",
        config.settings.accounts_range,
        config.settings.exact_accounts_to_use,
        config.settings.shuffle_accounts,
        config.settings.use_single_account,
    );
    println!();

    for account in &selected {
        let proxy = account
            .proxy
            .as_ref()
            .map(|p| p.to_string())
            .unwrap_or_else(|| "(no proxy)".to_string());
        let columns: Vec<&str> = account.credentials.keys().map(String::as_str).collect();
        println!("  {:>5}  {}  [{}]", account.index, proxy, columns.join(", "));
    }

    if selected.is_empty() {
        println!("  (nothing selected)");
    }

    Ok(())
}
