//! Account selection
//!
//! Exactly one selection rule applies per run: a nonzero range filters by
//! inclusive index range; otherwise a non-empty allow-list keeps matching
//! indices; otherwise the whole roster is kept. The [0, 0] range is the
//! sentinel for "consult the allow-list".

use tracing::info;

use crate::account::Account;
use crate::config::Settings;

/// Apply the configured selection rule to the full roster
pub fn select_accounts(all: &[Account], settings: &Settings) -> Vec<Account> {
    let [start, end] = settings.accounts_range;

    if start == 0 && end == 0 {
        if !settings.exact_accounts_to_use.is_empty() {
            info!(indices = ?settings.exact_accounts_to_use, "Using specific accounts");
            return all
                .iter()
                .filter(|acc| settings.exact_accounts_to_use.contains(&acc.index))
                .cloned()
                .collect();
        }
        return all.to_vec();
    }

    // A nonzero bound always filters by range, even when only one is set
    all.iter()
        .filter(|acc| start <= acc.index && acc.index <= end)
        .cloned()
        .collect()
}

/// Batch-level validation before any task is scheduled
///
/// The proxy check is deliberately coarse: the run aborts only when none of
/// the selected accounts carries a proxy.
pub fn validate_selection(selected: &[Account]) -> eyre::Result<()> {
    if selected.is_empty() {
        return Err(eyre::eyre!("No accounts found in specified range"));
    }

    if !selected.iter().any(|acc| acc.proxy.is_some()) {
        return Err(eyre::eyre!("No proxies found in accounts data"));
    }

    Ok(())
}
