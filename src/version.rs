//! Release version check against GitHub
//!
//! Best-effort: callers log a failure and continue with the current build.

use std::time::Duration;

use eyre::{Context, Result, bail};
use serde::Deserialize;
use tracing::{info, warn};

const GITHUB_API: &str = "https://api.github.com";

#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
}

/// Compare the running version against the repository's latest release tag
pub async fn check_version(owner: &str, repo: &str, current: &str) -> Result<()> {
    let url = format!("{}/repos/{}/{}/releases/latest", GITHUB_API, owner, repo);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .user_agent(format!("flockrun/{}", current))
        .build()
        .context("Failed to build HTTP client")?;

    let response = client.get(&url).send().await.context("Version check request failed")?;

    if !response.status().is_success() {
        bail!("GitHub API returned {}", response.status());
    }

    let release: LatestRelease = response.json().await.context("Failed to parse release response")?;
    let latest = normalize_tag(&release.tag_name);

    if latest != current {
        warn!(current, latest, "A newer release is available");
    } else {
        info!(current, "Running the latest release");
    }

    Ok(())
}

fn normalize_tag(tag: &str) -> &str {
    tag.trim().trim_start_matches('v')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tag() {
        assert_eq!(normalize_tag("v1.2.3"), "1.2.3");
        assert_eq!(normalize_tag("1.2.3"), "1.2.3");
        assert_eq!(normalize_tag(" v0.1.0 "), "0.1.0");
    }

    #[test]
    fn test_parse_release_payload() {
        let release: LatestRelease = serde_json::from_str(r#"{"tag_name": "v0.3.0", "name": "0.3.0"}"#).unwrap();
        assert_eq!(release.tag_name, "v0.3.0");
    }
}
