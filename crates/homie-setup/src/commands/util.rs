//! Shared helpers for command handlers.

use std::io::{IsTerminal, Read};
use std::path::Path;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use homie_setup_api::{DeviceClient, Error as ApiError, NetworkEntry};

use crate::error::CliError;

/// Delay between polls of a device that is still busy.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Read and parse a JSON file; `-` reads stdin.
pub fn read_json_file(path: &Path) -> Result<serde_json::Value, CliError> {
    let contents = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: path.display().to_string(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Spinner on stderr, hidden in quiet mode or when stderr is not a terminal.
pub fn spinner(message: impl Into<String>, quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// `wait` from now, or `None` when that lies beyond what `Instant` can hold.
pub fn deadline_after(wait: Duration) -> Option<Instant> {
    Instant::now().checked_add(wait)
}

/// Whether another [`POLL_INTERVAL`] fits before `deadline`.
pub fn time_for_another_poll(deadline: Option<Instant>) -> bool {
    deadline.is_none_or(|d| Instant::now() + POLL_INTERVAL <= d)
}

/// Fetch the scan results, retrying `ScanNotReady` until `wait` has passed.
///
/// Results are sorted strongest signal first.
pub async fn scan_networks(
    client: &DeviceClient,
    wait: Duration,
    quiet: bool,
) -> Result<Vec<NetworkEntry>, CliError> {
    let deadline = deadline_after(wait);
    let pb = spinner("Waiting for the device's Wi-Fi scan...", quiet);

    let result = loop {
        match client.get_networks().await {
            Err(ApiError::ScanNotReady { message }) if time_for_another_poll(deadline) => {
                tracing::debug!(%message, "scan not ready, retrying");
                tokio::time::sleep(POLL_INTERVAL).await;
            }
            other => break other,
        }
    };
    pb.finish_and_clear();

    let mut networks = result?;
    sort_by_signal(&mut networks);
    Ok(networks)
}

/// Strongest first; ties broken by SSID so output is stable.
pub fn sort_by_signal(networks: &mut [NetworkEntry]) {
    networks.sort_by(|a, b| b.rssi.cmp(&a.rssi).then_with(|| a.ssid.cmp(&b.ssid)));
}
