//! `wifi-status` and `wifi-connect` handlers.
//!
//! A connection attempt is only started by `/wifi-connect`; its outcome is
//! read by polling `/wifi-status` until it settles on connected or on one of
//! the failure states.

use std::time::Duration;

use homie_setup_api::{DeviceClient, WifiStatus};

use crate::cli::{GlobalOpts, OutputFormat, WifiConnectArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn status(
    client: &DeviceClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let raw = client.get_wifi_status().await?;
    let status = WifiStatus::from(raw.as_str());
    print_status(&status, global, format);
    Ok(())
}

pub async fn connect(
    client: &DeviceClient,
    args: WifiConnectArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let password = match args.password {
        Some(p) => p,
        None => rpassword::prompt_password(format!("Password for '{}': ", args.ssid))?,
    };

    client.connect_to_wifi(&args.ssid, &password).await?;
    tracing::info!(ssid = %args.ssid, "connection attempt accepted");

    let Some(secs) = args.wait else {
        output::print_status(
            &format!("Device is connecting to '{}'. Check with: homie-setup wifi-status", args.ssid),
            global.quiet,
        );
        return Ok(());
    };

    let pb = util::spinner(format!("Connecting to '{}'...", args.ssid), global.quiet);
    let result = wait_for_connection(client, Duration::from_secs(secs), |s| {
        pb.set_message(format!("Connecting to '{}' ({s})", args.ssid));
    })
    .await;
    pb.finish_and_clear();

    match result? {
        Some(status) if status.is_connected() => {
            print_status(&status, global, format);
            Ok(())
        }
        Some(status) => Err(CliError::WifiFailed {
            ssid: args.ssid,
            status: status.to_string(),
        }),
        None => Err(CliError::WaitExpired {
            what: format!("the connection to '{}'", args.ssid),
            seconds: secs,
        }),
    }
}

/// Poll once per [`util::POLL_INTERVAL`] until the status is connected or
/// a failure, or `wait` has passed (`None`).
async fn wait_for_connection(
    client: &DeviceClient,
    wait: Duration,
    mut on_status: impl FnMut(&WifiStatus),
) -> Result<Option<WifiStatus>, CliError> {
    let deadline = util::deadline_after(wait);
    loop {
        let status = WifiStatus::from(client.get_wifi_status().await?.as_str());
        tracing::debug!(%status, "wifi status");
        on_status(&status);

        if status.is_connected() || status.is_failure() {
            return Ok(Some(status));
        }
        if !util::time_for_another_poll(deadline) {
            return Ok(None);
        }
        tokio::time::sleep(util::POLL_INTERVAL).await;
    }
}

fn print_status(status: &WifiStatus, global: &GlobalOpts, format: OutputFormat) {
    let color = output::should_color(&global.color);
    let out = output::render_single(
        format,
        &serde_json::json!({ "status": status.as_str() }),
        |_| {
            let ok = !status.is_failure();
            format!("Wi-Fi: {}", output::paint_status(status.as_str(), ok, color))
        },
        |_| status.to_string(),
    );
    output::print_output(&out, global.quiet);
}
