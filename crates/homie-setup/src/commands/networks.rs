//! `networks` handler.

use std::time::Duration;

use tabled::Tabled;

use homie_setup_api::{DeviceClient, NetworkEntry};

use crate::cli::{GlobalOpts, NetworksArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct NetworkRow {
    #[tabled(rename = "SSID")]
    ssid: String,
    #[tabled(rename = "Signal")]
    signal: String,
    #[tabled(rename = "Security")]
    security: String,
}

pub async fn handle(
    client: &DeviceClient,
    args: NetworksArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let wait = Duration::from_secs(args.wait.unwrap_or(0));
    let networks = util::scan_networks(client, wait, global.quiet).await?;

    if networks.is_empty() && format == OutputFormat::Table {
        output::print_status("The device sees no Wi-Fi networks.", global.quiet);
        return Ok(());
    }

    let color = output::should_color(&global.color);
    let out = output::render_list(
        format,
        &networks,
        |n: &NetworkEntry| NetworkRow {
            ssid: n.ssid.clone(),
            signal: output::paint_signal(n.rssi, color),
            security: n.encryption.to_string(),
        },
        |n| n.ssid.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
