//! `heartbeat` and `info` handlers.

use homie_setup_api::{DeviceClient, DeviceInfo};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn heartbeat(
    client: &DeviceClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let alive = client.get_heartbeat().await?;
    let url = client.base_url().to_string();

    let out = output::render_single(
        format,
        &serde_json::json!({ "url": url, "alive": alive }),
        |_| {
            let mark = output::paint_status("alive", alive, output::should_color(&global.color));
            format!("Device at {url} is {mark}")
        },
        |_| alive.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn info(
    client: &DeviceClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let info = client.get_device_info().await?;
    let out = output::render_single(format, &info, detail, |i| i.device_id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

fn detail(info: &DeviceInfo) -> String {
    let mut lines = vec![
        format!("Device ID: {}", info.device_id),
        format!("Homie:     {}", or_dash(&info.homie_version)),
        format!(
            "Firmware:  {} {}",
            or_dash(&info.firmware.name),
            info.firmware.version
        ),
    ];
    if info.nodes.is_empty() {
        lines.push("Nodes:     -".into());
    } else {
        lines.push("Nodes:".into());
        for node in &info.nodes {
            lines.push(format!("  {} ({})", node.id, node.node_type));
        }
    }
    for (key, value) in &info.extra {
        lines.push(format!("{key}: {value}"));
    }
    lines.join("\n")
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "-" } else { s }
}
