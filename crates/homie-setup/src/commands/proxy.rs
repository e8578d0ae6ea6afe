//! `proxy on|off` handler.

use homie_setup_api::DeviceClient;

use crate::cli::{GlobalOpts, OutputFormat, ProxyArgs, ProxyState};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    client: &DeviceClient,
    args: ProxyArgs,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let enable = args.state == ProxyState::On;
    let message = client.set_transparent_wifi_proxy(enable).await?;

    let out = output::render_single(
        format,
        &serde_json::json!({ "enabled": enable, "message": message }),
        |_| format!("Transparent proxy: {message}"),
        |_| message.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
