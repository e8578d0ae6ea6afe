//! `generate` and `push` handlers.

use homie_setup_api::{
    ConfigRequest, DeviceClient, DeviceConfig, MqttOptions, OtaOptions, SsidDetector,
    generate_config,
};

use crate::cli::{GenerateArgs, GlobalOpts, PushArgs};
use crate::config::{self, AnswerStore};
use crate::error::CliError;
use crate::output;

use super::util;

/// Answer store key holding the last generated document.
pub const ANSWERS_KEY: &str = "config";

/// Flags to generator input. Unset boolean flags stay unset so the
/// generator's defaults apply.
pub fn request_from_args(args: &GenerateArgs) -> ConfigRequest {
    let mqtt = &args.mqtt;
    let ota = &args.ota;
    ConfigRequest {
        name: args.name.clone(),
        device_id: args.device_id.clone(),
        wifi_ssid: args.ssid.clone(),
        wifi_password: args.wifi_password.clone(),
        mqtt_host: args.mqtt_host.clone(),
        mqtt: Some(MqttOptions {
            port: mqtt.mqtt_port,
            mdns: mqtt.mqtt_mdns.clone(),
            base_topic: mqtt.base_topic.clone(),
            auth: mqtt.mqtt_auth.then_some(true),
            username: mqtt.mqtt_username.clone(),
            password: mqtt.mqtt_password.clone(),
            ssl: mqtt.mqtt_ssl.then_some(true),
            fingerprint: mqtt.mqtt_fingerprint.clone(),
        }),
        ota: Some(OtaOptions {
            enabled: ota.ota.then_some(true),
            host: ota.ota_host.clone(),
            port: ota.ota_port,
            mdns: ota.ota_mdns.clone(),
            path: ota.ota_path.clone(),
            ssl: ota.ota_ssl.then_some(true),
            fingerprint: ota.ota_fingerprint.clone(),
        }),
    }
}

pub fn generate(
    args: &GenerateArgs,
    global: &GlobalOpts,
    detector: &dyn SsidDetector,
) -> Result<(), CliError> {
    let document = generate_config(request_from_args(args), detector)?;
    let json = output::render_json_pretty(&document);

    match args.out {
        Some(ref path) => {
            std::fs::write(path, format!("{json}\n"))?;
            output::print_status(
                &format!("Configuration for {} written to {}", document.device_id, path.display()),
                global.quiet,
            );
        }
        None => output::print_output(&json, global.quiet),
    }

    if args.remember {
        let mut store = AnswerStore::open(config::answers_path())?;
        store.set(ANSWERS_KEY, &document)?;
        tracing::info!(path = %store.path().display(), "remembered configuration");
    }
    Ok(())
}

/// Read a document, run it back through the generator's validation and
/// send it to the device.
pub async fn push(
    client: &DeviceClient,
    args: &PushArgs,
    global: &GlobalOpts,
    detector: &(dyn SsidDetector + Sync),
) -> Result<(), CliError> {
    let value = util::read_json_file(&args.file)?;
    let document: DeviceConfig = serde_json::from_value(value).map_err(|e| CliError::Validation {
        field: args.file.display().to_string(),
        reason: format!("not a device configuration: {e}"),
    })?;
    let document = generate_config(ConfigRequest::from(document), detector)?;

    let prompt = format!(
        "Send configuration '{}' to {}? The device reboots afterwards",
        document.device_id,
        client.base_url()
    );
    if !util::confirm(&prompt, global.yes)? {
        return Err(CliError::Cancelled);
    }

    send(client, &document, global.quiet).await
}

/// `PUT /config` with progress feedback.
pub async fn send(
    client: &DeviceClient,
    document: &DeviceConfig,
    quiet: bool,
) -> Result<(), CliError> {
    let pb = util::spinner("Sending configuration...", quiet);
    let result = client.save_config(document).await;
    pb.finish_and_clear();
    result?;

    output::print_status(
        &format!(
            "Configuration saved. '{}' will reboot and connect to '{}'.",
            document.name, document.wifi.ssid
        ),
        quiet,
    );
    Ok(())
}
