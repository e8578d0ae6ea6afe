//! Interactive setup.
//!
//! Checks the device, reads its descriptor and scan results, asks for the
//! remaining settings, generates the document and optionally pushes it.
//! Previous answers are offered as defaults.

use std::collections::HashSet;
use std::time::Duration;

use dialoguer::{Confirm, Input, Select};

use homie_setup_api::generator::DEVICE_ID_PREFIX;
use homie_setup_api::{
    ConfigRequest, DeviceClient, DeviceConfig, MqttOptions, NetworkEntry, OtaOptions,
    SsidDetector, generate_config,
};

use crate::cli::{GlobalOpts, WizardArgs};
use crate::config::{self, AnswerStore, Config};
use crate::error::CliError;
use crate::output;

use super::generate::{self as gen_cmd, ANSWERS_KEY};
use super::util::{self, prompt_err};

/// How long to wait for the device's first scan.
const SCAN_WAIT: Duration = Duration::from_secs(15);

const MANUAL_ENTRY: &str = "Other network...";

pub async fn handle(
    args: WizardArgs,
    global: &GlobalOpts,
    cfg: &Config,
    detector: &(dyn SsidDetector + Sync),
) -> Result<(), CliError> {
    let mut store = AnswerStore::open(config::answers_path())?;
    let previous: Option<DeviceConfig> = store.get(ANSWERS_KEY);

    let client = connect(global, cfg).await?;

    let pb = util::spinner("Reading device info...", global.quiet);
    let info = client.get_device_info().await;
    pb.finish_and_clear();
    let info = info?;
    output::print_status(
        &format!(
            "Found {} {} (id {})",
            info.firmware.name, info.firmware.version, info.device_id
        ),
        global.quiet,
    );

    let networks = util::scan_networks(&client, SCAN_WAIT, global.quiet).await?;
    let ssid = choose_ssid(&networks, previous.as_ref())?;
    let wifi_password = prompt_secret(
        &format!("Wi-Fi password for '{ssid}'"),
        previous
            .as_ref()
            .filter(|p| p.wifi.ssid == ssid)
            .map(|p| p.wifi.password.clone()),
    )?;

    let name: String = Input::new()
        .with_prompt("Device name")
        .default(previous.as_ref().map_or_else(String::new, |p| p.name.clone()))
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let seeded_id = if info.device_id.is_empty() {
        String::new()
    } else {
        format!("{DEVICE_ID_PREFIX}{}", info.device_id)
    };
    let device_id: String = Input::new()
        .with_prompt("Device ID")
        .default(previous.as_ref().map_or(seeded_id, |p| p.device_id.clone()))
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;

    let mqtt_host: String = Input::new()
        .with_prompt("MQTT broker host")
        .with_initial_text(previous.as_ref().map_or_else(String::new, |p| p.mqtt.host.clone()))
        .interact_text()
        .map_err(prompt_err)?;

    let mqtt = prompt_mqtt_auth(previous.as_ref())?;
    let ota = prompt_ota(previous.as_ref())?;

    let request = ConfigRequest {
        name: Some(name),
        device_id: Some(device_id),
        wifi_ssid: Some(ssid),
        wifi_password: Some(wifi_password),
        mqtt_host: Some(mqtt_host),
        mqtt: Some(mqtt),
        ota: Some(ota),
    };
    let document = generate_config(request, detector)?;

    store.set(ANSWERS_KEY, &document)?;
    tracing::info!(path = %store.path().display(), "answers saved");
    output::print_status(
        &format!("Configuration remembered in {}", store.path().display()),
        global.quiet,
    );

    if args.no_push {
        output::print_output(&output::render_json_pretty(&document), global.quiet);
        return Ok(());
    }

    let push = args.push
        || util::confirm(
            &format!("Send configuration to {}?", client.base_url()),
            global.yes,
        )?;
    if push {
        gen_cmd::send(&client, &document, global.quiet).await
    } else {
        output::print_output(&output::render_json_pretty(&document), global.quiet);
        Ok(())
    }
}

/// Ask for the device address (defaulting to the gateway) unless one was
/// configured, then check the heartbeat.
async fn connect(global: &GlobalOpts, cfg: &Config) -> Result<DeviceClient, CliError> {
    let has_address = global.url.is_some()
        || config::active_profile_name(global, cfg).is_some_and(|n| cfg.devices.contains_key(&n));

    let options = if has_address {
        config::resolve_options(global, cfg, config::gateway_or_default)?
    } else {
        let address: String = Input::new()
            .with_prompt("Device address")
            .default(config::gateway_or_default())
            .interact_text()
            .map_err(prompt_err)?;
        config::resolve_options(global, cfg, || address)?
    };

    let client = DeviceClient::new(options)?;
    let pb = util::spinner(format!("Checking {}...", client.base_url()), global.quiet);
    let alive = client.get_heartbeat().await;
    pb.finish_and_clear();
    alive?;
    Ok(client)
}

fn choose_ssid(
    networks: &[NetworkEntry],
    previous: Option<&DeviceConfig>,
) -> Result<String, CliError> {
    if let Some(prev) = previous {
        let reuse = Confirm::new()
            .with_prompt(format!("Use Wi-Fi network '{}' again?", prev.wifi.ssid))
            .default(true)
            .interact()
            .map_err(prompt_err)?;
        if reuse {
            return Ok(prev.wifi.ssid.clone());
        }
    }

    let mut seen = HashSet::new();
    let unique: Vec<&NetworkEntry> = networks
        .iter()
        .filter(|n| seen.insert(n.ssid.as_str()))
        .collect();
    let mut items: Vec<String> = unique
        .iter()
        .map(|n| format!("{}  [{}, {}]", n.ssid, output::signal_label(n.rssi), n.encryption))
        .collect();
    items.push(MANUAL_ENTRY.into());

    let picked = Select::new()
        .with_prompt("Wi-Fi network")
        .items(&items)
        .default(0)
        .interact_opt()
        .map_err(prompt_err)?
        .ok_or(CliError::Cancelled)?;

    match unique.get(picked) {
        Some(network) => Ok(network.ssid.clone()),
        None => Input::new()
            .with_prompt("SSID")
            .interact_text()
            .map_err(prompt_err),
    }
}

fn prompt_mqtt_auth(previous: Option<&DeviceConfig>) -> Result<MqttOptions, CliError> {
    let prev_auth = previous.is_some_and(|p| p.mqtt.auth);
    let auth = Confirm::new()
        .with_prompt("Does the MQTT broker require authentication?")
        .default(prev_auth)
        .interact()
        .map_err(prompt_err)?;
    if !auth {
        return Ok(MqttOptions::default());
    }

    let username: String = Input::new()
        .with_prompt("MQTT username")
        .with_initial_text(
            previous
                .and_then(|p| p.mqtt.username.clone())
                .unwrap_or_default(),
        )
        .interact_text()
        .map_err(prompt_err)?;
    let password = prompt_secret(
        "MQTT password",
        previous.and_then(|p| p.mqtt.password.clone()),
    )?;

    Ok(MqttOptions {
        auth: Some(true),
        username: Some(username),
        password: Some(password),
        ..MqttOptions::default()
    })
}

fn prompt_ota(previous: Option<&DeviceConfig>) -> Result<OtaOptions, CliError> {
    let enabled = Confirm::new()
        .with_prompt("Enable over-the-air updates?")
        .default(previous.is_some_and(|p| p.ota.enabled))
        .interact()
        .map_err(prompt_err)?;
    Ok(OtaOptions {
        enabled: Some(enabled),
        ..OtaOptions::default()
    })
}

/// Hidden prompt; an empty answer keeps `previous` when there is one.
fn prompt_secret(label: &str, previous: Option<String>) -> Result<String, CliError> {
    let hint = if previous.is_some() { " [keep previous]" } else { "" };
    let entered = rpassword::prompt_password(format!("{label}{hint}: "))?;
    match previous {
        Some(prev) if entered.is_empty() => Ok(prev),
        _ => Ok(entered),
    }
}
