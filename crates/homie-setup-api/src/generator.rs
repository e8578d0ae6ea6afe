// Configuration document generator
//
// Builds a `DeviceConfig` from partial input. Only the Wi-Fi password and
// the MQTT host are required; name, device id and SSID are filled in after
// validation has passed, the SSID by asking the host which network it is
// currently associated with. Nothing here talks to the device.

use rand::Rng;
use tracing::debug;

use crate::error::{BoxError, Error};
use crate::models::{
    DEFAULT_BASE_TOPIC, DEFAULT_MQTT_PORT, DEFAULT_OTA_PATH, DEFAULT_OTA_PORT, DeviceConfig,
    MqttConfig, OtaConfig, WifiConfig,
};

/// Name used when the caller supplies none.
pub const PLACEHOLDER_NAME: &str = "Homie Device";

/// Prefix of generated device ids.
pub const DEVICE_ID_PREFIX: &str = "Homie-";

/// Length of the random part of a generated device id.
pub const DEVICE_ID_TOKEN_LEN: usize = 8;

const TOKEN_CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

// ── Collaborators ────────────────────────────────────────────────────

/// Reports the SSID the host is currently associated with.
pub trait SsidDetector {
    fn current_ssid(&self) -> Result<String, BoxError>;
}

impl<F> SsidDetector for F
where
    F: Fn() -> Result<String, BoxError>,
{
    fn current_ssid(&self) -> Result<String, BoxError> {
        self()
    }
}

/// Random lowercase alphanumeric token of `len` characters.
pub fn random_token(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| char::from(TOKEN_CHARSET[rng.gen_range(0..TOKEN_CHARSET.len())]))
        .collect()
}

// ── Input ────────────────────────────────────────────────────────────

/// MQTT overrides. `None`, empty strings and port `0` all mean "use the default".
#[derive(Debug, Clone, Default)]
pub struct MqttOptions {
    pub port: Option<u16>,
    pub mdns: Option<String>,
    pub base_topic: Option<String>,
    pub auth: Option<bool>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssl: Option<bool>,
    pub fingerprint: Option<String>,
}

/// OTA overrides. `host` defaults to the MQTT host.
#[derive(Debug, Clone, Default)]
pub struct OtaOptions {
    pub enabled: Option<bool>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub mdns: Option<String>,
    pub path: Option<String>,
    pub ssl: Option<bool>,
    pub fingerprint: Option<String>,
}

/// Everything the generator accepts.
#[derive(Debug, Clone, Default)]
pub struct ConfigRequest {
    pub name: Option<String>,
    pub device_id: Option<String>,
    pub wifi_ssid: Option<String>,
    pub wifi_password: Option<String>,
    pub mqtt_host: Option<String>,
    pub mqtt: Option<MqttOptions>,
    pub ota: Option<OtaOptions>,
}

/// Re-check an existing document: feeding it back through
/// [`generate_config`] applies the same validation and normalization.
impl From<DeviceConfig> for ConfigRequest {
    fn from(config: DeviceConfig) -> Self {
        Self {
            name: Some(config.name),
            device_id: Some(config.device_id),
            wifi_ssid: Some(config.wifi.ssid),
            wifi_password: Some(config.wifi.password),
            mqtt_host: Some(config.mqtt.host),
            mqtt: Some(MqttOptions {
                port: Some(config.mqtt.port),
                mdns: config.mqtt.mdns,
                base_topic: Some(config.mqtt.base_topic),
                auth: Some(config.mqtt.auth),
                username: config.mqtt.username,
                password: config.mqtt.password,
                ssl: Some(config.mqtt.ssl),
                fingerprint: config.mqtt.fingerprint,
            }),
            ota: Some(OtaOptions {
                enabled: Some(config.ota.enabled),
                host: Some(config.ota.host),
                port: Some(config.ota.port),
                mdns: config.ota.mdns,
                path: Some(config.ota.path),
                ssl: Some(config.ota.ssl),
                fingerprint: config.ota.fingerprint,
            }),
        }
    }
}

fn given(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn given_port(port: Option<u16>) -> Option<u16> {
    port.filter(|p| *p != 0)
}

// ── Generation ───────────────────────────────────────────────────────

/// Validate `request` and build the configuration document.
///
/// Fails with `Error::Validation` on an empty Wi-Fi password or MQTT host,
/// before any default is computed. When no SSID is given, `detector` is
/// asked for the current one and its failure is returned as
/// `Error::SsidDetection`.
pub fn generate_config(
    request: ConfigRequest,
    detector: &dyn SsidDetector,
) -> Result<DeviceConfig, Error> {
    let wifi_password =
        given(request.wifi_password).ok_or_else(|| Error::validation("wifi_password is empty"))?;
    let mqtt_host =
        given(request.mqtt_host).ok_or_else(|| Error::validation("mqtt_host is empty"))?;

    let mqtt_opts = request.mqtt.unwrap_or_default();
    let ota_opts = request.ota.unwrap_or_default();

    let mqtt = MqttConfig {
        host: mqtt_host.clone(),
        port: given_port(mqtt_opts.port).unwrap_or(DEFAULT_MQTT_PORT),
        mdns: given(mqtt_opts.mdns),
        base_topic: given(mqtt_opts.base_topic).unwrap_or_else(|| DEFAULT_BASE_TOPIC.into()),
        auth: mqtt_opts.auth.unwrap_or(false),
        username: given(mqtt_opts.username),
        password: given(mqtt_opts.password),
        ssl: mqtt_opts.ssl.unwrap_or(false),
        fingerprint: given(mqtt_opts.fingerprint),
    };

    let ota = OtaConfig {
        enabled: ota_opts.enabled.unwrap_or(false),
        host: given(ota_opts.host).unwrap_or(mqtt_host),
        port: given_port(ota_opts.port).unwrap_or(DEFAULT_OTA_PORT),
        mdns: given(ota_opts.mdns),
        path: given(ota_opts.path).unwrap_or_else(|| DEFAULT_OTA_PATH.into()),
        ssl: ota_opts.ssl.unwrap_or(false),
        fingerprint: given(ota_opts.fingerprint),
    };

    let name = given(request.name).unwrap_or_else(|| {
        debug!("no device name given, using placeholder");
        PLACEHOLDER_NAME.into()
    });

    let device_id = given(request.device_id).unwrap_or_else(|| {
        let id = format!("{DEVICE_ID_PREFIX}{}", random_token(DEVICE_ID_TOKEN_LEN));
        debug!(device_id = %id, "generated device id");
        id
    });

    let ssid = match given(request.wifi_ssid) {
        Some(ssid) => ssid,
        None => {
            let ssid = detector.current_ssid().map_err(Error::SsidDetection)?;
            debug!(%ssid, "using detected SSID");
            ssid
        }
    };

    Ok(DeviceConfig {
        name,
        device_id,
        wifi: WifiConfig {
            ssid,
            password: wifi_password,
        },
        mqtt,
        ota,
    })
}
