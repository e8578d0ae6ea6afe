// Device API data model
//
// The configuration document pushed with `PUT /config`, plus the typed
// views of `/device-info`, `/networks` and `/wifi-status`. Absent optional
// values are never serialized, so a document read back from disk with
// `null`s in it is written out clean.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Default MQTT broker port.
pub const DEFAULT_MQTT_PORT: u16 = 1883;
/// Default MQTT base topic.
pub const DEFAULT_BASE_TOPIC: &str = "devices/";
/// Default OTA server port.
pub const DEFAULT_OTA_PORT: u16 = 80;
/// Default OTA endpoint path.
pub const DEFAULT_OTA_PATH: &str = "/ota";

// ── Configuration document ───────────────────────────────────────────

/// The configuration document accepted by `PUT /config`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub name: String,
    pub device_id: String,
    pub wifi: WifiConfig,
    pub mqtt: MqttConfig,
    pub ota: OtaConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiConfig {
    pub ssid: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttConfig {
    pub host: String,
    #[serde(default = "default_mqtt_port", deserialize_with = "mqtt_port_or_default")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mdns: Option<String>,
    #[serde(default = "default_base_topic", deserialize_with = "base_topic_or_default")]
    pub base_topic: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auth: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub ssl: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtaConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub enabled: bool,
    pub host: String,
    #[serde(default = "default_ota_port", deserialize_with = "ota_port_or_default")]
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mdns: Option<String>,
    #[serde(default = "default_ota_path", deserialize_with = "ota_path_or_default")]
    pub path: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "is_false")]
    pub ssl: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

fn default_mqtt_port() -> u16 {
    DEFAULT_MQTT_PORT
}
fn default_base_topic() -> String {
    DEFAULT_BASE_TOPIC.into()
}
fn default_ota_port() -> u16 {
    DEFAULT_OTA_PORT
}
fn default_ota_path() -> String {
    DEFAULT_OTA_PATH.into()
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

// `null` reads the same as a missing key.

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn mqtt_port_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or(DEFAULT_MQTT_PORT))
}

fn base_topic_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_base_topic))
}

fn ota_port_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or(DEFAULT_OTA_PORT))
}

fn ota_path_or_default<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::deserialize(deserializer)?.unwrap_or_else(default_ota_path))
}

// ── Device info ──────────────────────────────────────────────────────

/// Device descriptor from `GET /device-info`.
///
/// Firmware versions add fields over time; anything not modelled here
/// lands in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub homie_version: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub firmware: Firmware,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nodes: Vec<NodeInfo>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Firmware {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
}

// ── Wi-Fi scan ───────────────────────────────────────────────────────

/// One access point visible to the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub ssid: String,
    pub rssi: i32,
    pub encryption: Encryption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encryption {
    Wep,
    Wpa,
    Wpa2,
    None,
    Auto,
    #[serde(other)]
    Unknown,
}

impl Encryption {
    /// Whether joining this network needs a passphrase.
    pub fn requires_password(self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wep => "wep",
            Self::Wpa => "wpa",
            Self::Wpa2 => "wpa2",
            Self::None => "none",
            Self::Auto => "auto",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Encryption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a successful `GET /networks`.
#[derive(Debug, Deserialize)]
pub(crate) struct NetworkList {
    pub networks: Vec<NetworkEntry>,
}

// ── Wi-Fi status ─────────────────────────────────────────────────────

/// Classification of the `/wifi-status` string.
///
/// After `/wifi-connect` is accepted the device moves from
/// disconnected to connecting; polling this status tells the caller
/// when it has settled on connected or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiStatus {
    Idle,
    NoSsidAvailable,
    ScanCompleted,
    Connected,
    ConnectFailed,
    ConnectionLost,
    Disconnected,
    Other(String),
}

impl WifiStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Terminal failure states of a connection attempt.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::NoSsidAvailable | Self::ConnectFailed | Self::ConnectionLost
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "idle",
            Self::NoSsidAvailable => "no_ssid_available",
            Self::ScanCompleted => "scan_completed",
            Self::Connected => "connected",
            Self::ConnectFailed => "connect_failed",
            Self::ConnectionLost => "connection_lost",
            Self::Disconnected => "disconnected",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for WifiStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "idle" => Self::Idle,
            "no_ssid_available" => Self::NoSsidAvailable,
            "scan_completed" => Self::ScanCompleted,
            "connected" => Self::Connected,
            "connect_failed" => Self::ConnectFailed,
            "connection_lost" => Self::ConnectionLost,
            "disconnected" => Self::Disconnected,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for WifiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
