// homie-setup-api: client for Homie devices in configuration mode

pub mod client;
pub mod error;
pub mod generator;
pub mod interpret;
pub mod models;
pub mod transport;

pub use client::DeviceClient;
pub use error::{BoxError, Error};
pub use generator::{ConfigRequest, MqttOptions, OtaOptions, SsidDetector, generate_config};
pub use models::{
    DeviceConfig, DeviceInfo, Encryption, Firmware, MqttConfig, NetworkEntry, NodeInfo,
    OtaConfig, WifiConfig, WifiStatus,
};
pub use transport::ConnectionOptions;
