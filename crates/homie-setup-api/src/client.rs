// Device HTTP client
//
// Wraps `reqwest::Client` with the device's endpoint paths and hands every
// `(status, body)` pair to `interpret`. Each call is a single attempt; retry
// and polling policy belong to the caller.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, trace};
use url::Url;

use crate::error::Error;
use crate::interpret;
use crate::models::{DeviceConfig, DeviceInfo, NetworkEntry};
use crate::transport::ConnectionOptions;

/// HTTP client for a device in configuration mode.
///
/// Holds only immutable connection options and a pooled `reqwest::Client`,
/// so a shared reference can issue concurrent calls.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    options: ConnectionOptions,
}

/// A device answer: status plus the body parsed as JSON (`Null` when it isn't).
struct Reply {
    status: u16,
    body: Value,
}

impl DeviceClient {
    /// Create a client from connection options.
    pub fn new(options: ConnectionOptions) -> Result<Self, Error> {
        let http = options.build_client()?;
        Ok(Self { http, options })
    }

    /// Create a client for the device at `url` with default options.
    pub fn from_url(url: &str) -> Result<Self, Error> {
        Self::new(ConnectionOptions::new(url)?)
    }

    /// The device base URL.
    pub fn base_url(&self) -> &Url {
        &self.options.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Check that the host is talking to a compatible device.
    ///
    /// `GET /heart`
    #[instrument(skip(self), fields(url = %self.options.base_url))]
    pub async fn get_heartbeat(&self) -> Result<bool, Error> {
        let reply = self.send(self.http.get(self.url("heart")?)).await?;
        interpret::heartbeat(reply.status, &reply.body)
    }

    /// Read the device descriptor.
    ///
    /// `GET /device-info`
    #[instrument(skip(self), fields(url = %self.options.base_url))]
    pub async fn get_device_info(&self) -> Result<DeviceInfo, Error> {
        let reply = self.send(self.http.get(self.url("device-info")?)).await?;
        interpret::device_info(reply.status, &reply.body)
    }

    /// List the Wi-Fi networks visible to the device.
    ///
    /// `GET /networks`. Returns `Error::ScanNotReady` until the device's
    /// initial scan has finished.
    #[instrument(skip(self), fields(url = %self.options.base_url))]
    pub async fn get_networks(&self) -> Result<Vec<NetworkEntry>, Error> {
        let reply = self.send(self.http.get(self.url("networks")?)).await?;
        interpret::networks(reply.status, &reply.body)
    }

    /// Push a configuration document.
    ///
    /// `PUT /config` with the document as JSON.
    #[instrument(skip(self, config), fields(device_id = %config.device_id))]
    pub async fn save_config(&self, config: &DeviceConfig) -> Result<(), Error> {
        let reply = self.send_json(reqwest::Method::PUT, "config", config).await?;
        interpret::save_config(reply.status, &reply.body)
    }

    /// Ask the device to join a Wi-Fi network while staying in config mode.
    ///
    /// `POST /wifi-connect` (form: `ssid`, `password`). Acceptance only means
    /// the attempt started; poll [`get_wifi_status`](Self::get_wifi_status)
    /// for the outcome.
    #[instrument(skip(self, password))]
    pub async fn connect_to_wifi(&self, ssid: &str, password: &str) -> Result<(), Error> {
        let request = self
            .http
            .post(self.url("wifi-connect")?)
            .form(&[("ssid", ssid), ("password", password)]);
        let reply = self.send(request).await?;
        interpret::wifi_connect(reply.status, &reply.body)
    }

    /// Current Wi-Fi connection status string.
    ///
    /// `GET /wifi-status`
    #[instrument(skip(self), fields(url = %self.options.base_url))]
    pub async fn get_wifi_status(&self) -> Result<String, Error> {
        let reply = self.send(self.http.get(self.url("wifi-status")?)).await?;
        interpret::wifi_status(reply.status, &reply.body)
    }

    /// Turn the device's transparent HTTP proxy on or off.
    ///
    /// `POST /proxy-control` (form: `enable`). Returns the device message,
    /// `proxy-enabled` or `proxy-disabled`.
    #[instrument(skip(self))]
    pub async fn set_transparent_wifi_proxy(&self, enable: bool) -> Result<String, Error> {
        let flag = if enable { "true" } else { "false" };
        let request = self
            .http
            .post(self.url("proxy-control")?)
            .form(&[("enable", flag)]);
        let reply = self.send(request).await?;
        interpret::proxy_control(reply.status, &reply.body)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.options.base_url.join(path)?)
    }

    async fn send_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &(impl Serialize + Sync),
    ) -> Result<Reply, Error> {
        let request = self.http.request(method, self.url(path)?).json(body);
        self.send(request).await
    }

    /// Execute a request. Transport failures surface as `Error::Transport`
    /// before any status is looked at.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Reply, Error> {
        let request = request.build()?;
        debug!("{} {}", request.method(), request.url());

        let resp = self.http.execute(request).await?;
        let status = resp.status().as_u16();
        let text = resp.text().await?;
        trace!(status, body = %text, "device replied");

        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(Reply { status, body })
    }
}
