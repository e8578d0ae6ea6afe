// Connection options and reqwest client construction.
//
// Built once per `DeviceClient` and never mutated afterwards; every request
// shares the same timeout, user agent and optional proxy.

use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use url::Url;

use crate::error::Error;

/// Default device address when none is given.
pub const DEFAULT_URL: &str = "homie.local";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = concat!("homie-setup/", env!("CARGO_PKG_VERSION"));

/// Immutable per-client connection settings.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
    /// Upstream HTTP proxy for outbound requests.
    pub proxy: Option<String>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            base_url: Url::parse(&format!("http://{DEFAULT_URL}/"))
                .expect("default device URL is valid"),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.into(),
            proxy: None,
        }
    }
}

impl ConnectionOptions {
    /// Options for the device at `url` with default timeout and user agent.
    ///
    /// A bare host or `host:port` is prefixed with `http://`.
    pub fn new(url: &str) -> Result<Self, Error> {
        Ok(Self {
            base_url: normalize_base_url(url)?,
            ..Self::default()
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Build a `reqwest::Client` from these options.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .default_headers(headers);

        if let Some(ref proxy) = self.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
        }

        Ok(builder.build()?)
    }
}

/// Normalize a user-supplied device address into an `http://` base URL.
///
/// The path always ends in `/` so endpoints resolve beneath it.
pub fn normalize_base_url(raw: &str) -> Result<Url, Error> {
    let trimmed = raw.trim();
    let with_scheme = match trimmed.split_once("://") {
        Some((scheme, _)) if scheme.eq_ignore_ascii_case("http") => trimmed.to_owned(),
        Some((scheme, _)) => {
            return Err(Error::UnsupportedScheme {
                scheme: scheme.to_owned(),
            });
        }
        None => format!("http://{trimmed}"),
    };
    let mut url = Url::parse(&with_scheme)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
