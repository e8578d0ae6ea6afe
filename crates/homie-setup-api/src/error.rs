use thiserror::Error;

/// Boxed error returned by the network-inspection collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for the `homie-setup-api` crate.
///
/// Device-reported conditions (scan not ready, rejected payload, already
/// configured) are ordinary variants, not panics. `Transport` is reserved
/// for requests that never produced an HTTP status; `UnexpectedStatus` is
/// for statuses the endpoint has no specific meaning for.
#[derive(Debug, Error)]
pub enum Error {
    // ── Caller input ────────────────────────────────────────────────
    /// A required generator argument is missing or empty.
    #[error("{message}")]
    Validation { message: String },

    /// The base URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL uses a scheme other than plain HTTP.
    #[error("Unsupported URL scheme '{scheme}': devices only speak plain HTTP")]
    UnsupportedScheme { scheme: String },

    // ── Device-reported ─────────────────────────────────────────────
    /// Device answered `/heart` with 404: wrong device or protocol version.
    #[error("Detected wrong heartbeat")]
    HeartbeatMismatch,

    /// The initial Wi-Fi scan has not completed yet.
    #[error("Wi-Fi scan not ready: {message}")]
    ScanNotReady { message: String },

    /// Device rejected a configuration or Wi-Fi credential payload.
    #[error("Device rejected payload: {message}")]
    InvalidConfig { message: String },

    /// Device already holds a valid configuration and awaits reboot.
    #[error("Device already configured: {message}")]
    AlreadyConfigured { message: String },

    /// Any status the endpoint does not assign a specific meaning to.
    #[error("Unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16 },

    // ── Transport ───────────────────────────────────────────────────
    /// The request never completed (timeout, connection refused, DNS failure).
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // ── Data ────────────────────────────────────────────────────────
    /// A correctly shaped success body could not be decoded into its typed form.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Collaborators ───────────────────────────────────────────────
    /// The current SSID could not be detected on the host.
    #[error("Could not detect current Wi-Fi SSID: {0}")]
    SsidDetection(#[source] BoxError),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Returns `true` if retrying the same call later may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::ScanNotReady { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if the request timed out before the device answered.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// The HTTP status observed, if the device answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HeartbeatMismatch => Some(404),
            Self::ScanNotReady { .. } => Some(503),
            Self::InvalidConfig { .. } => Some(400),
            Self::AlreadyConfigured { .. } => Some(403),
            Self::UnexpectedStatus { status } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
