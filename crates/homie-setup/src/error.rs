//! CLI error types with miette diagnostics.
//!
//! Maps `homie_setup_api::Error` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use homie_setup_api::Error as ApiError;
use homie_setup_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const PROTOCOL: i32 = 3;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const NOT_READY: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to device at {url}")]
    #[diagnostic(
        code(homie::connection_failed),
        help(
            "Join the device's access point (Homie-xxxxxxxx) and try again.\n\
             In config mode the device usually answers on 192.168.123.1.\n\
             Try: homie-setup --url 192.168.123.1 heartbeat"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(homie::timeout),
        help("Increase the timeout with --timeout <ms> or move closer to the device.")
    )]
    Timeout { url: String },

    // ── Device ───────────────────────────────────────────────────────
    #[error("The host does not answer like a Homie device in config mode")]
    #[diagnostic(
        code(homie::heartbeat_mismatch),
        help("Check the address, and that the device runs a compatible Homie firmware.")
    )]
    HeartbeatMismatch,

    #[error("The device has not finished its Wi-Fi scan: {message}")]
    #[diagnostic(
        code(homie::scan_not_ready),
        help("Retry in a few seconds, or pass --wait <secs> to keep trying.")
    )]
    ScanNotReady { message: String },

    #[error("The device rejected the request: {message}")]
    #[diagnostic(code(homie::rejected))]
    Rejected { message: String },

    #[error("The device is already configured: {message}")]
    #[diagnostic(
        code(homie::already_configured),
        help("The device reboots into normal mode once configured. Reset it to reconfigure.")
    )]
    AlreadyConfigured { message: String },

    #[error("Device answered with unexpected status {status}")]
    #[diagnostic(code(homie::unexpected_status))]
    UnexpectedStatus { status: u16 },

    #[error("Could not decode device response: {message}")]
    #[diagnostic(code(homie::decode))]
    Decode { message: String },

    #[error("Wi-Fi connection to '{ssid}' failed: {status}")]
    #[diagnostic(
        code(homie::wifi_failed),
        help("Check the password, and that the network is in range of the device.")
    )]
    WifiFailed { ssid: String, status: String },

    #[error("Gave up waiting for {what} after {seconds}s")]
    #[diagnostic(code(homie::wait_expired))]
    WaitExpired { what: String, seconds: u64 },

    // ── Host ─────────────────────────────────────────────────────────
    #[error("Could not detect the current Wi-Fi network")]
    #[diagnostic(
        code(homie::ssid_detection),
        help("Pass the network name explicitly with --ssid.")
    )]
    SsidDetection {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(homie::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Device profile '{name}' not found in configuration")]
    #[diagnostic(
        code(homie::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: homie-setup --url <address> config set-device {name}"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(homie::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(homie::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    #[error("Cancelled")]
    #[diagnostic(code(homie::cancelled))]
    Cancelled,

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    #[diagnostic(code(homie::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } | Self::WaitExpired { .. } => exit_code::TIMEOUT,
            Self::HeartbeatMismatch | Self::UnexpectedStatus { .. } | Self::Decode { .. } => {
                exit_code::PROTOCOL
            }
            Self::ScanNotReady { .. } => exit_code::NOT_READY,
            Self::Rejected { .. } | Self::AlreadyConfigured { .. } | Self::WifiFailed { .. } => {
                exit_code::REJECTED
            }
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ApiError → CliError mapping ──────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Validation { message } => CliError::Validation {
                field: "configuration".into(),
                reason: message,
            },

            ApiError::InvalidUrl(e) => CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },

            ApiError::UnsupportedScheme { scheme } => CliError::Validation {
                field: "url".into(),
                reason: format!("scheme '{scheme}' is not supported, devices only speak http"),
            },

            ApiError::HeartbeatMismatch => CliError::HeartbeatMismatch,

            ApiError::ScanNotReady { message } => CliError::ScanNotReady { message },

            ApiError::InvalidConfig { message } => CliError::Rejected { message },

            ApiError::AlreadyConfigured { message } => CliError::AlreadyConfigured { message },

            ApiError::UnexpectedStatus { status } => CliError::UnexpectedStatus { status },

            ApiError::Transport(e) => {
                let url = e.url().map_or_else(|| "(unknown)".into(), ToString::to_string);
                if e.is_timeout() {
                    CliError::Timeout { url }
                } else {
                    CliError::ConnectionFailed {
                        url,
                        source: Box::new(e),
                    }
                }
            }

            ApiError::Deserialization { message, .. } => CliError::Decode { message },

            ApiError::SsidDetection(source) => CliError::SsidDetection { source },
        }
    }
}
