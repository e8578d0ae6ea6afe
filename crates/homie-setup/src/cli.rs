//! Clap derive structures for the `homie-setup` CLI.
//!
//! Only depends on clap and clap_complete so `build.rs` can include it
//! for man page generation.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// homie-setup -- configure Homie devices from the command line
#[derive(Debug, Parser)]
#[command(
    name = "homie-setup",
    version,
    about = "Configure Homie devices in configuration mode",
    long_about = "Talks to a Homie device that is running its configuration access point.\n\n\
        Join the device's Wi-Fi network (Homie-xxxxxxxx), then check it with\n\
        `homie-setup heartbeat` and configure it with `homie-setup wizard`.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device profile to use
    #[arg(long, short = 'd', env = "HOMIE_SETUP_DEVICE", global = true)]
    pub device: Option<String>,

    /// Device address, e.g. 192.168.123.1 (overrides profile)
    #[arg(long, short = 'u', env = "HOMIE_SETUP_URL", global = true)]
    pub url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// User-Agent header sent to the device
    #[arg(long, global = true)]
    pub user_agent: Option<String>,

    /// Route device requests through an HTTP proxy
    #[arg(long, env = "HOMIE_SETUP_PROXY", global = true)]
    pub proxy: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check that the address answers like a Homie device in config mode
    #[command(alias = "heart")]
    Heartbeat,

    /// Show the device descriptor (id, firmware, nodes)
    Info,

    /// List Wi-Fi networks the device can see
    #[command(alias = "net")]
    Networks(NetworksArgs),

    /// Show the device's Wi-Fi connection status
    WifiStatus,

    /// Ask the device to join a Wi-Fi network without leaving config mode
    WifiConnect(WifiConnectArgs),

    /// Turn the device's transparent HTTP proxy on or off
    Proxy(ProxyArgs),

    /// Build a configuration document from flags
    #[command(alias = "gen")]
    Generate(GenerateArgs),

    /// Send a configuration document to the device
    Push(PushArgs),

    /// Interactive setup: scan, ask, generate and push
    Wizard(WizardArgs),

    /// Manage CLI configuration and device profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Networks ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NetworksArgs {
    /// Keep retrying while the device's initial scan is running (seconds)
    #[arg(long, value_name = "SECS")]
    pub wait: Option<u64>,
}

// ── Wi-Fi ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WifiConnectArgs {
    /// Network name
    pub ssid: String,

    /// Network password (prompted when omitted)
    #[arg(long, env = "HOMIE_SETUP_WIFI_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Poll the status until connected or failed (seconds)
    #[arg(long, value_name = "SECS")]
    pub wait: Option<u64>,
}

// ── Proxy ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProxyArgs {
    pub state: ProxyState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ProxyState {
    On,
    Off,
}

// ── Generate / Push ──────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Friendly device name
    #[arg(long)]
    pub name: Option<String>,

    /// Device id (default: Homie- plus a random token)
    #[arg(long)]
    pub device_id: Option<String>,

    /// Wi-Fi network (default: the network this host is on)
    #[arg(long)]
    pub ssid: Option<String>,

    /// Wi-Fi password
    #[arg(long, env = "HOMIE_SETUP_WIFI_PASSWORD", hide_env_values = true)]
    pub wifi_password: Option<String>,

    /// MQTT broker host
    #[arg(long)]
    pub mqtt_host: Option<String>,

    #[command(flatten)]
    pub mqtt: MqttArgs,

    #[command(flatten)]
    pub ota: OtaArgs,

    /// Write the document to a file instead of stdout
    #[arg(long, short = 'O', value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Remember the document as the wizard's previous answers
    #[arg(long)]
    pub remember: bool,
}

#[derive(Debug, Args)]
pub struct MqttArgs {
    /// MQTT broker port [default: 1883]
    #[arg(long)]
    pub mqtt_port: Option<u16>,

    /// Resolve the broker through this mDNS service name
    #[arg(long)]
    pub mqtt_mdns: Option<String>,

    /// MQTT base topic [default: devices/]
    #[arg(long)]
    pub base_topic: Option<String>,

    /// Broker requires authentication
    #[arg(long)]
    pub mqtt_auth: bool,

    /// MQTT username
    #[arg(long)]
    pub mqtt_username: Option<String>,

    /// MQTT password
    #[arg(long, env = "HOMIE_SETUP_MQTT_PASSWORD", hide_env_values = true)]
    pub mqtt_password: Option<String>,

    /// Connect to the broker over TLS
    #[arg(long)]
    pub mqtt_ssl: bool,

    /// Broker certificate fingerprint
    #[arg(long)]
    pub mqtt_fingerprint: Option<String>,
}

#[derive(Debug, Args)]
pub struct OtaArgs {
    /// Enable over-the-air updates
    #[arg(long)]
    pub ota: bool,

    /// OTA server host [default: MQTT host]
    #[arg(long)]
    pub ota_host: Option<String>,

    /// OTA server port [default: 80]
    #[arg(long)]
    pub ota_port: Option<u16>,

    /// Resolve the OTA server through this mDNS service name
    #[arg(long)]
    pub ota_mdns: Option<String>,

    /// OTA request path [default: /ota]
    #[arg(long)]
    pub ota_path: Option<String>,

    /// Fetch updates over TLS
    #[arg(long)]
    pub ota_ssl: bool,

    /// OTA server certificate fingerprint
    #[arg(long)]
    pub ota_fingerprint: Option<String>,
}

#[derive(Debug, Args)]
pub struct PushArgs {
    /// Configuration document (JSON); `-` reads stdin
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct WizardArgs {
    /// Push the result without asking
    #[arg(long)]
    pub push: bool,

    /// Only generate and remember the document, never push
    #[arg(long, conflicts_with = "push")]
    pub no_push: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Add or update a device profile
    SetDevice(SetDeviceArgs),

    /// Remove a device profile
    RemoveDevice {
        /// Profile name
        name: String,
    },

    /// Set the default device profile
    Use {
        /// Profile name
        name: String,
    },

    /// Forget the wizard's remembered answers
    ClearAnswers,
}

/// The profile takes its address, timeout and proxy from the global
/// `--url`, `--timeout` and `--proxy` flags.
#[derive(Debug, Args)]
pub struct SetDeviceArgs {
    /// Profile name
    pub name: String,

    /// Make this the default profile
    #[arg(long)]
    pub default: bool,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
