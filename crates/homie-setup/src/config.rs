//! Connection option resolution for the CLI.
//!
//! Layers, highest first: command-line flags (and their env vars), the
//! selected device profile, `[defaults]`, built-in defaults. A device with no
//! address anywhere is looked for at the host's default gateway, then at
//! `homie.local`.

use std::time::Duration;

use clap::ValueEnum;

use homie_setup_api::ConnectionOptions;
use homie_setup_api::transport::DEFAULT_URL;
pub use homie_setup_config::{
    AnswerStore, Config, DeviceProfile, answers_path, config_path, load_config,
    load_config_or_default, profile_to_connection_options, save_config,
};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::inspect;

/// Profile selected by `--device`, else `default_device`.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> Option<String> {
    global
        .device
        .clone()
        .or_else(|| cfg.default_device.clone())
}

/// Output format: `--output`, else `[defaults] output`, else table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or_else(|_| {
            tracing::warn!(output = %cfg.defaults.output, "unknown default output format");
            OutputFormat::Table
        })
    })
}

/// Build `ConnectionOptions` from flags, profile and defaults.
///
/// `fallback_url` is consulted only when neither `--url` nor a profile
/// gives an address.
pub fn resolve_options(
    global: &GlobalOpts,
    cfg: &Config,
    fallback_url: impl FnOnce() -> String,
) -> Result<ConnectionOptions, CliError> {
    let profile = selected_profile(global, cfg)?;

    let mut options = match (global.url.as_deref(), profile) {
        (Some(url), _) => ConnectionOptions::new(url)?
            .with_timeout(Duration::from_millis(cfg.defaults.timeout_ms))
            .with_user_agent(cfg.defaults.user_agent.clone()),
        (None, Some(profile)) => {
            profile_to_connection_options(profile, &cfg.defaults)?
        }
        (None, None) => ConnectionOptions::new(&fallback_url())?
            .with_timeout(Duration::from_millis(cfg.defaults.timeout_ms))
            .with_user_agent(cfg.defaults.user_agent.clone()),
    };

    // With an explicit --url the profile still supplies timeout and proxy.
    if let (Some(_), Some(profile)) = (global.url.as_deref(), profile) {
        if let Some(ms) = profile.timeout_ms {
            options = options.with_timeout(Duration::from_millis(ms));
        }
        if let Some(ref ua) = profile.user_agent {
            options = options.with_user_agent(ua.clone());
        }
        if let Some(ref proxy) = profile.proxy {
            options = options.with_proxy(proxy.clone());
        }
    }

    if let Some(ms) = global.timeout {
        options = options.with_timeout(Duration::from_millis(ms));
    }
    if let Some(ref ua) = global.user_agent {
        options = options.with_user_agent(ua.clone());
    }
    if let Some(ref proxy) = global.proxy {
        options = options.with_proxy(proxy.clone());
    }

    tracing::debug!(url = %options.base_url, timeout = ?options.timeout, "connection options");
    Ok(options)
}

/// The default gateway when the host has one, else `homie.local`.
pub fn gateway_or_default() -> String {
    inspect::default_gateway().map_or_else(|| DEFAULT_URL.to_owned(), |ip| ip.to_string())
}

fn selected_profile<'a>(
    global: &GlobalOpts,
    cfg: &'a Config,
) -> Result<Option<&'a DeviceProfile>, CliError> {
    let Some(name) = active_profile_name(global, cfg) else {
        return Ok(None);
    };
    match cfg.devices.get(&name) {
        Some(profile) => Ok(Some(profile)),
        // Only an explicitly requested profile has to exist.
        None if global.device.is_some() => Err(CliError::ProfileNotFound {
            available: available_profiles(cfg),
            name,
        }),
        None => Ok(None),
    }
}

/// Profile names for error help text.
pub fn available_profiles(cfg: &Config) -> String {
    if cfg.devices.is_empty() {
        "(none)".into()
    } else {
        cfg.devices.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["homie-setup"];
        argv.extend_from_slice(args);
        argv.push("heartbeat");
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_kitchen() -> Config {
        let mut cfg = Config::default();
        cfg.devices.insert(
            "kitchen".into(),
            DeviceProfile {
                url: "10.0.0.7".into(),
                timeout_ms: Some(5000),
                user_agent: None,
                proxy: Some("http://proxy:3128".into()),
            },
        );
        cfg
    }

    fn unused_fallback() -> String {
        panic!("fallback must not be consulted")
    }

    #[test]
    fn url_flag_wins() {
        let cfg = config_with_kitchen();
        let g = global(&["--device", "kitchen", "--url", "192.168.123.1", "--timeout", "300"]);
        let options = resolve_options(&g, &cfg, unused_fallback).unwrap();

        assert_eq!(options.base_url.as_str(), "http://192.168.123.1/");
        assert_eq!(options.timeout, Duration::from_millis(300));
        assert_eq!(options.proxy.as_deref(), Some("http://proxy:3128"));
    }

    #[test]
    fn profile_supplies_address() {
        let cfg = config_with_kitchen();
        let g = global(&["-d", "kitchen"]);
        let options = resolve_options(&g, &cfg, unused_fallback).unwrap();

        assert_eq!(options.base_url.as_str(), "http://10.0.0.7/");
        assert_eq!(options.timeout, Duration::from_millis(5000));
    }

    #[test]
    fn unknown_explicit_profile_is_an_error() {
        let cfg = config_with_kitchen();
        let g = global(&["-d", "garage"]);
        let err = resolve_options(&g, &cfg, unused_fallback).unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { ref available, .. } if available == "kitchen"));
    }

    #[test]
    fn missing_default_profile_falls_back() {
        let cfg = Config::default();
        let g = global(&[]);
        let options = resolve_options(&g, &cfg, || "192.168.123.1".into()).unwrap();

        assert_eq!(options.base_url.as_str(), "http://192.168.123.1/");
        assert_eq!(options.timeout, Duration::from_millis(2000));
    }

    #[test]
    fn output_flag_overrides_default() {
        let mut cfg = Config::default();
        cfg.defaults.output = "yaml".into();
        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Yaml);
        assert_eq!(output_format(&global(&["-o", "json"]), &cfg), OutputFormat::Json);
    }
}
