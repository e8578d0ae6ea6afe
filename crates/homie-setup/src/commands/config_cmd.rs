//! Config subcommand handlers.

use std::fmt::Write;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, SetDeviceArgs};
use crate::config::{self, AnswerStore, Config, DeviceProfile};
use crate::error::CliError;
use crate::output;

use super::generate::ANSWERS_KEY;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Show => {
            let cfg = config::load_config()?;
            output::print_output(&format_config(&cfg), global.quiet);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::SetDevice(args) => set_device(&args, global),

        ConfigCommand::RemoveDevice { name } => {
            let mut cfg = config::load_config()?;
            if cfg.devices.remove(&name).is_none() {
                return Err(profile_not_found(&cfg, name));
            }
            if cfg.default_device.as_deref() == Some(name.as_str()) {
                cfg.default_device = None;
            }
            config::save_config(&cfg)?;
            output::print_status(&format!("Removed device profile '{name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config()?;
            if !cfg.devices.contains_key(&name) {
                return Err(profile_not_found(&cfg, name));
            }
            cfg.default_device = Some(name.clone());
            config::save_config(&cfg)?;
            output::print_status(&format!("Default device is now '{name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::ClearAnswers => {
            let mut store = AnswerStore::open(config::answers_path())?;
            store.remove(ANSWERS_KEY)?;
            output::print_status("Forgot previous wizard answers", global.quiet);
            Ok(())
        }
    }
}

fn set_device(args: &SetDeviceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let url = global.url.clone().ok_or_else(|| CliError::Validation {
        field: "url".into(),
        reason: "set-device needs the device address: homie-setup --url <address> config set-device <name>".into(),
    })?;

    let profile = DeviceProfile {
        url,
        timeout_ms: global.timeout,
        user_agent: global.user_agent.clone(),
        proxy: global.proxy.clone(),
    };

    // Reject addresses the client could never use.
    config::profile_to_connection_options(&profile, &Config::default().defaults)?;

    let mut cfg = config::load_config()?;
    cfg.devices.insert(args.name.clone(), profile);
    if args.default || cfg.devices.len() == 1 {
        cfg.default_device = Some(args.name.clone());
    }
    config::save_config(&cfg)?;

    output::print_status(
        &format!(
            "Saved device profile '{}' to {}",
            args.name,
            config::config_path().display()
        ),
        global.quiet,
    );
    Ok(())
}

fn profile_not_found(cfg: &Config, name: String) -> CliError {
    CliError::ProfileNotFound {
        name,
        available: config::available_profiles(cfg),
    }
}

/// Effective settings as TOML-like text.
fn format_config(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_device {
        let _ = writeln!(out, "default_device = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "timeout_ms = {}", cfg.defaults.timeout_ms);
    let _ = writeln!(out, "user_agent = \"{}\"", cfg.defaults.user_agent);
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);

    for (name, p) in &cfg.devices {
        let _ = writeln!(out);
        let _ = writeln!(out, "[devices.{name}]");
        let _ = writeln!(out, "url = \"{}\"", p.url);
        if let Some(timeout) = p.timeout_ms {
            let _ = writeln!(out, "timeout_ms = {timeout}");
        }
        if let Some(ref ua) = p.user_agent {
            let _ = writeln!(out, "user_agent = \"{ua}\"");
        }
        if let Some(ref proxy) = p.proxy {
            let _ = writeln!(out, "proxy = \"{proxy}\"");
        }
    }

    out.trim_end().to_owned()
}
