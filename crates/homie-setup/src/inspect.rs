//! Host network inspection.
//!
//! Asks the operating system's own tools which Wi-Fi network the host is
//! on and what its default gateway is. When the host has joined a device's
//! configuration access point, the gateway is the device itself.

use std::net::IpAddr;
use std::process::Command;

use tracing::{debug, trace};

use homie_setup_api::{BoxError, SsidDetector};

/// `SsidDetector` backed by `iwgetid`, `nmcli` or `networksetup`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemNetwork;

impl SsidDetector for SystemNetwork {
    fn current_ssid(&self) -> Result<String, BoxError> {
        if let Some(ssid) = run("iwgetid", &["-r"]) {
            return Ok(ssid);
        }
        if let Some(ssid) =
            run("nmcli", &["-t", "-f", "active,ssid", "dev", "wifi"]).and_then(|o| parse_nmcli(&o))
        {
            return Ok(ssid);
        }
        if let Some(ssid) = run("networksetup", &["-getairportnetwork", "en0"])
            .and_then(|o| parse_airport(&o))
        {
            return Ok(ssid);
        }
        Err("no associated Wi-Fi network found (tried iwgetid, nmcli and networksetup)".into())
    }
}

/// The host's default gateway, if one can be determined.
pub fn default_gateway() -> Option<IpAddr> {
    let gateway = run("ip", &["route", "show", "default"])
        .and_then(|o| parse_ip_route(&o))
        .or_else(|| run("route", &["-n", "get", "default"]).and_then(|o| parse_bsd_route(&o)));
    debug!(?gateway, "default gateway");
    gateway
}

/// Run `program` and return its trimmed stdout when it succeeds with output.
fn run(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        trace!(program, status = ?output.status, "command failed");
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    trace!(program, %stdout, "command output");
    (!stdout.is_empty()).then_some(stdout)
}

/// `yes:My Network` line from `nmcli -t -f active,ssid dev wifi`.
/// nmcli's terse mode escapes `:` and `\` in values with a backslash.
fn parse_nmcli(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("yes:"))
        .map(|ssid| ssid.replace("\\:", ":").replace("\\\\", "\\"))
        .filter(|ssid| !ssid.is_empty())
}

/// `Current Wi-Fi Network: My Network` from macOS `networksetup`.
fn parse_airport(output: &str) -> Option<String> {
    let (label, ssid) = output.split_once(": ")?;
    if !label.contains("Network") {
        return None;
    }
    let ssid = ssid.trim();
    (!ssid.is_empty()).then(|| ssid.to_owned())
}

/// `default via 192.168.123.1 dev wlan0 ...` from iproute2.
fn parse_ip_route(output: &str) -> Option<IpAddr> {
    output.lines().find_map(|line| {
        let mut words = line.split_whitespace();
        words.find(|w| *w == "via")?;
        words.next()?.parse().ok()
    })
}

/// `gateway: 192.168.123.1` from BSD/macOS `route -n get default`.
fn parse_bsd_route(output: &str) -> Option<IpAddr> {
    output.lines().find_map(|line| {
        let (key, value) = line.trim().split_once(':')?;
        (key.trim() == "gateway")
            .then(|| value.trim().parse().ok())
            .flatten()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nmcli_picks_active_network() {
        let out = "no:Neighbour\nyes:Home\\: 2.4G\nno:Other";
        assert_eq!(parse_nmcli(out).as_deref(), Some("Home: 2.4G"));
        assert_eq!(parse_nmcli("no:Neighbour"), None);
    }

    #[test]
    fn airport_output() {
        assert_eq!(
            parse_airport("Current Wi-Fi Network: Homie-abc123").as_deref(),
            Some("Homie-abc123")
        );
        assert_eq!(parse_airport("You are not associated with an AirPort network."), None);
    }

    #[test]
    fn ip_route_gateway() {
        let out = "default via 192.168.123.1 dev wlp2s0 proto dhcp metric 600";
        assert_eq!(parse_ip_route(out), Some(IpAddr::from([192, 168, 123, 1])));
        assert_eq!(parse_ip_route("10.0.0.0/8 dev eth0"), None);
    }

    #[test]
    fn bsd_route_gateway() {
        let out = "   route to: default\ndestination: default\n    gateway: 192.168.123.1\n  interface: en0";
        assert_eq!(parse_bsd_route(out), Some(IpAddr::from([192, 168, 123, 1])));
    }
}
