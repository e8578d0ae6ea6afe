// Response interpretation
//
// One function per device endpoint mapping `(status, body)` to a value or
// a typed error. A body counts only when it is a JSON object carrying the
// expected keys; a matching status on its own is never enough, so a 200
// with the wrong shape falls through to `UnexpectedStatus(200)`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Error;
use crate::models::{DeviceInfo, NetworkEntry, NetworkList};

fn has(body: &Value, key: &str) -> bool {
    body.as_object().is_some_and(|obj| obj.contains_key(key))
}

fn has_all(body: &Value, keys: &[&str]) -> bool {
    keys.iter().all(|key| has(body, key))
}

/// The `error` field as text; non-string payloads are rendered as JSON.
fn error_message(body: &Value) -> String {
    match body.get("error") {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn decode<T: DeserializeOwned>(body: &Value) -> Result<T, Error> {
    T::deserialize(body).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: body.to_string(),
    })
}

/// `GET /heart`: 200 `{"heart":"beat"}`, 404 means a foreign device.
pub fn heartbeat(status: u16, body: &Value) -> Result<bool, Error> {
    match status {
        200 if body.get("heart").and_then(Value::as_str) == Some("beat") => Ok(true),
        404 => Err(Error::HeartbeatMismatch),
        _ => Err(Error::UnexpectedStatus { status }),
    }
}

/// `GET /device-info`: 200 with a non-empty object.
pub fn device_info(status: u16, body: &Value) -> Result<DeviceInfo, Error> {
    match body.as_object() {
        Some(obj) if status == 200 && !obj.is_empty() => decode(body),
        _ => Err(Error::UnexpectedStatus { status }),
    }
}

/// `GET /networks`: 200 with `networks`, or 503 while the first scan runs.
pub fn networks(status: u16, body: &Value) -> Result<Vec<NetworkEntry>, Error> {
    match status {
        200 if has(body, "networks") => decode::<NetworkList>(body).map(|list| list.networks),
        503 if has(body, "error") => Err(Error::ScanNotReady {
            message: error_message(body),
        }),
        _ => Err(Error::UnexpectedStatus { status }),
    }
}

/// `PUT /config`: 400 is a malformed payload, 403 an already configured device.
pub fn save_config(status: u16, body: &Value) -> Result<(), Error> {
    match status {
        200 if has(body, "success") => Ok(()),
        400 if has_all(body, &["success", "error"]) => Err(Error::InvalidConfig {
            message: error_message(body),
        }),
        403 if has_all(body, &["success", "error"]) => Err(Error::AlreadyConfigured {
            message: error_message(body),
        }),
        _ => Err(Error::UnexpectedStatus { status }),
    }
}

/// `POST /wifi-connect`: accepted with 200 or 202.
pub fn wifi_connect(status: u16, body: &Value) -> Result<(), Error> {
    match status {
        200 | 202 if has(body, "success") => Ok(()),
        400 if has_all(body, &["success", "error"]) => Err(Error::InvalidConfig {
            message: error_message(body),
        }),
        _ => Err(Error::UnexpectedStatus { status }),
    }
}

/// `GET /wifi-status`: the raw status string.
pub fn wifi_status(status: u16, body: &Value) -> Result<String, Error> {
    text_field(status, body, "status")
}

/// `POST /proxy-control`: the `message` string (`proxy-enabled` / `proxy-disabled`).
pub fn proxy_control(status: u16, body: &Value) -> Result<String, Error> {
    text_field(status, body, "message")
}

fn text_field(status: u16, body: &Value, key: &str) -> Result<String, Error> {
    match body.get(key) {
        Some(value) if status == 200 && body.is_object() => Ok(match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }),
        _ => Err(Error::UnexpectedStatus { status }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use serde_json::json;

    use super::*;
    use crate::models::Encryption;

    fn unexpected(result: Result<impl std::fmt::Debug, Error>) -> u16 {
        match result {
            Err(Error::UnexpectedStatus { status }) => status,
            other => panic!("expected UnexpectedStatus, got: {other:?}"),
        }
    }

    #[test]
    fn heartbeat_beat() {
        assert!(heartbeat(200, &json!({ "heart": "beat" })).unwrap());
    }

    #[test]
    fn heartbeat_404_is_mismatch() {
        assert!(matches!(
            heartbeat(404, &Value::Null),
            Err(Error::HeartbeatMismatch)
        ));
    }

    #[test]
    fn heartbeat_wrong_shape_is_unexpected_status() {
        assert_eq!(unexpected(heartbeat(200, &json!({}))), 200);
        assert_eq!(unexpected(heartbeat(200, &json!({ "heart": "stop" }))), 200);
        assert_eq!(unexpected(heartbeat(500, &json!({ "heart": "beat" }))), 500);
    }

    #[test]
    fn device_info_requires_non_empty_object() {
        assert_eq!(unexpected(device_info(200, &json!({}))), 200);
        assert_eq!(unexpected(device_info(200, &json!("text"))), 200);
        assert_eq!(unexpected(device_info(500, &json!({ "device_id": "x" }))), 500);

        let info = device_info(200, &json!({ "device_id": "52a8fa5d" })).unwrap();
        assert_eq!(info.device_id, "52a8fa5d");
    }

    #[test]
    fn networks_list_and_scan_not_ready() {
        let list = networks(
            200,
            &json!({ "networks": [{ "ssid": "Network_1", "rssi": -57, "encryption": "wpa" }] }),
        )
        .unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].encryption, Encryption::Wpa);

        match networks(503, &json!({ "error": "Initial Wi-Fi scan not finished yet" })) {
            Err(Error::ScanNotReady { message }) => {
                assert_eq!(message, "Initial Wi-Fi scan not finished yet");
            }
            other => panic!("expected ScanNotReady, got: {other:?}"),
        }

        assert_eq!(unexpected(networks(503, &json!({}))), 503);
        assert_eq!(unexpected(networks(200, &json!({ "error": "x" }))), 200);
    }

    #[test]
    fn networks_with_bad_entries_is_deserialization_error() {
        let result = networks(200, &json!({ "networks": "nope" }));
        assert!(matches!(result, Err(Error::Deserialization { .. })));
    }

    #[test]
    fn save_config_outcomes() {
        save_config(200, &json!({ "success": true })).unwrap();

        match save_config(400, &json!({ "success": false, "error": "bad mqtt" })) {
            Err(Error::InvalidConfig { message }) => assert_eq!(message, "bad mqtt"),
            other => panic!("expected InvalidConfig, got: {other:?}"),
        }
        match save_config(
            403,
            &json!({ "success": false, "error": "Device already configured" }),
        ) {
            Err(Error::AlreadyConfigured { message }) => {
                assert_eq!(message, "Device already configured");
            }
            other => panic!("expected AlreadyConfigured, got: {other:?}"),
        }

        // 403 without the error envelope has no specific meaning
        assert_eq!(unexpected(save_config(403, &json!({ "success": false }))), 403);
        assert_eq!(unexpected(save_config(200, &json!({}))), 200);
    }

    #[test]
    fn wifi_connect_accepts_200_and_202() {
        wifi_connect(200, &json!({ "success": true })).unwrap();
        wifi_connect(202, &json!({ "success": true })).unwrap();

        assert!(matches!(
            wifi_connect(400, &json!({ "success": false, "error": "ssid missing" })),
            Err(Error::InvalidConfig { .. })
        ));
        assert_eq!(unexpected(wifi_connect(403, &json!({ "success": false, "error": "x" }))), 403);
    }

    #[test]
    fn wifi_status_and_proxy_control_return_fields() {
        assert_eq!(wifi_status(200, &json!({ "status": "connected" })).unwrap(), "connected");
        assert_eq!(
            proxy_control(200, &json!({ "message": "proxy-enabled" })).unwrap(),
            "proxy-enabled"
        );
        assert_eq!(unexpected(wifi_status(200, &json!({}))), 200);
        assert_eq!(unexpected(proxy_control(500, &json!({ "message": "x" }))), 500);
    }
}
