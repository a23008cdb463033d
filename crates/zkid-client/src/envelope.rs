//! Response envelope handling shared by both services.
//!
//! Services answer either with the payload itself or with
//! `{ "status": ..., "data": ..., "message": ... }`. A status of `"success"`,
//! `"ok"`, `true` or a 2xx number is a success; anything else, or a missing
//! `data`, is an upstream failure carrying `message`.

use serde_json::Value;

use crate::error::FetchError;

/// Read a response: reject non-2xx, parse JSON, strip the envelope.
pub(crate) async fn read_payload(endpoint: &str, resp: reqwest::Response) -> Result<Value, FetchError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read response body: {e}>"));
        return Err(FetchError::Upstream {
            endpoint: endpoint.to_string(),
            status: Some(status.as_u16()),
            message: body,
        });
    }
    let body = resp.text().await.map_err(|e| FetchError::Http {
        endpoint: endpoint.to_string(),
        source: e,
    })?;
    let value: Value = serde_json::from_str(&body).map_err(|e| FetchError::Deserialization {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
    })?;
    unwrap_envelope(endpoint, value)
}

pub(crate) fn unwrap_envelope(endpoint: &str, value: Value) -> Result<Value, FetchError> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };
    let Some(status) = map.get("status") else {
        return Ok(Value::Object(map));
    };
    if !map.contains_key("data") && !map.contains_key("message") {
        return Ok(Value::Object(map));
    }

    let ok = match status {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "success" | "ok"),
        Value::Number(n) => n.as_u64().is_some_and(|n| (200..300).contains(&n)),
        _ => false,
    };
    let message = map
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("no message")
        .to_string();
    let upstream = |message: String| FetchError::Upstream {
        endpoint: endpoint.to_string(),
        status: None,
        message,
    };
    if !ok {
        return Err(upstream(message));
    }
    match map.remove("data") {
        Some(Value::Null) | None => Err(upstream(format!("response carries no data ({message})"))),
        Some(data) => Ok(data),
    }
}
