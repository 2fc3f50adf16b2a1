//! Transport core
//!
//! Executes exactly one HTTP request per call and maps the platform's
//! success marker to a typed result. Retry policy is a caller concern; this
//! layer never retries. Each call builds and drops its own client, trading
//! connection reuse for failure isolation.

use crate::types::{HttpMethod, RequestDescriptor};
use crate::{Error, Result};
use serde_json::Value;
use std::time::Duration;

/// How a platform marks a successful response body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessMarker {
    /// Numeric `code` field equal to zero, payload under `data`,
    /// failure message under `message`
    CodeField,
    /// Absence of an `errors` field, payload under `data`
    ErrorsField,
}

impl SuccessMarker {
    /// Apply the marker to a parsed response body, returning the payload
    pub fn evaluate(self, body: Value) -> Result<Value> {
        match self {
            Self::CodeField => {
                if body["code"].as_i64() == Some(0) {
                    Ok(body.get("data").cloned().unwrap_or(Value::Null))
                } else {
                    let message = body["message"].as_str().unwrap_or("unknown error");
                    Err(Error::api(message))
                }
            }
            Self::ErrorsField => match body.get("errors") {
                Some(errors) if !errors.is_null() => Err(Error::api(errors.to_string())),
                _ => Ok(body.get("data").cloned().unwrap_or(Value::Null)),
            },
        }
    }
}

/// One-shot request executor for a platform API
#[derive(Debug, Clone)]
pub struct ApiTransport {
    /// Success marker policy of the platform
    marker: SuccessMarker,
    /// Per-request timeout
    timeout: Duration,
}

impl ApiTransport {
    /// Create a transport with the platform's success marker and timeout
    pub fn new(marker: SuccessMarker, timeout: Duration) -> Self {
        Self { marker, timeout }
    }

    /// Execute a request and return the platform payload
    ///
    /// The response body is parsed as JSON and checked against the success
    /// marker; a platform-reported failure becomes [`Error::Api`], network
    /// failures become [`Error::Transport`].
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Value> {
        let response = self.send(descriptor).await?;
        let body: Value = response.json().await?;
        self.marker.evaluate(body)
    }

    /// Execute a request and return the raw text body
    ///
    /// Used for watch pages and playlist bodies, which are not JSON; no
    /// success marker is applied.
    pub async fn execute_raw(&self, descriptor: &RequestDescriptor) -> Result<String> {
        let response = self.send(descriptor).await?;
        Ok(response.text().await?)
    }

    async fn send(&self, descriptor: &RequestDescriptor) -> Result<reqwest::Response> {
        // One client per request; connections are intentionally not pooled
        // across calls.
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;

        let mut request = match descriptor.method {
            HttpMethod::Get => client.get(&descriptor.url),
            HttpMethod::Post => client.post(&descriptor.url),
        };

        if !descriptor.params.is_empty() {
            request = request.query(&descriptor.params);
        }
        for (name, value) in &descriptor.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_code_field_success() {
        let body = json!({"code": 0, "data": {"isLogin": true}});
        let payload = SuccessMarker::CodeField.evaluate(body).unwrap();
        assert_eq!(payload["isLogin"], true);
    }

    #[test]
    fn test_code_field_failure_carries_message() {
        let body = json!({"code": -101, "message": "账号未登录"});
        let err = SuccessMarker::CodeField.evaluate(body).unwrap_err();
        assert!(matches!(err, Error::Api { .. }));
        assert!(err.to_string().contains("账号未登录"));
    }

    #[test]
    fn test_code_field_missing_code_is_failure() {
        let body = json!({"data": {}});
        assert!(SuccessMarker::CodeField.evaluate(body).is_err());
    }

    #[test]
    fn test_errors_field_success() {
        let body = json!({"data": {"visionCommentList": {}}});
        let payload = SuccessMarker::ErrorsField.evaluate(body).unwrap();
        assert!(payload.get("visionCommentList").is_some());
    }

    #[test]
    fn test_errors_field_failure() {
        let body = json!({"errors": [{"message": "rate limited"}]});
        let err = SuccessMarker::ErrorsField.evaluate(body).unwrap_err();
        assert!(err.to_string().contains("rate limited"));
    }

    #[test]
    fn test_missing_data_maps_to_null() {
        let body = json!({"code": 0});
        let payload = SuccessMarker::CodeField.evaluate(body).unwrap();
        assert!(payload.is_null());
    }
}
