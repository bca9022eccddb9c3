//! HTTP transport for backend calls.

use std::time::Duration;

use log::debug;
use outpost_logic::story::ServiceError;
use serde_json::Value;

use crate::config::ConfigError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Posts a JSON body and returns the parsed JSON response.
pub trait Transport: Send {
    fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<Value, ServiceError>;
}

/// Blocking `reqwest` transport. Must not be used from inside an async runtime.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ConfigError> {
        // Only the connect phase is bounded; generation may run arbitrarily long.
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, api_key: &str, body: &Value) -> Result<Value, ServiceError> {
        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .map_err(|e| ServiceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))
    }
}
