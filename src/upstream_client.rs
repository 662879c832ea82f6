// src/upstream_client.rs
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

/// Fixed address of the natural-language interpreter. The service takes
/// `{"question": ...}` and answers with `{"api_url": ..., "intent": ...}`.
const INTERPRETER_URL: &str = "https://nl.cityscout-api.com/api/ask";

/// Hosts the data relay will forward to. Descriptors point somewhere under
/// the data service's domain; anything else is refused before any call.
const ALLOWED_DATA_HOSTS: &[&str] = &["cityscout-api.com"];

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("upstream returned status {status}")]
    Status { status: u16 },
    #[error("upstream returned an unparsable body")]
    Malformed { body: String },
    #[error("request to upstream failed: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: Client,
    interpreter_url: String,
}

impl UpstreamClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            interpreter_url: INTERPRETER_URL.to_string(),
        }
    }

    /// Forward a free-text question to the interpreter and return its JSON
    /// answer unchanged. The body is read as text first so a 2xx with a
    /// garbage body is reported as `Malformed` (with the raw text), distinct
    /// from an unreachable upstream.
    pub async fn interpret_raw(&self, question: &str) -> Result<serde_json::Value, UpstreamError> {
        info!("💬 Forwarding question to interpreter: '{}'", question);

        let response = self
            .client
            .post(&self.interpreter_url)
            .json(&json!({ "question": question }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Interpreter returned non-success status: {}", status);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let raw = response.text().await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(_) => Err(UpstreamError::Malformed { body: raw }),
        }
    }

    /// The forwarded request carries a JSON content-type header and nothing
    /// else: no body, no client state echoed into the call.
    fn build_data_request(&self, api_url: &str) -> Result<reqwest::Request, reqwest::Error> {
        self.client
            .post(api_url)
            .header(CONTENT_TYPE, "application/json")
            .build()
    }

    /// POST to a data-service URL the interpreter handed back.
    pub async fn fetch_raw(&self, api_url: &str) -> Result<serde_json::Value, UpstreamError> {
        info!("📦 Fetching results from data service: {}", api_url);

        let request = self.build_data_request(api_url)?;
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            warn!("Data service returned non-success status: {}", status);
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let raw = response.text().await?;
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(_) => Err(UpstreamError::Malformed { body: raw }),
        }
    }
}

impl Default for UpstreamClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a caller-supplied URL is allowed to be relayed to. Only URLs on
/// the data service's domain pass; everything else is refused without an
/// outbound call being made.
pub fn is_allowed_data_url(api_url: &str) -> bool {
    let parsed = match reqwest::Url::parse(api_url) {
        Ok(url) => url,
        Err(_) => return false,
    };
    if parsed.scheme() != "https" && parsed.scheme() != "http" {
        return false;
    }
    let host = match parsed.host_str() {
        Some(host) => host,
        None => return false,
    };
    ALLOWED_DATA_HOSTS
        .iter()
        .any(|allowed| host == *allowed || host.ends_with(&format!(".{}", allowed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_service_urls_are_allowed() {
        assert!(is_allowed_data_url("https://data.cityscout-api.com/v1/events"));
        assert!(is_allowed_data_url("https://cityscout-api.com/v1/attractions?city=haifa"));
    }

    #[test]
    fn forwarded_data_request_carries_headers_only() {
        let client = UpstreamClient::new();
        let request = client
            .build_data_request("https://data.cityscout-api.com/v1/events")
            .unwrap();

        assert!(request.body().is_none());
        assert_eq!(request.headers().len(), 1);
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn foreign_hosts_are_refused() {
        assert!(!is_allowed_data_url("https://evil.example.com/steal"));
        assert!(!is_allowed_data_url("https://notcityscout-api.com/v1/events"));
        assert!(!is_allowed_data_url("file:///etc/passwd"));
        assert!(!is_allowed_data_url("not a url"));
    }
}
