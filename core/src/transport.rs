//! Blocking `HttpClient` backed by ureq.
//!
//! # Design
//! ureq's status-code-as-error behavior is disabled so every response comes
//! back as data. Non-2xx statuses are then mapped to `HttpError` from the
//! service's `error.list` envelope, keeping the first reported error. Bodies
//! that are not an error envelope still produce an `HttpError`, with code
//! `unknown` and the raw body as message.

use serde::Deserialize;
use tracing::{debug, warn};
use ureq::http::Response;
use ureq::{Agent, Body};

use crate::config::ClientConfig;
use crate::error::{ApiError, HttpError};
use crate::http::HttpClient;

const JSON: &str = "application/json";
const UNKNOWN_CODE: &str = "unknown";

#[derive(Debug, Deserialize)]
struct ErrorList {
    #[serde(default)]
    errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct ErrorEntry {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// `HttpClient` that talks to the service over HTTP with a shared agent.
#[derive(Debug, Clone)]
pub struct UreqClient {
    agent: Agent,
    config: ClientConfig,
}

impl UreqClient {
    pub fn new(config: ClientConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .new_agent();
        Self { agent, config }
    }

    fn finish(
        &self,
        method: &str,
        path: &str,
        result: Result<Response<Body>, ureq::Error>,
    ) -> Result<Vec<u8>, ApiError> {
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if (200..300).contains(&status) {
            debug!(method, path, status, bytes = body.len(), "request succeeded");
            return Ok(body);
        }

        let error = http_error(status, &body);
        warn!(method, path, status, code = %error.code, "request failed");
        Err(error.into())
    }
}

impl HttpClient for UreqClient {
    fn get(&self, path: &str, query: &[(String, String)]) -> Result<Vec<u8>, ApiError> {
        let result = self
            .agent
            .get(self.config.url(path))
            .header("Accept", JSON)
            .query_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .call();
        self.finish("GET", path, result)
    }

    fn post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, ApiError> {
        let result = self
            .agent
            .post(self.config.url(path))
            .header("Accept", JSON)
            .content_type(JSON)
            .send(body);
        self.finish("POST", path, result)
    }

    fn delete(&self, path: &str, query: &[(String, String)]) -> Result<Vec<u8>, ApiError> {
        let result = self
            .agent
            .delete(self.config.url(path))
            .header("Accept", JSON)
            .query_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .call();
        self.finish("DELETE", path, result)
    }
}

/// Build the error for a non-2xx response body.
fn http_error(status: u16, body: &[u8]) -> HttpError {
    let first = serde_json::from_slice::<ErrorList>(body)
        .ok()
        .and_then(|list| list.errors.into_iter().next());

    match first {
        Some(entry) => HttpError::new(
            status,
            entry.code.unwrap_or_else(|| UNKNOWN_CODE.to_string()),
            entry.message.unwrap_or_default(),
        ),
        None => HttpError::new(status, UNKNOWN_CODE, String::from_utf8_lossy(body)),
    }
}
