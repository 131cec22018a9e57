//! HTTP request description and the transport seam.
//!
//! # Design
//! `UserApi` never touches the network itself. Each operation first builds
//! an `HttpRequest` as plain data, then hands it to an injected
//! `HttpClient`, which owns connection handling, base URL resolution and
//! status mapping. Paths are relative to the service root (`/users/...`).
//!
//! A transport reports any non-2xx status as `ApiError::Http` carrying the
//! service's status, code and message; the client passes it through as is.

use std::sync::Arc;

use serde::Serialize;

use crate::error::ApiError;

/// Ordered query parameters.
pub type Query = Vec<(String, String)>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub query: Query,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>, query: Query) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            query,
            body: None,
        }
    }

    pub fn post(path: impl Into<String>, body: String) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Delete,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Value of the first query parameter named `key`.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Blocking transport used by `UserApi`.
///
/// Implementations must be safe to share between threads; the client holds
/// no state of its own beyond the transport.
pub trait HttpClient: Send + Sync {
    fn get(&self, path: &str, query: &[(String, String)]) -> Result<Vec<u8>, ApiError>;

    fn post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, ApiError>;

    fn delete(&self, path: &str, query: &[(String, String)]) -> Result<Vec<u8>, ApiError>;

    /// Dispatch a built request to the matching verb.
    fn execute(&self, request: &HttpRequest) -> Result<Vec<u8>, ApiError> {
        match request.method {
            HttpMethod::Get => self.get(&request.path, &request.query),
            HttpMethod::Post => {
                let body = request.body.as_deref().unwrap_or_default();
                self.post(&request.path, body.as_bytes())
            }
            HttpMethod::Delete => self.delete(&request.path, &request.query),
        }
    }
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn get(&self, path: &str, query: &[(String, String)]) -> Result<Vec<u8>, ApiError> {
        (**self).get(path, query)
    }

    fn post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, ApiError> {
        (**self).post(path, body)
    }

    fn delete(&self, path: &str, query: &[(String, String)]) -> Result<Vec<u8>, ApiError> {
        (**self).delete(path, query)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn get(&self, path: &str, query: &[(String, String)]) -> Result<Vec<u8>, ApiError> {
        (**self).get(path, query)
    }

    fn post(&self, path: &str, body: &[u8]) -> Result<Vec<u8>, ApiError> {
        (**self).post(path, body)
    }

    fn delete(&self, path: &str, query: &[(String, String)]) -> Result<Vec<u8>, ApiError> {
        (**self).delete(path, query)
    }
}

/// Flatten a serializable struct of scalar fields into query parameters.
///
/// `None` fields (serialized as `null` or skipped) are left out. Nested
/// arrays and objects are rejected because the service has no encoding for
/// them in query strings.
pub fn to_query<T: Serialize>(params: &T) -> Result<Query, ApiError> {
    let value =
        serde_json::to_value(params).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    let serde_json::Value::Object(fields) = value else {
        return Err(ApiError::SerializationError(
            "query parameters must serialize to an object".to_string(),
        ));
    };

    let mut query = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let value = match value {
            serde_json::Value::Null => continue,
            serde_json::Value::String(s) => s,
            serde_json::Value::Bool(b) => b.to_string(),
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(ApiError::SerializationError(format!(
                    "query parameter `{key}` is not a scalar: {other}"
                )))
            }
        };
        query.push((key, value));
    }
    Ok(query)
}
