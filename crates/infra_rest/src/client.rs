//! Backend resource client
//!
//! Thin JSON layer over `reqwest` shared by all adapters. It owns three
//! concerns: correlation and context headers, translation of HTTP failures
//! into `PortError`, and retries.
//!
//! # Error Handling
//!
//! - 404 -> `PortError::NotFound`
//! - 400/422 -> `PortError::Validation`
//! - 409 -> `PortError::Conflict`
//! - 401/403 -> `PortError::Unauthorized`
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Connect failures -> `PortError::Connection`
//! - Undecodable bodies -> `PortError::Transformation`
//!
//! # Retries
//!
//! Only `GET`s are retried, and only for transient errors. Writes such as
//! price and confirm have side effects on the backend and are sent once.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{HeaderName, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use core_kernel::{AdapterHealth, HealthCheckResult, HealthCheckable, OperationMetadata, PortError};

use crate::config::RestClientConfig;

/// Header carrying the correlation id of the operation
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Prefix of the headers carrying `OperationMetadata::context` entries
pub const CONTEXT_HEADER_PREFIX: &str = "X-Context-";

/// JSON client for the backend resources
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    config: RestClientConfig,
}

impl RestClient {
    /// Creates a client with its own connection pool
    pub fn new(config: RestClientConfig) -> Result<Self, PortError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &RestClientConfig {
        &self.config
    }

    /// Reads a resource, retrying transient failures with backoff
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        metadata: Option<&OperationMetadata>,
    ) -> Result<T, PortError> {
        let mut attempt = 0;
        loop {
            match self.get_once(path, query, metadata).await {
                Err(error) if error.is_transient() && attempt < self.config.max_retries => {
                    let delay = self.config.backoff(attempt);
                    warn!(
                        path,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying backend read"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    /// Sends a JSON body with `POST`
    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        metadata: Option<&OperationMetadata>,
    ) -> Result<Option<T>, PortError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path, metadata).json(body);
        let response = self.execute(request, &Method::POST, path).await?;
        decode(response, path).await
    }

    /// Invokes an action endpoint (`POST` without a body)
    pub async fn post_action<T: DeserializeOwned>(
        &self,
        path: &str,
        metadata: Option<&OperationMetadata>,
    ) -> Result<Option<T>, PortError> {
        let request = self.request(Method::POST, path, metadata);
        let response = self.execute(request, &Method::POST, path).await?;
        decode(response, path).await
    }

    /// Sends a partial update with `PATCH`
    pub async fn patch<B, T>(
        &self,
        path: &str,
        body: &B,
        metadata: Option<&OperationMetadata>,
    ) -> Result<Option<T>, PortError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PATCH, path, metadata).json(body);
        let response = self.execute(request, &Method::PATCH, path).await?;
        decode(response, path).await
    }

    pub async fn delete(
        &self,
        path: &str,
        metadata: Option<&OperationMetadata>,
    ) -> Result<(), PortError> {
        let request = self.request(Method::DELETE, path, metadata);
        self.execute(request, &Method::DELETE, path).await?;
        Ok(())
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        metadata: Option<&OperationMetadata>,
    ) -> Result<T, PortError> {
        let request = self.request(Method::GET, path, metadata).query(query);
        let response = self.execute(request, &Method::GET, path).await?;
        decode(response, path)
            .await?
            .ok_or_else(|| PortError::transformation(format!("GET {path} returned an empty body")))
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        metadata: Option<&OperationMetadata>,
    ) -> RequestBuilder {
        let request_id = metadata
            .and_then(|m| m.correlation_id.clone())
            .unwrap_or_else(|| Uuid::now_v7().to_string());

        let mut request = self
            .http
            .request(method, self.config.url(path))
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id);
        if let Some(key) = &self.config.api_key {
            request = request.header(self.config.api_key_header.as_str(), key);
        }
        for (key, value) in metadata.into_iter().flat_map(|m| &m.context) {
            match context_header(key, value) {
                Some((name, value)) => request = request.header(name, value),
                None => warn!(key, "Context entry is not a valid header, not forwarded"),
            }
        }
        request
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        method: &Method,
        path: &str,
    ) -> Result<Response, PortError> {
        let started = Instant::now();
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(e, method, path, started))?;

        let status = response.status();
        debug!(
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Backend responded"
        );
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok());
        let body = response.text().await.unwrap_or_default();
        Err(map_status(status, &body, retry_after, path))
    }
}

fn context_header(key: &str, value: &str) -> Option<(HeaderName, HeaderValue)> {
    let name = HeaderName::try_from(format!("{CONTEXT_HEADER_PREFIX}{key}")).ok()?;
    let value = HeaderValue::try_from(value).ok()?;
    Some((name, value))
}

async fn decode<T: DeserializeOwned>(response: Response, path: &str) -> Result<Option<T>, PortError> {
    if response.status() == StatusCode::NO_CONTENT {
        return Ok(None);
    }
    let bytes = response.bytes().await.map_err(|e| PortError::Connection {
        message: format!("response body from {path} was cut off"),
        source: Some(Box::new(e)),
    })?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| PortError::transformation(format!("unexpected response from {path}: {e}")))
}

fn transport_error(error: reqwest::Error, method: &Method, path: &str, started: Instant) -> PortError {
    if error.is_timeout() {
        return PortError::Timeout {
            operation: format!("{method} {path}"),
            duration_ms: started.elapsed().as_millis() as u64,
        };
    }
    let message = if error.is_connect() {
        format!("cannot reach backend for {method} {path}")
    } else {
        format!("{method} {path} failed")
    };
    PortError::Connection {
        message,
        source: Some(Box::new(error)),
    }
}

/// Translates a non-success response into a port error
pub(crate) fn map_status(
    status: StatusCode,
    body: &str,
    retry_after_secs: Option<u64>,
    path: &str,
) -> PortError {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let text_field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };
    let message = text_field("message")
        .or_else(|| text_field("error"))
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.chars().take(200).collect())
        })
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

    match status.as_u16() {
        404 => PortError::not_found("resource", path),
        400 | 422 => PortError::Validation {
            message,
            field: text_field("field"),
        },
        409 => PortError::conflict(message),
        401 | 403 => PortError::Unauthorized { message },
        429 => PortError::RateLimited {
            retry_after_secs: retry_after_secs.unwrap_or(1),
        },
        500..=599 => PortError::unavailable(format!("backend ({status}): {message}")),
        _ => PortError::internal(format!("unexpected status {status} from {path}: {message}")),
    }
}

#[async_trait]
impl HealthCheckable for RestClient {
    async fn health_check(&self) -> HealthCheckResult {
        let path = self.config.health_path.as_str();
        let started = Instant::now();
        let request = self.request(Method::GET, path, None);
        let outcome = self.execute(request, &Method::GET, path).await;

        let (status, message) = match outcome {
            Ok(_) => (AdapterHealth::Healthy, None),
            Err(error @ (PortError::Unauthorized { .. } | PortError::RateLimited { .. })) => {
                (AdapterHealth::Degraded, Some(error.to_string()))
            }
            Err(error) => (AdapterHealth::Unhealthy, Some(error.to_string())),
        };

        HealthCheckResult {
            adapter_id: "backend-rest".to_string(),
            status,
            latency_ms: started.elapsed().as_millis() as u64,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            map_status(StatusCode::NOT_FOUND, "", None, "/quotes/9"),
            PortError::NotFound { .. }
        ));
        assert!(matches!(
            map_status(StatusCode::CONFLICT, "{}", None, "/quotes/9"),
            PortError::Conflict { .. }
        ));
        assert!(matches!(
            map_status(StatusCode::FORBIDDEN, "", None, "/quotes"),
            PortError::Unauthorized { .. }
        ));
        assert!(matches!(
            map_status(StatusCode::BAD_GATEWAY, "", None, "/quotes/1/price"),
            PortError::ServiceUnavailable { .. }
        ));
        assert!(matches!(
            map_status(StatusCode::IM_A_TEAPOT, "", None, "/quotes"),
            PortError::Internal { .. }
        ));
    }

    #[test]
    fn test_context_header_naming() {
        let (name, value) = context_header("operation", "confirm").unwrap();
        assert_eq!(name.as_str(), "x-context-operation");
        assert_eq!(value, "confirm");

        assert!(context_header("has space", "x").is_none());
        assert!(context_header("operation", "line\nbreak").is_none());
    }

    #[test]
    fn test_validation_keeps_backend_message_and_field() {
        let body = r#"{"message":"must not be in the future","field":"lossDate"}"#;
        match map_status(StatusCode::UNPROCESSABLE_ENTITY, body, None, "/claims") {
            PortError::Validation { message, field } => {
                assert_eq!(message, "must not be in the future");
                assert_eq!(field.as_deref(), Some("lossDate"));
            }
            other => panic!("expected validation, got {other:?}"),
        }
    }

    #[test]
    fn test_rate_limit_uses_retry_after() {
        match map_status(StatusCode::TOO_MANY_REQUESTS, "", Some(7), "/quotes") {
            PortError::RateLimited { retry_after_secs } => assert_eq!(retry_after_secs, 7),
            other => panic!("expected rate limit, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_body_becomes_message() {
        match map_status(StatusCode::BAD_REQUEST, "termMonths too large", None, "/quotes") {
            PortError::Validation { message, field } => {
                assert_eq!(message, "termMonths too large");
                assert!(field.is_none());
            }
            other => panic!("expected validation, got {other:?}"),
        }
    }
}
