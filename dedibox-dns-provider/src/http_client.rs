//! Generic HTTP client tools
//!
//! One request path for every Dedibox call: send, capture status, read body,
//! log, then let the caller decide how to decode.
//!
//! # design principles
//! - **No retries** - transient failures are reported, the ACME orchestration owns retry policy
//! - **Status is checked before decoding** - a non-2xx answer never reaches the JSON decoder
//! - **Every error names the request** - method and URL travel with the error

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::error::DediboxError;
use crate::utils::log_sanitizer::truncate_for_log;

/// Status code and body of a completed HTTP exchange.
#[derive(Debug)]
pub(crate) struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP tool function set
pub(crate) struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns the raw response
    ///
    /// # Arguments
    /// * `request_builder` - configured request (URL, headers, body)
    /// * `method` - HTTP method, for logging and errors
    /// * `url` - full URL, for logging and errors
    ///
    /// # Returns
    /// * `Ok(HttpResponse)` - any status; see [`HttpUtils::ensure_success`]
    /// * `Err(DediboxError::Transport)` - the exchange itself failed
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method: &Method,
        url: &str,
    ) -> Result<HttpResponse, DediboxError> {
        log::debug!("[dedibox] {method} {url}");

        let response = request_builder.send().await.map_err(|e| {
            log::warn!("[dedibox] {method} {url} failed: {e}");
            DediboxError::Transport {
                method: method.to_string(),
                url: url.to_string(),
                timeout: e.is_timeout(),
                detail: e.to_string(),
            }
        })?;

        let status = response.status().as_u16();
        log::debug!("[dedibox] Response Status: {status}");

        let body = response
            .text()
            .await
            .map_err(|e| DediboxError::Transport {
                method: method.to_string(),
                url: url.to_string(),
                timeout: e.is_timeout(),
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!("[dedibox] Response Body: {}", truncate_for_log(&body));

        Ok(HttpResponse { status, body })
    }

    /// Rejects any status outside 2xx with `UnexpectedStatus`
    pub fn ensure_success(
        response: HttpResponse,
        method: &Method,
        url: &str,
    ) -> Result<HttpResponse, DediboxError> {
        if (200..300).contains(&response.status) {
            return Ok(response);
        }

        log::warn!(
            "[dedibox] {method} {url} answered HTTP {}: {}",
            response.status,
            truncate_for_log(&response.body)
        );
        Err(DediboxError::UnexpectedStatus {
            method: method.to_string(),
            url: url.to_string(),
            status: response.status,
            body: response.body,
        })
    }

    /// Parse JSON response
    ///
    /// # Returns
    /// * `Ok(T)` - successfully parsed
    /// * `Err(DediboxError::Decode)` - parsing failed
    pub fn parse_json<T>(
        response: &HttpResponse,
        method: &Method,
        url: &str,
    ) -> Result<T, DediboxError>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(&response.body).map_err(|e| {
            log::error!("[dedibox] JSON parse failed: {e}");
            log::error!(
                "[dedibox] Raw response: {}",
                truncate_for_log(&response.body)
            );
            DediboxError::Decode {
                method: method.to_string(),
                url: url.to_string(),
                status: response.status,
                detail: e.to_string(),
            }
        })
    }
}
