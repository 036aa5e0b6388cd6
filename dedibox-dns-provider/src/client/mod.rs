//! Dedibox zone-version API client
//!
//! Stateless apart from its immutable configuration (base URL, token, HTTP
//! transport); a single instance can be shared by independent coordinators.

mod http;
mod records;
mod versions;

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::config::{DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT, DediboxConfig, parse_base_url};
use crate::error::{DediboxError, Result};
use crate::utils::domain::domain_segment;
use crate::utils::log_sanitizer::mask_secret;

pub(crate) use records::recovery_marker;
pub use records::{RECOVERY_MARKER_NAME, RECOVERY_MARKER_PREFIX};

/// Priority sent with every created record, whatever the caller asked for.
pub const DEFAULT_RECORD_PRIORITY: u32 = 12;

/// Name sent when creating a version. The API call ignores the requested name.
pub const CREATED_VERSION_NAME: &str = "lego_tmp";

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Dedibox API client
#[derive(Clone)]
pub struct DediboxClient {
    pub(crate) client: Client,
    pub(crate) base_url: Url,
    pub(crate) api_token: String,
}

impl std::fmt::Debug for DediboxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DediboxClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_token", &mask_secret(&self.api_token))
            .finish_non_exhaustive()
    }
}

impl DediboxClient {
    /// Client against the default endpoint with the default request timeout.
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_options(api_token, DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT)
    }

    /// Client against `base_url`, each request bounded by `http_timeout`.
    pub fn with_options(
        api_token: impl Into<String>,
        base_url: &str,
        http_timeout: Duration,
    ) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(DediboxError::MissingCredential);
        }

        Ok(Self {
            client: create_http_client(http_timeout)?,
            base_url: parse_base_url(base_url)?,
            api_token,
        })
    }

    pub fn from_config(config: &DediboxConfig) -> Result<Self> {
        config.validate()?;
        Self::with_options(
            config.api_token.clone(),
            &config.base_url,
            config.http_timeout,
        )
    }

    /// Replaces the underlying HTTP transport.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/domain/{zone without trailing dot}/{segments...}`
    pub(crate) fn endpoint(&self, zone: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| DediboxError::invalid_config("base_url", "cannot be a base URL"))?
            .pop_if_empty()
            .push("domain")
            .push(domain_segment(zone))
            .extend(segments);
        Ok(url)
    }
}

/// 创建带超时配置的 HTTP Client
fn create_http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS).min(timeout))
        .timeout(timeout)
        .build()
        .map_err(|e| DediboxError::invalid_config("http_client", e))
}
