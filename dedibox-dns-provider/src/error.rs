use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Dedibox API and challenge operations.
///
/// Client-level variants (`Transport`, `UnexpectedStatus`, `Decode`) carry the
/// HTTP method and URL of the failed request for diagnostics. All variants are
/// serializable for structured error reporting.
///
/// # Retryable Errors
///
/// Nothing in this crate retries. [`is_retryable`](Self::is_retryable) tells the
/// calling orchestration which failures are transient:
/// - [`Transport`](Self::Transport): connectivity failure or timeout
/// - [`UnexpectedStatus`](Self::UnexpectedStatus) with HTTP 429 or 5xx
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "code")]
pub enum DediboxError {
    /// The API token is missing or empty.
    #[error("[dedibox] Credentials missing: API token is empty")]
    MissingCredential,

    /// A configuration value is invalid.
    #[error("[dedibox] Invalid configuration '{param}': {detail}")]
    InvalidConfig {
        /// Name of the offending setting.
        param: String,
        /// Description of what's wrong.
        detail: String,
    },

    /// The request could not be sent or its response could not be received.
    #[error("[dedibox] {method} {url}: request failed: {detail}")]
    Transport {
        /// HTTP method of the failed request.
        method: String,
        /// Full URL of the failed request.
        url: String,
        /// Whether the per-request timeout elapsed.
        timeout: bool,
        /// Error details.
        detail: String,
    },

    /// The API answered with a status outside 2xx.
    #[error("[dedibox] {method} {url}: unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP method of the failed request.
        method: String,
        /// Full URL of the failed request.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The response body did not parse as the expected shape.
    #[error("[dedibox] {method} {url}: failed to decode response (status {status}): {detail}")]
    Decode {
        /// HTTP method of the failed request.
        method: String,
        /// Full URL of the failed request.
        url: String,
        /// HTTP status code of the response.
        status: u16,
        /// Decoder error message.
        detail: String,
    },

    /// A version carrying the temporary label already exists in the zone.
    #[error("[dedibox] A version named '{version_name}' of zone {zone} already exists")]
    Conflict {
        /// Zone the version belongs to.
        zone: String,
        /// Conflicting version name.
        version_name: String,
    },

    /// A version, record or session required by the operation is absent.
    #[error("[dedibox] {resource} not found in zone {zone}")]
    NotFound {
        /// Zone that was searched.
        zone: String,
        /// Human readable description of the missing resource.
        resource: String,
    },

    /// The authoritative zone of a challenge FQDN could not be determined.
    #[error("[dedibox] Could not find zone for '{fqdn}': {detail}")]
    ZoneResolution {
        /// FQDN being resolved.
        fqdn: String,
        /// Error details.
        detail: String,
    },
}

impl DediboxError {
    /// 是否为预期行为（配置错误、资源不存在、4xx 等），用于日志分级。
    ///
    /// 返回 `true` 时应使用 `warn` 级别，`false` 时使用 `error` 级别。
    /// **新增变体时请同步更新此方法。**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::MissingCredential
            | Self::InvalidConfig { .. }
            | Self::Conflict { .. }
            | Self::NotFound { .. }
            | Self::ZoneResolution { .. } => true,
            Self::UnexpectedStatus { status, .. } => (400..500).contains(status) && *status != 429,
            Self::Transport { .. } | Self::Decode { .. } => false,
        }
    }

    /// 是否为瞬时错误，调用方可自行决定重试。
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::UnexpectedStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP 状态码（仅 `UnexpectedStatus` / `Decode`）
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::UnexpectedStatus { status, .. } | Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn not_found(zone: &str, resource: impl Into<String>) -> Self {
        Self::NotFound {
            zone: zone.to_string(),
            resource: resource.into(),
        }
    }

    pub(crate) fn invalid_config(param: &str, detail: impl ToString) -> Self {
        Self::InvalidConfig {
            param: param.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// Convenience type alias for `Result<T, DediboxError>`.
pub type Result<T> = std::result::Result<T, DediboxError>;
