//! Provider configuration and environment loading.

use std::time::Duration;

use url::Url;

use crate::error::{DediboxError, Result};

/// Default Dedibox API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.online.net/api/v1";
/// Default label of the temporary zone version.
pub const DEFAULT_TEMP_VERSION_NAME: &str = "lego_tmp";
/// Default TTL of the challenge record (seconds).
pub const DEFAULT_TTL: u32 = 120;
/// Default per-request HTTP timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Default DNS propagation timeout handed to the orchestration.
pub const DEFAULT_PROPAGATION_TIMEOUT: Duration = Duration::from_secs(60);
/// Default DNS propagation polling interval handed to the orchestration.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_secs(2);

const ENV_PREFIX: &str = "DEDIBOX_";

/// Environment variable names.
pub mod env {
    pub const API_TOKEN: &str = "DEDIBOX_API_TOKEN";
    pub const BASE_URL: &str = "DEDIBOX_BASE_URL";
    pub const TTL: &str = "DEDIBOX_TTL";
    pub const HTTP_TIMEOUT: &str = "DEDIBOX_HTTP_TIMEOUT";
    pub const PROPAGATION_TIMEOUT: &str = "DEDIBOX_PROPAGATION_TIMEOUT";
    pub const POLLING_INTERVAL: &str = "DEDIBOX_POLLING_INTERVAL";
    pub const TEMP_VERSION_NAME: &str = "DEDIBOX_TMP_ZONE_VERSION_NAME";
    pub const RECOVERY_MARKER: &str = "DEDIBOX_RECOVERY_MARKER";
}

/// Configuration of a [`DediboxProvider`](crate::DediboxProvider).
#[derive(Clone, PartialEq, Eq)]
pub struct DediboxConfig {
    pub base_url: String,
    pub api_token: String,
    /// Label looked up before staging and given to the temporary version.
    pub temp_version_name: String,
    /// TTL of the challenge TXT record, in seconds.
    pub ttl: u32,
    pub http_timeout: Duration,
    pub propagation_timeout: Duration,
    pub polling_interval: Duration,
    /// Write an `active_version:<uuid>` marker into the temporary version so a
    /// fresh process can clean up without the in-memory session.
    pub recovery_marker: bool,
}

impl std::fmt::Debug for DediboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DediboxConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_token",
                &crate::utils::log_sanitizer::mask_secret(&self.api_token),
            )
            .field("temp_version_name", &self.temp_version_name)
            .field("ttl", &self.ttl)
            .field("http_timeout", &self.http_timeout)
            .field("propagation_timeout", &self.propagation_timeout)
            .field("polling_interval", &self.polling_interval)
            .field("recovery_marker", &self.recovery_marker)
            .finish()
    }
}

impl DediboxConfig {
    /// Default configuration for the given API token.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: api_token.into(),
            temp_version_name: DEFAULT_TEMP_VERSION_NAME.to_string(),
            ttl: DEFAULT_TTL,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            propagation_timeout: DEFAULT_PROPAGATION_TIMEOUT,
            polling_interval: DEFAULT_POLLING_INTERVAL,
            recovery_marker: false,
        }
    }

    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration from an arbitrary key lookup.
    ///
    /// `DEDIBOX_API_TOKEN` is required; every other key falls back to its default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_token = get(env::API_TOKEN).ok_or(DediboxError::MissingCredential)?;
        let mut config = Self::new(api_token);

        if let Some(base_url) = get(env::BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(name) = get(env::TEMP_VERSION_NAME) {
            config.temp_version_name = name;
        }
        if let Some(ttl) = get(env::TTL) {
            config.ttl = parse_number(env::TTL, &ttl)?;
        }
        if let Some(secs) = get(env::HTTP_TIMEOUT) {
            config.http_timeout = Duration::from_secs(parse_number(env::HTTP_TIMEOUT, &secs)?);
        }
        if let Some(secs) = get(env::PROPAGATION_TIMEOUT) {
            config.propagation_timeout =
                Duration::from_secs(parse_number(env::PROPAGATION_TIMEOUT, &secs)?);
        }
        if let Some(secs) = get(env::POLLING_INTERVAL) {
            config.polling_interval =
                Duration::from_secs(parse_number(env::POLLING_INTERVAL, &secs)?);
        }
        if let Some(flag) = get(env::RECOVERY_MARKER) {
            config.recovery_marker = parse_bool(env::RECOVERY_MARKER, &flag)?;
        }

        log::debug!(
            "[dedibox] Loaded configuration from {ENV_PREFIX}* variables: {config:?}"
        );

        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the client relies on.
    pub fn validate(&self) -> Result<()> {
        if self.api_token.trim().is_empty() {
            return Err(DediboxError::MissingCredential);
        }
        if self.temp_version_name.trim().is_empty() {
            return Err(DediboxError::invalid_config(
                "temp_version_name",
                "must not be empty",
            ));
        }
        if self.ttl == 0 {
            return Err(DediboxError::invalid_config("ttl", "must be greater than 0"));
        }
        parse_base_url(&self.base_url)?;
        Ok(())
    }
}

/// Parses a base URL that endpoint path segments can be appended to.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| DediboxError::invalid_config("base_url", e))?;
    if url.cannot_be_a_base() {
        return Err(DediboxError::invalid_config(
            "base_url",
            format!("'{raw}' cannot be used as a base URL"),
        ));
    }
    Ok(url)
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| DediboxError::invalid_config(key, format!("'{raw}': {e}")))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(DediboxError::invalid_config(
            key,
            format!("'{raw}' is not a boolean"),
        )),
    }
}
