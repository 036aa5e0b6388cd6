use std::time::Duration;

use async_trait::async_trait;

use crate::challenge::ChallengeError;
use crate::error::Result;

/// DNS-01 challenge provider Trait
///
/// The surface an ACME orchestration drives: `present` before asking the CA to
/// validate, `cleanup` afterwards, and `timeout` for its propagation polling.
/// Retry and propagation checks belong to the orchestration.
#[async_trait]
pub trait ChallengeProvider: Send + Sync {
    /// 提供商标识符
    fn id(&self) -> &'static str;

    /// 发布 `domain` 的 DNS-01 验证记录
    async fn present(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> std::result::Result<(), ChallengeError>;

    /// 撤销 `present` 所做的修改
    async fn cleanup(
        &self,
        domain: &str,
        token: &str,
        key_auth: &str,
    ) -> std::result::Result<(), ChallengeError>;

    /// `(propagation timeout, polling interval)`
    fn timeout(&self) -> (Duration, Duration);
}

/// Finds the authoritative zone of a challenge FQDN.
#[async_trait]
pub trait ZoneResolver: Send + Sync {
    /// Returns the zone in FQDN form with its trailing dot (`example.com.`).
    async fn find_zone(&self, fqdn: &str) -> Result<String>;
}
