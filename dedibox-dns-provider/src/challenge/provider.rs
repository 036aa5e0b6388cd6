//! Dedibox DNS-01 challenge provider
//!
//! `present` stages the challenge in a temporary copy of the active zone
//! version and serves it; `cleanup` re-enables the original version and drops
//! the copy. The two phases share only the [`ChallengeSession`] recorded per
//! zone. Steps run strictly one after another and nothing is rolled back when
//! one fails: a failed `present` may leave the temporary version behind, which
//! `cleanup` on the same provider can still remove.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::client::{CREATED_VERSION_NAME, DediboxClient, recovery_marker};
use crate::config::DediboxConfig;
use crate::error::{DediboxError, Result};
use crate::traits::{ChallengeProvider, ZoneResolver};
use crate::types::{ChallengeSession, Record, Version};
use crate::utils::domain::full_name_to_relative;

use super::{ChallengeError, ChallengeInfo, ChallengePhase, ChallengeStep};

type ChallengeResult<T> = std::result::Result<T, ChallengeError>;

/// Dedibox DNS-01 challenge provider
pub struct DediboxProvider {
    config: DediboxConfig,
    client: DediboxClient,
    resolver: Arc<dyn ZoneResolver>,
    sessions: RwLock<HashMap<String, ChallengeSession>>,
}

impl std::fmt::Debug for DediboxProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DediboxProvider")
            .field("config", &self.config)
            .field("client", &self.client)
            .finish_non_exhaustive()
    }
}

impl DediboxProvider {
    /// Provider locating zones through SOA lookups.
    #[cfg(feature = "soa-resolver")]
    pub fn new(config: DediboxConfig) -> Result<Self> {
        Self::with_resolver(config, Arc::new(super::SoaZoneResolver::new()))
    }

    /// Provider configured from `DEDIBOX_*` environment variables.
    #[cfg(feature = "soa-resolver")]
    pub fn from_env() -> Result<Self> {
        Self::new(DediboxConfig::from_env()?)
    }

    pub fn with_resolver(config: DediboxConfig, resolver: Arc<dyn ZoneResolver>) -> Result<Self> {
        let client = DediboxClient::from_config(&config)?;
        Ok(Self::with_client(config, client, resolver))
    }

    /// Provider reusing an existing client; `config.base_url`, token and
    /// HTTP timeout are not re-applied to it.
    pub fn with_client(
        config: DediboxConfig,
        client: DediboxClient,
        resolver: Arc<dyn ZoneResolver>,
    ) -> Self {
        Self {
            config,
            client,
            resolver,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &DediboxClient {
        &self.client
    }

    pub fn config(&self) -> &DediboxConfig {
        &self.config
    }

    /// Identifiers staged for `zone` (FQDN form), if any.
    pub async fn session(&self, zone: &str) -> Option<ChallengeSession> {
        self.sessions.read().await.get(zone).cloned()
    }

    fn fail(
        phase: ChallengePhase,
        step: ChallengeStep,
        message: String,
        source: DediboxError,
    ) -> ChallengeError {
        if source.is_expected() {
            log::warn!("[dedibox] {step} failed: {message}: {source}");
        } else {
            log::error!("[dedibox] {step} failed: {message}: {source}");
        }
        ChallengeError::new(phase, step, message, source)
    }

    async fn resolve_zone(
        &self,
        phase: ChallengePhase,
        domain: &str,
        info: &ChallengeInfo,
    ) -> ChallengeResult<String> {
        self.resolver.find_zone(&info.fqdn).await.map_err(|e| {
            Self::fail(
                phase,
                ChallengeStep::ResolveZone,
                format!("could not find zone for domain {domain:?}"),
                e,
            )
        })
    }

    /// Stages the challenge record for `domain` and serves it.
    pub async fn present_challenge(&self, domain: &str, key_auth: &str) -> ChallengeResult<()> {
        const PHASE: ChallengePhase = ChallengePhase::Present;

        let info = ChallengeInfo::new(domain, key_auth);
        let zone = self.resolve_zone(PHASE, domain, &info).await?;
        let temp_name = self.config.temp_version_name.as_str();

        log::info!("[dedibox] Presenting challenge {} in zone {zone}", info.fqdn);

        // 确认临时版本不存在
        let existing = self
            .client
            .find_version_by_name(&zone, temp_name)
            .await
            .map_err(|e| {
                Self::fail(
                    PHASE,
                    ChallengeStep::CheckTemporaryVersion,
                    format!("unable to verify whether version {temp_name} of zone {zone} already exists"),
                    e,
                )
            })?;
        if existing.is_some() || self.sessions.read().await.contains_key(&zone) {
            return Err(Self::fail(
                PHASE,
                ChallengeStep::CheckTemporaryVersion,
                format!("refusing to stage a second challenge in zone {zone}"),
                DediboxError::Conflict {
                    zone: zone.clone(),
                    version_name: temp_name.to_string(),
                },
            ));
        }

        let active = self.client.find_active_version(&zone).await.map_err(|e| {
            Self::fail(
                PHASE,
                ChallengeStep::FindActiveVersion,
                format!("unable to find active version of zone {zone}"),
                e,
            )
        })?;

        let temp = self
            .client
            .create_version(&zone, temp_name)
            .await
            .map_err(|e| {
                Self::fail(
                    PHASE,
                    ChallengeStep::CreateTemporaryVersion,
                    format!("unable to create temporary version {temp_name} of zone {zone}"),
                    e,
                )
            })?;
        self.sessions.write().await.insert(
            zone.clone(),
            ChallengeSession {
                zone: zone.clone(),
                active_version_uuid: active.uuid.clone(),
                temp_version_uuid: temp.uuid.clone(),
            },
        );
        log::info!(
            "[dedibox] Created temporary version {} ({}) from active version {} ({})",
            temp.name,
            temp.uuid,
            active.name,
            active.uuid
        );

        let copied = self
            .client
            .duplicate_records(&zone, &active.uuid, &temp.uuid)
            .await
            .map_err(|e| {
                Self::fail(
                    PHASE,
                    ChallengeStep::DuplicateRecords,
                    format!(
                        "unable to duplicate records from version {} to version {}",
                        active.name, temp.name
                    ),
                    e,
                )
            })?;
        log::info!("[dedibox] Copied {copied} records into version {}", temp.name);

        let record = Record::txt(
            full_name_to_relative(&info.fqdn, &zone),
            info.value.as_str(),
            self.config.ttl,
        );
        self.client
            .create_record(&zone, &temp.uuid, &record)
            .await
            .map_err(|e| {
                Self::fail(
                    PHASE,
                    ChallengeStep::CreateChallengeRecord,
                    format!(
                        "unable to create record {} in version {}",
                        record.name, temp.name
                    ),
                    e,
                )
            })?;

        if self.config.recovery_marker {
            let marker = recovery_marker(&active.uuid, self.config.ttl);
            self.client
                .create_record(&zone, &temp.uuid, &marker)
                .await
                .map_err(|e| {
                    Self::fail(
                        PHASE,
                        ChallengeStep::WriteRecoveryMarker,
                        format!("unable to write recovery marker in version {}", temp.name),
                        e,
                    )
                })?;
        }

        self.client
            .enable_version(&zone, &temp.uuid)
            .await
            .map_err(|e| {
                Self::fail(
                    PHASE,
                    ChallengeStep::EnableTemporaryVersion,
                    format!("unable to enable version {}", temp.name),
                    e,
                )
            })?;

        log::info!(
            "[dedibox] Version {} of zone {zone} is now serving {}",
            temp.name,
            info.fqdn
        );
        Ok(())
    }

    /// Restores the version that was active before `present` and deletes the
    /// temporary one.
    ///
    /// The session is dropped only once both steps succeed, so a failed cleanup
    /// can be attempted again.
    pub async fn cleanup_challenge(&self, domain: &str, key_auth: &str) -> ChallengeResult<()> {
        const PHASE: ChallengePhase = ChallengePhase::Cleanup;

        let info = ChallengeInfo::new(domain, key_auth);
        let zone = self.resolve_zone(PHASE, domain, &info).await?;

        log::info!("[dedibox] Cleaning up challenge {} in zone {zone}", info.fqdn);

        let stored = self.sessions.read().await.get(&zone).cloned();
        let session = match stored {
            Some(session) => session,
            None if self.config.recovery_marker => self.recover_session(&zone).await?,
            None => {
                return Err(Self::fail(
                    PHASE,
                    ChallengeStep::LoadSession,
                    format!("no challenge was presented in zone {zone}"),
                    DediboxError::not_found(&zone, "challenge session"),
                ));
            }
        };

        let temp = self
            .fetch_version(
                &zone,
                &session.temp_version_uuid,
                ChallengeStep::FetchTemporaryVersion,
            )
            .await?;
        let original = self
            .fetch_version(
                &zone,
                &session.active_version_uuid,
                ChallengeStep::FetchOriginalVersion,
            )
            .await?;

        self.client
            .enable_version(&zone, &original.uuid)
            .await
            .map_err(|e| {
                Self::fail(
                    PHASE,
                    ChallengeStep::RestoreOriginalVersion,
                    format!("unable to enable back version {}", original.name),
                    e,
                )
            })?;
        log::info!(
            "[dedibox] Version {} of zone {zone} is serving again",
            original.name
        );

        self.client
            .delete_version(&zone, &temp.uuid)
            .await
            .map_err(|e| {
                Self::fail(
                    PHASE,
                    ChallengeStep::DeleteTemporaryVersion,
                    format!("unable to delete version {} ({})", temp.name, temp.uuid),
                    e,
                )
            })?;

        self.sessions.write().await.remove(&zone);
        log::info!("[dedibox] Deleted temporary version {}", temp.uuid);
        Ok(())
    }

    /// GET a version by UUID, mapping a 404 or an empty answer to `NotFound`.
    async fn fetch_version(
        &self,
        zone: &str,
        uuid: &str,
        step: ChallengeStep,
    ) -> ChallengeResult<Version> {
        let not_found = || DediboxError::not_found(zone, format!("version {uuid}"));
        let message = format!("unable to fetch version {uuid} of zone {zone}");

        if uuid.is_empty() {
            return Err(Self::fail(ChallengePhase::Cleanup, step, message, not_found()));
        }

        match self.client.get_version(zone, uuid).await {
            Ok(version) if !version.uuid.is_empty() => Ok(version),
            Ok(_) => Err(Self::fail(ChallengePhase::Cleanup, step, message, not_found())),
            Err(e) if e.status() == Some(404) => {
                Err(Self::fail(ChallengePhase::Cleanup, step, message, not_found()))
            }
            Err(e) => Err(Self::fail(ChallengePhase::Cleanup, step, message, e)),
        }
    }

    /// Rebuilds a session from the backend: the temporary version is found by
    /// name and the original UUID read from its recovery marker.
    async fn recover_session(&self, zone: &str) -> ChallengeResult<ChallengeSession> {
        const STEP: ChallengeStep = ChallengeStep::LoadSession;
        let fail = |message: String, e| Self::fail(ChallengePhase::Cleanup, STEP, message, e);

        let mut names = vec![self.config.temp_version_name.as_str()];
        if names[0] != CREATED_VERSION_NAME {
            names.push(CREATED_VERSION_NAME);
        }

        let mut temp = None;
        for name in names {
            temp = self
                .client
                .find_version_by_name(zone, name)
                .await
                .map_err(|e| fail(format!("unable to look up version {name} of zone {zone}"), e))?;
            if temp.is_some() {
                break;
            }
        }
        let Some(temp) = temp else {
            return Err(fail(
                format!("no challenge session and no temporary version in zone {zone}"),
                DediboxError::not_found(zone, "temporary version"),
            ));
        };

        let active_uuid = self
            .client
            .read_version_uuid(zone, &temp.uuid)
            .await
            .map_err(|e| fail(format!("unable to read recovery marker of version {}", temp.name), e))?
            .ok_or_else(|| {
                fail(
                    format!("version {} carries no recovery marker", temp.name),
                    DediboxError::not_found(zone, "recovery marker"),
                )
            })?;

        log::info!(
            "[dedibox] Recovered challenge session for zone {zone}: original {active_uuid}, temporary {}",
            temp.uuid
        );
        Ok(ChallengeSession {
            zone: zone.to_string(),
            active_version_uuid: active_uuid,
            temp_version_uuid: temp.uuid,
        })
    }
}

#[async_trait]
impl ChallengeProvider for DediboxProvider {
    fn id(&self) -> &'static str {
        "dedibox"
    }

    async fn present(&self, domain: &str, _token: &str, key_auth: &str) -> ChallengeResult<()> {
        self.present_challenge(domain, key_auth).await
    }

    async fn cleanup(&self, domain: &str, _token: &str, key_auth: &str) -> ChallengeResult<()> {
        self.cleanup_challenge(domain, key_auth).await
    }

    fn timeout(&self) -> (Duration, Duration) {
        (self.config.propagation_timeout, self.config.polling_interval)
    }
}
