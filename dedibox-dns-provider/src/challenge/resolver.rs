//! Authoritative zone lookup

use async_trait::async_trait;

use crate::error::{DediboxError, Result};
use crate::traits::ZoneResolver;
use crate::utils::domain::{is_within_zone, to_fqdn};

/// Always answers the same zone, for deployments managing a single known zone.
#[derive(Debug, Clone)]
pub struct StaticZoneResolver {
    zone: String,
}

impl StaticZoneResolver {
    pub fn new(zone: &str) -> Self {
        Self {
            zone: to_fqdn(zone),
        }
    }
}

#[async_trait]
impl ZoneResolver for StaticZoneResolver {
    async fn find_zone(&self, fqdn: &str) -> Result<String> {
        if is_within_zone(fqdn, &self.zone) {
            Ok(self.zone.clone())
        } else {
            Err(DediboxError::ZoneResolution {
                fqdn: fqdn.to_string(),
                detail: format!("outside of configured zone {}", self.zone),
            })
        }
    }
}

/// Outcome of the SOA query for one candidate zone.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(not(feature = "soa-resolver"), allow(dead_code))]
enum SoaAnswer {
    /// The candidate owns an SOA record.
    Owner,
    /// No SOA at this name (NOERROR without records, or NXDOMAIN).
    NotOwner,
    /// The query itself failed (timeout, SERVFAIL, REFUSED, ...).
    Failed(String),
}

/// Decides the candidate walk: `Some` ends it, `None` moves on to the parent.
///
/// A failed query ends the walk with an error; guessing the parent zone would
/// stage the record where it is not served.
#[cfg_attr(not(feature = "soa-resolver"), allow(dead_code))]
fn walk_step(fqdn: &str, candidate: &str, answer: SoaAnswer) -> Option<Result<String>> {
    match answer {
        SoaAnswer::Owner => Some(Ok(candidate.to_string())),
        SoaAnswer::NotOwner => None,
        SoaAnswer::Failed(detail) => Some(Err(DediboxError::ZoneResolution {
            fqdn: fqdn.to_string(),
            detail: format!("SOA lookup for {candidate} failed: {detail}"),
        })),
    }
}

/// Candidate zones of `fqdn`, most specific first, never a bare TLD.
///
/// `_acme-challenge.www.example.com.` ->
/// `[_acme-challenge.www.example.com., www.example.com., example.com.]`
#[cfg_attr(not(feature = "soa-resolver"), allow(dead_code))]
fn zone_candidates(fqdn: &str) -> Vec<String> {
    let labels: Vec<&str> = fqdn
        .trim_end_matches('.')
        .split('.')
        .filter(|l| !l.is_empty())
        .collect();

    (0..labels.len().saturating_sub(1))
        .map(|i| format!("{}.", labels[i..].join(".")))
        .collect()
}

#[cfg(feature = "soa-resolver")]
pub use soa::SoaZoneResolver;

#[cfg(feature = "soa-resolver")]
mod soa {
    use std::net::IpAddr;

    use async_trait::async_trait;
    use hickory_resolver::{
        TokioResolver,
        config::{NameServerConfigGroup, ResolverConfig, ResolverOpts},
        name_server::TokioConnectionProvider,
        proto::rr::RecordType,
    };

    use super::{SoaAnswer, walk_step, zone_candidates};
    use crate::error::{DediboxError, Result};
    use crate::traits::ZoneResolver;

    /// Finds the zone by walking up the FQDN until a name owns an SOA record.
    pub struct SoaZoneResolver {
        resolver: TokioResolver,
    }

    impl std::fmt::Debug for SoaZoneResolver {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("SoaZoneResolver").finish_non_exhaustive()
        }
    }

    impl Default for SoaZoneResolver {
        fn default() -> Self {
            Self::new()
        }
    }

    impl SoaZoneResolver {
        /// Resolver using the default upstream configuration.
        pub fn new() -> Self {
            Self::with_config(ResolverConfig::default())
        }

        /// Resolver querying a single nameserver over UDP/TCP port 53.
        pub fn with_nameserver(ip: IpAddr) -> Self {
            Self::with_config(ResolverConfig::from_parts(
                None,
                vec![],
                NameServerConfigGroup::from_ips_clear(&[ip], 53, true),
            ))
        }

        fn with_config(config: ResolverConfig) -> Self {
            let provider = TokioConnectionProvider::default();
            let resolver = TokioResolver::builder_with_config(config, provider)
                .with_options(ResolverOpts::default())
                .build();
            Self { resolver }
        }

        async fn query_soa(&self, candidate: &str) -> SoaAnswer {
            match self.resolver.soa_lookup(candidate).await {
                Ok(response) => {
                    let owner = response.as_lookup().record_iter().any(|record| {
                        record.record_type() == RecordType::SOA
                            && record
                                .name()
                                .to_string()
                                .trim_end_matches('.')
                                .eq_ignore_ascii_case(candidate.trim_end_matches('.'))
                    });
                    if owner {
                        SoaAnswer::Owner
                    } else {
                        SoaAnswer::NotOwner
                    }
                }
                // NOERROR/NODATA 与 NXDOMAIN 均归入此类
                Err(e) if e.is_no_records_found() => {
                    log::debug!("[dedibox] No SOA at {candidate}: {e}");
                    SoaAnswer::NotOwner
                }
                Err(e) => {
                    log::warn!("[dedibox] SOA lookup for {candidate} failed: {e}");
                    SoaAnswer::Failed(e.to_string())
                }
            }
        }
    }

    #[async_trait]
    impl ZoneResolver for SoaZoneResolver {
        async fn find_zone(&self, fqdn: &str) -> Result<String> {
            for candidate in zone_candidates(fqdn) {
                let answer = self.query_soa(&candidate).await;
                if let Some(found) = walk_step(fqdn, &candidate, answer) {
                    if let Ok(zone) = &found {
                        log::debug!("[dedibox] Zone of {fqdn} is {zone}");
                    }
                    return found;
                }
            }

            Err(DediboxError::ZoneResolution {
                fqdn: fqdn.to_string(),
                detail: "no SOA record found for any parent name".to_string(),
            })
        }
    }
}
