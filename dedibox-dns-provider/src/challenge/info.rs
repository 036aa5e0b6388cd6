//! Challenge record derivation (RFC 8555 §8.4)

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use crate::utils::domain::to_fqdn;

/// Label prepended to the validated domain.
pub const ACME_CHALLENGE_LABEL: &str = "_acme-challenge";

/// Name and value of the TXT record a CA expects for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeInfo {
    /// `_acme-challenge.<domain>.`
    pub fqdn: String,
    /// base64url(SHA-256(key authorization)), unpadded.
    pub value: String,
}

impl ChallengeInfo {
    /// Wildcard domains (`*.example.com`) validate on their base name.
    pub fn new(domain: &str, key_auth: &str) -> Self {
        let domain = domain.strip_prefix("*.").unwrap_or(domain);
        Self {
            fqdn: to_fqdn(&format!("{ACME_CHALLENGE_LABEL}.{domain}")),
            value: challenge_value(key_auth),
        }
    }
}

/// DNS-01 TXT value for a key authorization.
pub fn challenge_value(key_auth: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(key_auth.as_bytes()))
}
