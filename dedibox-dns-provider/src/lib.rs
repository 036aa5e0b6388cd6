//! # dedibox-dns-provider
//!
//! DNS-01 challenge support for zones hosted on the Scaleway Dedibox
//! (online.net) API, which only lets records change through zone *versions*.
//!
//! ## How it works
//!
//! | Phase | Steps |
//! |-------|-------|
//! | `present` | refuse if a temporary version exists → find the active version → create a temporary version → copy A/AAAA/CNAME/MX/SRV/TXT records into it → add the challenge TXT record → enable it |
//! | `cleanup` | fetch both versions → enable the original version again → delete the temporary one |
//!
//! The version UUIDs discovered by `present` are kept in memory, per zone, by the
//! [`DediboxProvider`] instance, so `cleanup` must run on the same instance.
//! Enable [`DediboxConfig::recovery_marker`] to let a fresh process clean up.
//!
//! ## Feature Flags
//!
//! - **`native-tls`** *(default)*: Use the platform's native TLS implementation.
//! - **`rustls`**: Use rustls.
//! - **`soa-resolver`** *(default)*: [`SoaZoneResolver`], locating zones via SOA lookups.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dedibox_dns_provider::{ChallengeProvider, DediboxConfig, DediboxProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = DediboxProvider::new(DediboxConfig::from_env()?)?;
//!
//!     provider.present("example.com", "token", "token.thumbprint").await?;
//!     // ... let the CA validate, polling for up to `provider.timeout().0` ...
//!     provider.cleanup("example.com", "token", "token.thumbprint").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Using the client directly
//!
//! ```rust,no_run
//! # use dedibox_dns_provider::*;
//! # async fn example() -> Result<()> {
//! let client = DediboxClient::new("api-token")?;
//! let active = client.find_active_version("example.com.").await?;
//! let records = client.list_records("example.com.", &active.uuid).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Client operations return [`Result<T, DediboxError>`](DediboxError):
//!
//! - [`DediboxError::Transport`]: the request could not be sent or answered
//! - [`DediboxError::UnexpectedStatus`]: non-2xx answer, with status and body
//! - [`DediboxError::Decode`]: the body did not match the expected JSON
//!
//! `present`/`cleanup` return a [`ChallengeError`] naming the failing
//! [`ChallengeStep`] and wrapping the cause. Nothing is retried or rolled back.

mod challenge;
mod client;
mod config;
mod error;
mod http_client;
mod traits;
mod types;
mod utils;

// Re-export error types
pub use error::{DediboxError, Result};

// Re-export configuration
pub use config::{
    DEFAULT_BASE_URL, DEFAULT_HTTP_TIMEOUT, DEFAULT_POLLING_INTERVAL,
    DEFAULT_PROPAGATION_TIMEOUT, DEFAULT_TEMP_VERSION_NAME, DEFAULT_TTL, DediboxConfig, env,
};

// Re-export traits
pub use traits::{ChallengeProvider, ZoneResolver};

// Re-export types
pub use types::{ApiRef, ChallengeSession, Record, RecordType, Version};

// Re-export the API client
pub use client::{
    CREATED_VERSION_NAME, DEFAULT_RECORD_PRIORITY, DediboxClient, RECOVERY_MARKER_NAME,
    RECOVERY_MARKER_PREFIX,
};

// Re-export the challenge coordinator
#[cfg(feature = "soa-resolver")]
pub use challenge::SoaZoneResolver;
pub use challenge::{
    ACME_CHALLENGE_LABEL, ChallengeError, ChallengeInfo, ChallengePhase, ChallengeStep,
    DediboxProvider, StaticZoneResolver, challenge_value,
};
