//! DNS-01 challenge coordination on top of [`DediboxClient`](crate::DediboxClient)

mod error;
mod info;
mod provider;
mod resolver;

pub use error::{ChallengeError, ChallengePhase, ChallengeStep};
pub use info::{ACME_CHALLENGE_LABEL, ChallengeInfo, challenge_value};
pub use provider::DediboxProvider;
#[cfg(feature = "soa-resolver")]
pub use resolver::SoaZoneResolver;
pub use resolver::StaticZoneResolver;
