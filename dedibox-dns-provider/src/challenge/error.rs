//! Step-tagged challenge errors

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::DediboxError;

/// Which half of the challenge lifecycle failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengePhase {
    Present,
    Cleanup,
}

/// The step of `present` / `cleanup` that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeStep {
    ResolveZone,
    CheckTemporaryVersion,
    FindActiveVersion,
    CreateTemporaryVersion,
    DuplicateRecords,
    CreateChallengeRecord,
    WriteRecoveryMarker,
    EnableTemporaryVersion,
    LoadSession,
    FetchTemporaryVersion,
    FetchOriginalVersion,
    RestoreOriginalVersion,
    DeleteTemporaryVersion,
}

impl ChallengeStep {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResolveZone => "resolve_zone",
            Self::CheckTemporaryVersion => "check_temporary_version",
            Self::FindActiveVersion => "find_active_version",
            Self::CreateTemporaryVersion => "create_temporary_version",
            Self::DuplicateRecords => "duplicate_records",
            Self::CreateChallengeRecord => "create_challenge_record",
            Self::WriteRecoveryMarker => "write_recovery_marker",
            Self::EnableTemporaryVersion => "enable_temporary_version",
            Self::LoadSession => "load_session",
            Self::FetchTemporaryVersion => "fetch_temporary_version",
            Self::FetchOriginalVersion => "fetch_original_version",
            Self::RestoreOriginalVersion => "restore_original_version",
            Self::DeleteTemporaryVersion => "delete_temporary_version",
        }
    }
}

impl std::fmt::Display for ChallengeStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed `present` or `cleanup`, tagged with the step that stopped it.
#[derive(Debug, Clone, Error)]
#[error("[dedibox] {step} failed: {message}")]
pub struct ChallengeError {
    pub phase: ChallengePhase,
    pub step: ChallengeStep,
    /// Zone / version context of the failing step.
    pub message: String,
    pub source: DediboxError,
}

impl ChallengeError {
    pub fn new(
        phase: ChallengePhase,
        step: ChallengeStep,
        message: impl Into<String>,
        source: DediboxError,
    ) -> Self {
        Self {
            phase,
            step,
            message: message.into(),
            source,
        }
    }

    /// The client-level cause.
    pub fn kind(&self) -> &DediboxError {
        &self.source
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self.source, DediboxError::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.source, DediboxError::NotFound { .. })
    }
}
