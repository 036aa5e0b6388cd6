//! Dedibox API 数据模型

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::datetime::parse_api_timestamp;

// ============ 记录类型 ============

/// Record types eligible for duplication between zone versions.
///
/// Anything the API returns outside this set (NS, SOA, CAA, ...) is left behind
/// when a version is copied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordType {
    A,
    #[serde(rename = "AAAA")]
    Aaaa,
    #[serde(rename = "CNAME")]
    Cname,
    #[serde(rename = "MX")]
    Mx,
    #[serde(rename = "SRV")]
    Srv,
    #[serde(rename = "TXT")]
    Txt,
}

impl RecordType {
    /// All duplicable types.
    pub const ALL: [Self; 6] = [
        Self::A,
        Self::Aaaa,
        Self::Cname,
        Self::Mx,
        Self::Srv,
        Self::Txt,
    ];

    /// Exact, case-sensitive match against the wire representation.
    pub fn parse(record_type: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == record_type)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Srv => "SRV",
            Self::Txt => "TXT",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============ Record ============

/// A DNS resource record inside a zone version.
///
/// Identity within a version is `(name, record_type)`; the API may hold duplicates.
/// Absent fields decode to their empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "type", default)]
    pub record_type: String,
    /// Name relative to the zone.
    #[serde(default)]
    pub name: String,
    #[serde(rename = "data", default)]
    pub value: String,
    #[serde(default)]
    pub ttl: u32,
    /// Meaningful for MX/SRV only.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub priority: u32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(v: &u32) -> bool {
    *v == 0
}

impl Record {
    /// Builds a TXT record.
    pub fn txt(name: impl Into<String>, value: impl Into<String>, ttl: u32) -> Self {
        Self {
            record_type: RecordType::Txt.as_str().to_string(),
            name: name.into(),
            value: value.into(),
            ttl,
            priority: 0,
        }
    }

    /// Whether this record's type is on the duplication allow-list.
    pub fn is_duplicable(&self) -> bool {
        RecordType::parse(&self.record_type).is_some()
    }

    pub fn matches(&self, name: &str, record_type: &str) -> bool {
        self.name == name && self.record_type == record_type
    }
}

// ============ Version ============

/// Opaque `{"$ref": "..."}` back-reference returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRef {
    #[serde(rename = "$ref", default)]
    pub reference: String,
}

/// A snapshot of a zone's record set.
///
/// Exactly one version of a zone is active at a time; the backend enforces it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Empty when the API omits it.
    #[serde(rename = "uuid_ref", default)]
    pub uuid: String,
    #[serde(rename = "Name", alias = "name", default)]
    pub name: String,
    /// Raw creation date as sent by the API, see [`Version::created_at`].
    #[serde(default)]
    pub creation_date: String,
    #[serde(default)]
    pub domain: ApiRef,
    #[serde(default)]
    pub zone: ApiRef,
    #[serde(default)]
    pub active: bool,
}

impl Version {
    /// Parsed creation date, `None` when the API format is not recognised.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_api_timestamp(&self.creation_date)
    }
}

// ============ Challenge ============

/// Identifiers recorded by `present` and consumed by `cleanup` for one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeSession {
    /// Zone in FQDN form (`example.com.`).
    pub zone: String,
    /// Version that was active before the challenge was staged.
    pub active_version_uuid: String,
    /// Temporary version holding the challenge record.
    pub temp_version_uuid: String,
}
