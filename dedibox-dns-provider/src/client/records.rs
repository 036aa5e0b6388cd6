//! Zone record endpoints

use crate::error::Result;
use crate::types::Record;

use super::{DEFAULT_RECORD_PRIORITY, DediboxClient};

/// Name of the TXT record holding the original active version UUID.
pub const RECOVERY_MARKER_NAME: &str = "lego";
/// Prefix of the recovery marker value.
pub const RECOVERY_MARKER_PREFIX: &str = "active_version:";

impl DediboxClient {
    /// All records of a version (`GET /domain/{domain}/version/{uuid}/zone`).
    pub async fn list_records(&self, zone: &str, version_uuid: &str) -> Result<Vec<Record>> {
        let url = self.endpoint(zone, &["version", version_uuid, "zone"])?;
        self.get(&url).await
    }

    /// First record matching both `name` and `record_type`, filtered client-side.
    pub async fn get_record(
        &self,
        zone: &str,
        version_uuid: &str,
        name: &str,
        record_type: &str,
    ) -> Result<Option<Record>> {
        Ok(self
            .list_records(zone, version_uuid)
            .await?
            .into_iter()
            .find(|r| r.matches(name, record_type)))
    }

    /// Creates `record` in a version and returns the API's copy of it.
    ///
    /// `priority` is always sent as [`DEFAULT_RECORD_PRIORITY`], so MX/SRV
    /// priorities of the source are lost. Kept as the API has been driven so far;
    /// likely a defect for zones relying on MX ordering.
    pub async fn create_record(
        &self,
        zone: &str,
        version_uuid: &str,
        record: &Record,
    ) -> Result<Record> {
        let url = self.endpoint(zone, &["version", version_uuid, "zone"])?;
        let payload = Record {
            priority: DEFAULT_RECORD_PRIORITY,
            ..record.clone()
        };
        self.post(&url, &payload).await
    }

    /// Copies every allow-listed record of `source_uuid` into `target_uuid`.
    ///
    /// Records are created one at a time; the first failure is returned and
    /// whatever was already copied stays in the target. Returns the number of
    /// records created.
    pub async fn duplicate_records(
        &self,
        zone: &str,
        source_uuid: &str,
        target_uuid: &str,
    ) -> Result<usize> {
        let records = self.list_records(zone, source_uuid).await?;
        let total = records.len();

        let mut copied = 0;
        for record in records.into_iter().filter(Record::is_duplicable) {
            let copy = Record {
                priority: 0,
                ..record
            };
            self.create_record(zone, target_uuid, &copy).await?;
            copied += 1;
        }

        log::debug!(
            "[dedibox] Duplicated {copied}/{total} records from version {source_uuid} to {target_uuid}"
        );
        Ok(copied)
    }

    /// Reads the original active version UUID from a version's recovery marker.
    pub async fn read_version_uuid(
        &self,
        zone: &str,
        version_uuid: &str,
    ) -> Result<Option<String>> {
        let marker = self
            .get_record(zone, version_uuid, RECOVERY_MARKER_NAME, "TXT")
            .await?;

        Ok(marker.and_then(|r| {
            r.value
                .strip_prefix(RECOVERY_MARKER_PREFIX)
                .filter(|uuid| !uuid.is_empty())
                .map(str::to_string)
        }))
    }
}

/// Marker record written into a temporary version when recovery is enabled.
pub(crate) fn recovery_marker(active_version_uuid: &str, ttl: u32) -> Record {
    Record::txt(
        RECOVERY_MARKER_NAME,
        format!("{RECOVERY_MARKER_PREFIX}{active_version_uuid}"),
        ttl,
    )
}
