//! Zone version endpoints

use serde::Serialize;

use crate::error::{DediboxError, Result};
use crate::types::Version;

use super::{CREATED_VERSION_NAME, DediboxClient};

#[derive(Serialize)]
struct CreateVersionRequest<'a> {
    name: &'a str,
}

impl DediboxClient {
    /// Lists every version of `zone` (`GET /domain/{domain}/version`).
    pub async fn list_versions(&self, zone: &str) -> Result<Vec<Version>> {
        let url = self.endpoint(zone, &["version"])?;
        self.get(&url).await
    }

    /// Returns the version currently served for `zone`.
    ///
    /// Fails with [`DediboxError::NotFound`] when no listed version is active.
    pub async fn find_active_version(&self, zone: &str) -> Result<Version> {
        self.list_versions(zone)
            .await?
            .into_iter()
            .find(|v| v.active)
            .ok_or_else(|| DediboxError::not_found(zone, "active version"))
    }

    /// First version of `zone` named `name`, or `None`.
    pub async fn find_version_by_name(&self, zone: &str, name: &str) -> Result<Option<Version>> {
        Ok(self
            .list_versions(zone)
            .await?
            .into_iter()
            .find(|v| v.name == name))
    }

    /// `GET /domain/{domain}/version/{uuid}`
    pub async fn get_version(&self, zone: &str, uuid: &str) -> Result<Version> {
        let url = self.endpoint(zone, &["version", uuid])?;
        self.get(&url).await
    }

    /// Creates a new, inactive and empty version.
    ///
    /// The payload always carries [`CREATED_VERSION_NAME`]; `name` is only
    /// logged. This mirrors the behaviour deployed against the API so far and is
    /// most likely a defect: a custom temporary label is checked for by
    /// `present` but never actually given to the created version.
    pub async fn create_version(&self, zone: &str, name: &str) -> Result<Version> {
        if name != CREATED_VERSION_NAME {
            log::warn!(
                "[dedibox] Requested version name '{name}' is ignored, creating '{CREATED_VERSION_NAME}'"
            );
        }

        let url = self.endpoint(zone, &["version"])?;
        self.post(
            &url,
            &CreateVersionRequest {
                name: CREATED_VERSION_NAME,
            },
        )
        .await
    }

    /// Deletes a version. The backend refuses to delete the active one.
    pub async fn delete_version(&self, zone: &str, uuid: &str) -> Result<()> {
        let url = self.endpoint(zone, &["version", uuid])?;
        self.delete(&url).await
    }

    /// Makes `uuid` the served version; the backend deactivates the previous one.
    pub async fn enable_version(&self, zone: &str, uuid: &str) -> Result<()> {
        let url = self.endpoint(zone, &["version", uuid, "enable"])?;
        self.patch_empty(&url).await
    }
}
