use std::{
    fs,
    path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::{
    config::{tmp_path, write_atomic},
    core::service::ListingService,
    domain::{ListingId, ListingPayload, ListingRecord},
    errors::RemoteError,
};

const RECORD_EXTENSION: &str = "json";
const LISTINGS_DIR: &str = "listings";

/// Stores each listing as `<id>.json` under a single directory.
#[derive(Debug, Clone)]
pub struct JsonListingStore {
    root: PathBuf,
}

impl JsonListingStore {
    pub fn new(root: PathBuf) -> Result<Self, RemoteError> {
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// `listings/` under the given application directory.
    pub fn in_base_dir(base: &Path) -> Result<Self, RemoteError> {
        Self::new(base.join(LISTINGS_DIR))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn record_path(&self, id: ListingId) -> PathBuf {
        self.root.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    /// Ids of every stored listing, in ascending id order. Files that are not
    /// `<uuid>.json` are ignored.
    pub fn list_ids(&self) -> Result<Vec<ListingId>, RemoteError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            if let Some(id) = path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .and_then(ListingId::parse)
            {
                ids.push(id);
            }
        }
        ids.sort_by_key(|id| id.0);
        Ok(ids)
    }

    pub fn load(&self, id: ListingId) -> Result<ListingRecord, RemoteError> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(RemoteError::NotFound(id.to_string()));
        }
        let data = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn write(&self, record: &ListingRecord) -> Result<(), RemoteError> {
        let path = self.record_path(record.id);
        let json = serde_json::to_string_pretty(record)?;
        let tmp = tmp_path(&path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[async_trait]
impl ListingService for JsonListingStore {
    async fn create_listing(&self, payload: &ListingPayload) -> Result<ListingId, RemoteError> {
        let record = ListingRecord::new(ListingId::new(), payload.clone());
        self.write(&record)?;
        tracing::info!(
            listing = %record.id,
            path = %self.record_path(record.id).display(),
            "listing created"
        );
        Ok(record.id)
    }

    async fn update_listing(
        &self,
        id: ListingId,
        payload: &ListingPayload,
    ) -> Result<(), RemoteError> {
        let mut record = self.load(id)?;
        record.listing = payload.clone();
        record.touch();
        self.write(&record)?;
        tracing::info!(listing = %id, "listing updated");
        Ok(())
    }

    async fn fetch_listing(&self, id: ListingId) -> Result<ListingRecord, RemoteError> {
        self.load(id)
    }
}
