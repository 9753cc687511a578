use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::service::ListingService;
use crate::domain::{ListingId, ListingPayload, ListingRecord};
use crate::errors::RemoteError;

/// Listing service kept in process memory. Counts calls and can be told to
/// fail the next one, which is what tests and the CLI `--memory` mode need.
#[derive(Debug, Default)]
pub struct InMemoryListingService {
    records: Mutex<HashMap<ListingId, ListingRecord>>,
    failure: Mutex<Option<RemoteError>>,
    creates: AtomicUsize,
    updates: AtomicUsize,
    fetches: AtomicUsize,
}

impl InMemoryListingService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a stored listing, as if created earlier.
    pub fn insert(&self, payload: ListingPayload) -> ListingId {
        let record = ListingRecord::new(ListingId::new(), payload);
        let id = record.id;
        self.lock_records().insert(id, record);
        id
    }

    /// The next call of any kind returns `err` instead of running.
    pub fn fail_next(&self, err: RemoteError) {
        *self.failure.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(err);
    }

    pub fn create_calls(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn get(&self, id: ListingId) -> Option<ListingRecord> {
        self.lock_records().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock_records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_records(&self) -> std::sync::MutexGuard<'_, HashMap<ListingId, ListingRecord>> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_failure(&self) -> Result<(), RemoteError> {
        let injected = self
            .failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        match injected {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ListingService for InMemoryListingService {
    async fn create_listing(&self, payload: &ListingPayload) -> Result<ListingId, RemoteError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        Ok(self.insert(payload.clone()))
    }

    async fn update_listing(
        &self,
        id: ListingId,
        payload: &ListingPayload,
    ) -> Result<(), RemoteError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        let mut records = self.lock_records();
        let record = records
            .get_mut(&id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        record.listing = payload.clone();
        record.touch();
        Ok(())
    }

    async fn fetch_listing(&self, id: ListingId) -> Result<ListingRecord, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        self.get(id).ok_or_else(|| RemoteError::NotFound(id.to_string()))
    }
}
