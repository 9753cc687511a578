//! Remote listing collaborator consumed by the wizard.

use async_trait::async_trait;

use crate::domain::{ListingId, ListingPayload, ListingRecord};
use crate::errors::RemoteError;

/// Create, update, and fetch operations of the listing backend. The wizard
/// treats every call as opaque and fallible.
#[async_trait]
pub trait ListingService: Send + Sync {
    async fn create_listing(&self, payload: &ListingPayload) -> Result<ListingId, RemoteError>;

    async fn update_listing(
        &self,
        id: ListingId,
        payload: &ListingPayload,
    ) -> Result<(), RemoteError>;

    async fn fetch_listing(&self, id: ListingId) -> Result<ListingRecord, RemoteError>;
}
