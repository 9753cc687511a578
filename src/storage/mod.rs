//! Listing service adapters used by the CLI and the integration tests.

pub mod json_backend;
pub mod memory;

pub use json_backend::JsonListingStore;
pub use memory::InMemoryListingService;
