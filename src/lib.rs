//! Listing Wizard drives a multi-step property listing form: it collects
//! fields, proximity points, and validated images, gates navigation behind
//! per-step checks, and hands one payload to a listing service.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

pub use crate::config::{ConfigManager, WizardConfig};
pub use crate::core::{ListingService, WizardSession, WizardStep};
pub use crate::errors::{RemoteError, ValidationError, ValidationKind, WizardError};

/// Initializes global tracing. Safe to call more than once.
pub fn init() {
    utils::init_tracing();
}
