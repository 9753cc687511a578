//! The per-session aggregate of everything the wizard collects.

use std::sync::Arc;

use crate::config::WizardConfig;
use crate::core::images::{ImageProbe, ImageValidationPipeline};
use crate::core::proximity::{HydrationIssue, ProximityPointRegistry};
use crate::domain::{ListingFields, ListingRecord};

/// Form fields plus the proximity and image sub-stores. Owned by exactly one
/// session and never shared.
#[derive(Debug)]
pub struct WizardState {
    pub fields: ListingFields,
    pub proximity: ProximityPointRegistry,
    pub images: ImageValidationPipeline,
}

/// What hydration had to recover from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HydrationReport {
    pub poi_issues: Vec<HydrationIssue>,
    pub dropped_images: usize,
}

impl HydrationReport {
    pub fn is_clean(&self) -> bool {
        self.poi_issues.is_empty() && self.dropped_images == 0
    }

    pub fn messages(&self) -> Vec<String> {
        let mut messages: Vec<String> =
            self.poi_issues.iter().map(HydrationIssue::message).collect();
        if self.dropped_images > 0 {
            messages.push(format!(
                "{} image(s) beyond the limit were not loaded",
                self.dropped_images
            ));
        }
        messages
    }
}

impl WizardState {
    pub fn new(config: &WizardConfig, probe: Option<Arc<dyn ImageProbe>>) -> Self {
        Self {
            fields: ListingFields::default(),
            proximity: ProximityPointRegistry::new(config.default_distance_unit),
            images: ImageValidationPipeline::new(config, probe),
        }
    }

    /// Splits a persisted record back into form fields, categorized points,
    /// and image references.
    pub fn hydrate(&mut self, record: &ListingRecord, config: &WizardConfig) -> HydrationReport {
        let listing = &record.listing;
        self.fields = ListingFields::from_payload(listing);
        let poi_issues = self.proximity.hydrate_buckets(&listing.point_buckets());
        let dropped_images = self
            .images
            .hydrate(&listing.images, !config.revalidate_images_on_edit);
        tracing::info!(
            listing = %record.id,
            points = self.proximity.len(),
            images = self.images.images().len(),
            "wizard state hydrated"
        );
        HydrationReport {
            poi_issues,
            dropped_images,
        }
    }

    /// Discards everything collected, keeping the configured collaborators.
    pub fn clear(&mut self, config: &WizardConfig) {
        self.fields = ListingFields::default();
        self.proximity = ProximityPointRegistry::new(config.default_distance_unit);
        self.images.hydrate(&[], true);
    }
}
