#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use listing_wizard::core::{ImageProbe, ProbeFailure, RecordingNotifier, WizardSession};
use listing_wizard::domain::ListingGoal;
use listing_wizard::WizardConfig;

/// Probe that rejects any URL containing `broken`.
pub struct FakeProbe;

#[async_trait]
impl ImageProbe for FakeProbe {
    async fn probe(&self, url: &str) -> Result<(), ProbeFailure> {
        if url.contains("broken") {
            Err(ProbeFailure("not an image".into()))
        } else {
            Ok(())
        }
    }
}

pub fn session() -> (WizardSession, RecordingNotifier) {
    session_with(WizardConfig::default())
}

pub fn session_with(config: WizardConfig) -> (WizardSession, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let session = WizardSession::new(config)
        .with_notifier(Arc::new(notifier.clone()))
        .with_probe(Arc::new(FakeProbe));
    (session, notifier)
}

pub fn image_url(n: usize) -> String {
    format!("https://cdn.example.com/listing/{n}.jpg")
}

/// Fills the Location & Pricing step with valid values.
pub fn fill_location_and_pricing(session: &mut WizardSession) {
    for (key, value) in [
        ("city", "Pune"),
        ("state", "Maharashtra"),
        ("district", "Pune"),
        ("pincode", "411045"),
        ("rent", "20000"),
        ("bedrooms", "2"),
        ("bathrooms", "2"),
    ] {
        session.set_field(key, value).expect("valid field");
    }
}

/// Walks a listing with `goal` from step 1 to the Images step.
pub fn walk_to_images(session: &mut WizardSession, goal: ListingGoal) {
    session.set_goal(goal).expect("goal");
    session.set_field("type", "flat").expect("type");
    session.advance().expect("step 1");
    fill_location_and_pricing(session);
    session.advance().expect("step 2");
    session.advance().expect("step 3");
    session.advance().expect("step 4");
    if goal == ListingGoal::Flatmate {
        session.set_field("preferred_gender", "Any").expect("gender");
        session
            .set_field("preferred_occupation", "Working professional")
            .expect("occupation");
    }
    session.advance().expect("step 5");
}

/// Adds `count` images through the probe.
pub async fn add_images(session: &mut WizardSession, count: usize) {
    for n in 0..count {
        session.submit_image(&image_url(n)).await.expect("image accepted");
    }
}
