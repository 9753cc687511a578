mod common;

use listing_wizard::core::{ImageValidationPipeline, ProbeResolution, ProximityPointRegistry};
use listing_wizard::domain::{DistanceUnit, PersistedPoi, PoiCategory};
use listing_wizard::{ValidationKind, WizardConfig};

const TYPES: [(PoiCategory, &str); 3] = [
    (PoiCategory::Transit, "Metro Station"),
    (PoiCategory::Essential, "Pharmacy"),
    (PoiCategory::Utility, "Gym"),
];

#[test]
fn flatten_all_tracks_net_adds_in_category_order() {
    let mut registry = ProximityPointRegistry::new(DistanceUnit::Km);
    let mut ids = Vec::new();
    let mut seed: u32 = 7;

    for step in 0..60u32 {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let remove = seed % 3 == 0 && !ids.is_empty();
        if remove {
            let index = (seed as usize / 3) % ids.len();
            let id = ids.remove(index);
            assert!(registry.remove_point(id));
        } else {
            let (category, poi_type) = TYPES[(seed as usize >> 4) % TYPES.len()];
            let id = registry
                .add_point(category, poi_type, Some("Nearby"), &format!("{}", step % 9))
                .expect("valid point");
            ids.push(id);
        }

        let flat = registry.flatten_all();
        assert_eq!(flat.len(), ids.len());
        let ranks: Vec<usize> = flat
            .iter()
            .map(|poi| {
                let category = PoiCategory::for_type(&poi.poi_type).expect("known type");
                PoiCategory::ALL
                    .iter()
                    .position(|known| *known == category)
                    .expect("listed category")
            })
            .collect();
        assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
    }
}

#[test]
fn removing_unknown_id_changes_nothing() {
    let mut registry = ProximityPointRegistry::new(DistanceUnit::Km);
    registry
        .add_point(PoiCategory::Essential, "Hospital", None, "1.5")
        .expect("hospital");
    assert!(!registry.remove_point(uuid::Uuid::new_v4()));
    assert_eq!(registry.len(), 1);
}

#[test]
fn hydrate_reproduces_flattened_buckets() {
    let mut original = ProximityPointRegistry::new(DistanceUnit::Km);
    original.set_unit(DistanceUnit::Meter);
    original
        .add_point(PoiCategory::Utility, "ATM", Some("HDFC ATM"), "300")
        .expect("atm");
    original
        .add_point(PoiCategory::Transit, "Railway Station", None, "1200")
        .expect("station");
    original
        .add_point(PoiCategory::Transit, "Bus Stop", Some("Baner Phata"), "150")
        .expect("bus stop");
    original
        .add_point(PoiCategory::Essential, "School", Some("DPS"), "800.5")
        .expect("school");

    let flat = original.flatten_all();
    let mut restored = ProximityPointRegistry::new(DistanceUnit::Km);
    let issues = restored.hydrate(&flat);

    assert!(issues.is_empty());
    assert_eq!(restored.unit(), DistanceUnit::Meter);
    for category in PoiCategory::ALL {
        assert_eq!(
            restored.flatten_category(category),
            original.flatten_category(category),
            "bucket {category} differs"
        );
    }
}

#[test]
fn hydrate_files_unknown_types_under_utility() {
    let mut registry = ProximityPointRegistry::new(DistanceUnit::Km);
    let issues = registry.hydrate(&[
        PersistedPoi::new("Temple", "Dagdusheth", "3 km"),
        PersistedPoi::new("Bus Stop", "", "nowhere"),
    ]);
    assert_eq!(issues.len(), 2);
    let utility = registry.list_by_category(PoiCategory::Utility);
    assert_eq!(utility.len(), 1);
    assert_eq!(utility[0].poi_type, "Temple");
    assert!(registry.list_by_category(PoiCategory::Transit).is_empty());
}

#[test]
fn second_candidate_while_probing_is_rejected() {
    let mut pipeline = ImageValidationPipeline::new(&WizardConfig::default(), None);
    let pending = pipeline
        .begin_candidate(&common::image_url(1))
        .expect("first candidate");
    assert_eq!(pipeline.validating(), Some(pending.url()));

    let err = pipeline
        .begin_candidate(&common::image_url(2))
        .expect_err("probe running");
    assert_eq!(err.kind, ValidationKind::ProbeInProgress);

    assert_eq!(
        pipeline.resolve(pending, Ok(())).expect("commit"),
        ProbeResolution::Committed
    );
    assert!(pipeline.validating().is_none());
    pipeline
        .begin_candidate(&common::image_url(2))
        .expect("slot free again");
}

#[tokio::test]
async fn submittable_from_three_validated_images() {
    let mut pipeline = ImageValidationPipeline::new(&WizardConfig::default(), None);
    assert!(!pipeline.is_submittable());
    for n in 0..5 {
        pipeline
            .submit_candidate(&common::image_url(n))
            .await
            .expect("accepted");
        assert_eq!(pipeline.is_submittable(), n + 1 >= 3, "{} images", n + 1);
    }

    let err = pipeline
        .submit_candidate(&common::image_url(6))
        .await
        .expect_err("limit");
    assert_eq!(err.kind, ValidationKind::LimitReached);
    assert_eq!(pipeline.validated_urls().len(), 5);
}

#[tokio::test]
async fn malformed_urls_never_reach_the_probe() {
    let mut pipeline = ImageValidationPipeline::new(&WizardConfig::default(), None);
    for bad in ["", "ftp://cdn.example.com/a.jpg", "not a url", "https://"] {
        let err = pipeline.submit_candidate(bad).await.expect_err(bad);
        assert_eq!(err.kind, ValidationKind::InvalidFormat);
    }
    assert!(pipeline.validating().is_none());
    assert!(pipeline.images().is_empty());
}
