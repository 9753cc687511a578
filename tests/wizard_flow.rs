mod common;

use common::{add_images, session, walk_to_images};
use listing_wizard::core::{NoticeKind, SubmissionAssembler, SubmissionOutcome, WizardStep};
use listing_wizard::domain::{ListingGoal, PersistedPoi, PoiCategory};
use listing_wizard::storage::InMemoryListingService;
use listing_wizard::{RemoteError, ValidationKind};

#[tokio::test]
async fn rent_flat_listing_submits_one_payload() {
    let (mut session, notifier) = session();
    let service = InMemoryListingService::new();

    walk_to_images(&mut session, ListingGoal::Rent);
    assert_eq!(session.current_step(), WizardStep::Images);
    add_images(&mut session, 3).await;
    session.advance().expect("images");

    assert_eq!(session.current_step(), WizardStep::ProximityTransit);
    session
        .add_point(PoiCategory::Transit, "Bus Stop", None, "2")
        .expect("bus stop");
    session.advance().expect("transit");
    session.advance().expect("essentials");
    assert_eq!(session.current_step(), WizardStep::ProximityUtility);

    let outcome = session.submit(&service).await.expect("submitted");
    let SubmissionOutcome::Created(id) = outcome else {
        panic!("expected a created listing, got {outcome:?}");
    };

    assert_eq!(service.create_calls(), 1);
    assert_eq!(service.update_calls(), 0);
    let stored = service.get(id).expect("stored listing").listing;
    assert_eq!(
        stored.transit_points,
        vec![PersistedPoi::new("Bus Stop", "Bus Stop", "2 km")]
    );
    assert_eq!(stored.images.len(), 3);
    assert!(stored.essential_points.is_empty());

    assert!(session.sequencer().is_submitted());
    assert_eq!(session.last_submitted(), Some(id));
    assert_eq!(session.fields().goal(), None);
    assert_eq!(notifier.count(NoticeKind::Success), 1);
}

#[tokio::test]
async fn payload_serializes_persisted_shape() {
    let (mut session, _) = session();
    walk_to_images(&mut session, ListingGoal::Rent);
    add_images(&mut session, 3).await;
    session.advance().expect("images");
    session
        .add_point(PoiCategory::Transit, "bus stop", None, "2")
        .expect("bus stop");

    let payload = SubmissionAssembler::build_payload(session.state(), session.config())
        .expect("payload");
    let json = serde_json::to_value(&payload).expect("serialize");
    assert_eq!(
        json["transitPoints"],
        serde_json::json!([{"type": "Bus Stop", "name": "Bus Stop", "distance": "2 km"}])
    );
    assert_eq!(json["propertyType"], "flat");
    assert_eq!(json["images"].as_array().map(Vec::len), Some(3));
    assert!(json.get("preferredGender").is_none());
}

#[test]
fn bathroom_cap_keeps_sequencer_on_step_two() {
    let (mut session, notifier) = session();
    session.set_goal(ListingGoal::Rent).expect("goal");
    session.set_field("type", "flat").expect("type");
    session.advance().expect("step 1");
    common::fill_location_and_pricing(&mut session);
    session.set_field("bathrooms", "21").expect("raw value");

    let err = session.advance().expect_err("over the cap");
    assert_eq!(err.field, Some("bathrooms"));
    assert_eq!(session.current_step().id(), 2);
    assert_eq!(notifier.count(NoticeKind::Validation), 1);
}

#[test]
fn flatmate_to_rent_revalidates_step_five() {
    let (mut session, _) = session();
    walk_to_images(&mut session, ListingGoal::Flatmate);
    assert!(session.sequencer().is_completed(WizardStep::DescriptionAndRequirements));

    let evicted = session.set_goal(ListingGoal::Rent).expect("goal change");
    assert!(evicted.contains(&WizardStep::DescriptionAndRequirements));
    assert!(!session.sequencer().is_completed(WizardStep::DescriptionAndRequirements));

    // Clearing the flatmate-only fields must not block step 5 under Rent.
    session.set_field("preferred_gender", "").expect("clear");
    session.set_field("preferred_occupation", "").expect("clear");
    session.go_to(5).expect("step 5 is before the current step");
    session.advance().expect("step 5 validates without flatmate fields");
    assert_eq!(session.current_step(), WizardStep::Images);
}

#[test]
fn forward_jump_to_unvisited_step_is_locked() {
    let (mut session, _) = session();
    walk_to_images(&mut session, ListingGoal::Rent);
    let err = session.go_to(8).expect_err("not visited");
    assert_eq!(err.kind, ValidationKind::StepLocked);
    assert_eq!(session.go_to(3).expect("visited"), WizardStep::PropertyDetails);
    assert_eq!(session.go_to(5).expect("completed"), WizardStep::DescriptionAndRequirements);

    // Step 6 was open but never completed, so only `advance` reaches it again.
    let err = session.go_to(6).expect_err("not completed");
    assert_eq!(err.kind, ValidationKind::StepLocked);
    assert_eq!(session.advance().expect("advance"), WizardStep::Images);
}

#[tokio::test]
async fn submit_before_final_step_is_rejected() {
    let (mut session, _) = session();
    let service = InMemoryListingService::new();
    walk_to_images(&mut session, ListingGoal::Rent);

    let err = session.submit(&service).await.expect_err("on step 6");
    assert_eq!(err.validation_kind(), Some(ValidationKind::NotOnFinalStep));
    assert_eq!(service.create_calls(), 0);
}

#[tokio::test]
async fn remote_failure_keeps_session_for_retry() {
    let (mut session, notifier) = session();
    let service = InMemoryListingService::new();
    walk_to_images(&mut session, ListingGoal::Rent);
    add_images(&mut session, 3).await;
    session.advance().expect("images");
    session.advance().expect("transit");
    session.advance().expect("essentials");

    service.fail_next(RemoteError::Network("connection reset".into()));
    let err = session.submit(&service).await.expect_err("network failure");
    assert!(err.validation_kind().is_none());
    assert_eq!(notifier.count(NoticeKind::Remote), 1);
    assert_eq!(session.current_step(), WizardStep::ProximityUtility);
    assert_eq!(session.fields().city, "Pune");
    assert_eq!(session.state().images.validated_count(), 3);
    assert!(!session.is_submitting());

    let outcome = session.submit(&service).await.expect("retry succeeds");
    assert!(matches!(outcome, SubmissionOutcome::Created(_)));
    assert_eq!(service.create_calls(), 2);
    assert_eq!(service.len(), 1);
}

#[tokio::test]
async fn second_submission_while_pending_is_rejected() {
    let (mut session, _) = session();
    walk_to_images(&mut session, ListingGoal::Rent);
    add_images(&mut session, 3).await;
    session.advance().expect("images");
    session.advance().expect("transit");
    session.advance().expect("essentials");

    let ticket = SubmissionAssembler::prepare(&mut session).expect("first");
    assert!(session.is_submitting());
    let err = SubmissionAssembler::prepare(&mut session).expect_err("second");
    assert_eq!(err.kind, ValidationKind::SubmissionInProgress);

    let id = listing_wizard::domain::ListingId::new();
    let outcome = SubmissionAssembler::finish(&mut session, ticket, Ok(id)).expect("finish");
    assert_eq!(outcome, SubmissionOutcome::Created(id));

    let err = session.advance().expect_err("closed");
    assert_eq!(err.kind, ValidationKind::AlreadySubmitted);
}

#[tokio::test]
async fn images_step_requires_three_validated_images() {
    let (mut session, _) = session();
    walk_to_images(&mut session, ListingGoal::Rent);
    add_images(&mut session, 2).await;
    let err = session
        .submit_image("https://cdn.example.com/broken.jpg")
        .await
        .expect_err("probe failure");
    assert_eq!(err.kind, ValidationKind::LoadFailed);

    let err = session.advance().expect_err("only two images");
    assert_eq!(err.kind, ValidationKind::InsufficientImages);
    session
        .submit_image(&common::image_url(9))
        .await
        .expect("third image");
    session.advance().expect("three images");
}
