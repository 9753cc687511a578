//! One wizard run: the aggregate, the sequencer, and the host collaborators.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::config::WizardConfig;
use crate::core::images::{
    ImageProbe, ImageValidationPipeline, PendingProbe, ProbeFailure, ProbeResolution,
};
use crate::core::notifier::{NoticeKind, Notifier, TracingNotifier};
use crate::core::sequencer::StepSequencer;
use crate::core::service::ListingService;
use crate::core::steps::WizardStep;
use crate::core::store::WizardState;
use crate::core::submission::{SubmissionAssembler, SubmissionOutcome};
use crate::domain::{
    DistanceUnit, Furnishing, ListingFields, ListingGoal, ListingId, Ownership, PoiCategory,
    PropertyType,
};
use crate::errors::{ValidationError, ValidationKind, WizardError};

/// Whether submission creates a new listing or updates an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Create,
    Edit(ListingId),
}

pub struct WizardSession {
    pub(crate) state: WizardState,
    pub(crate) sequencer: StepSequencer,
    mode: SessionMode,
    config: WizardConfig,
    probe: Option<Arc<dyn ImageProbe>>,
    notifier: Arc<dyn Notifier>,
    pub(crate) submission_pending: bool,
    last_submitted: Option<ListingId>,
}

impl fmt::Debug for WizardSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardSession")
            .field("mode", &self.mode)
            .field("current", &self.sequencer.current_step())
            .field("status", &self.sequencer.status())
            .field("submission_pending", &self.submission_pending)
            .field("last_submitted", &self.last_submitted)
            .finish()
    }
}

impl WizardSession {
    /// Empty session in create mode, reporting through `tracing`.
    pub fn new(config: WizardConfig) -> Self {
        Self {
            state: WizardState::new(&config, None),
            sequencer: StepSequencer::new(),
            mode: SessionMode::Create,
            config,
            probe: None,
            notifier: Arc::new(TracingNotifier),
            submission_pending: false,
            last_submitted: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Installs the image probe. Images collected so far are discarded.
    pub fn with_probe(mut self, probe: Arc<dyn ImageProbe>) -> Self {
        self.state.images = ImageValidationPipeline::new(&self.config, Some(probe.clone()));
        self.probe = Some(probe);
        self
    }

    /// Loads listing `id` into this session and switches it to edit mode.
    ///
    /// A failed fetch is reported and returned; there is no fallback to an
    /// empty form.
    pub async fn open_for_edit(
        mut self,
        service: &dyn ListingService,
        id: ListingId,
    ) -> Result<Self, WizardError> {
        let record = match service.fetch_listing(id).await {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(listing = %id, error = %err, "could not load listing for edit");
                self.notifier.remote(&err);
                return Err(err.into());
            }
        };

        let report = self.state.hydrate(&record, &self.config);
        for message in report.messages() {
            tracing::warn!(listing = %id, "{message}");
            self.notifier.notify(NoticeKind::Warning, &message);
        }
        if self.config.revalidate_images_on_edit {
            self.revalidate_images().await;
        }

        self.mode = SessionMode::Edit(id);
        self.sequencer = StepSequencer::new();
        self.sequencer.mark_valid_steps_completed(&self.state, &self.config);
        tracing::info!(
            listing = %id,
            completed = self.sequencer.completed_steps().len(),
            "listing opened for edit"
        );
        Ok(self)
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn fields(&self) -> &ListingFields {
        &self.state.fields
    }

    pub fn config(&self) -> &WizardConfig {
        &self.config
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    pub fn current_step(&self) -> WizardStep {
        self.sequencer.current_step()
    }

    pub fn is_submitting(&self) -> bool {
        self.submission_pending
    }

    /// Id returned by the last successful submission.
    pub fn last_submitted(&self) -> Option<ListingId> {
        self.last_submitted
    }

    fn report<T>(&self, result: Result<T, ValidationError>) -> Result<T, ValidationError> {
        if let Err(err) = &result {
            self.notifier.validation(err);
        }
        result
    }

    fn guard(&self) -> Result<(), ValidationError> {
        self.report(self.sequencer.ensure_active())
    }

    /// Applies `edit` to the form fields. The goal is not reachable from
    /// here; use [`set_goal`](Self::set_goal).
    pub fn edit_fields<F>(&mut self, edit: F) -> Result<(), ValidationError>
    where
        F: FnOnce(&mut ListingFields),
    {
        self.guard()?;
        edit(&mut self.state.fields);
        Ok(())
    }

    /// Sets a field by key. Text keys take the raw value; `property_type`,
    /// `furnishing`, and `ownership` are parsed (an empty value clears them).
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        self.guard()?;
        let result = Self::apply_field(&mut self.state.fields, key, value);
        self.report(result)
    }

    fn apply_field(
        fields: &mut ListingFields,
        key: &str,
        value: &str,
    ) -> Result<(), ValidationError> {
        let value = value.trim();
        match key {
            "property_type" | "type" => {
                fields.property_type =
                    parse_choice(value, "property_type", "property type", PropertyType::parse)?;
            }
            "furnishing" => {
                fields.furnishing =
                    parse_choice(value, "furnishing", "furnishing status", Furnishing::parse)?;
            }
            "ownership" => {
                fields.ownership = parse_choice(value, "ownership", "ownership", Ownership::parse)?;
            }
            _ => {
                let slot = fields.text_mut(key).ok_or_else(|| {
                    ValidationError::new(
                        ValidationKind::InvalidField,
                        format!("Unknown field `{key}`"),
                    )
                })?;
                *slot = value.to_string();
            }
        }
        Ok(())
    }

    /// Adds an amenity unless an equal one (ignoring case) is already listed.
    pub fn add_amenity(&mut self, amenity: &str) -> Result<bool, ValidationError> {
        self.guard()?;
        let amenity = amenity.trim();
        if amenity.is_empty() {
            return self.report(Err(ValidationError::invalid(
                "amenities",
                "Amenity names cannot be blank",
            )));
        }
        let amenities = &mut self.state.fields.amenities;
        if amenities.iter().any(|known| known.eq_ignore_ascii_case(amenity)) {
            return Ok(false);
        }
        amenities.push(amenity.to_string());
        Ok(true)
    }

    pub fn remove_amenity(&mut self, amenity: &str) -> Result<bool, ValidationError> {
        self.guard()?;
        let amenities = &mut self.state.fields.amenities;
        let before = amenities.len();
        amenities.retain(|known| !known.eq_ignore_ascii_case(amenity.trim()));
        Ok(amenities.len() != before)
    }

    /// Changes the listing goal. Returns the completed steps that now need
    /// validating again; empty when the goal did not change.
    pub fn set_goal(&mut self, goal: ListingGoal) -> Result<Vec<WizardStep>, ValidationError> {
        self.guard()?;
        let previous = self.state.fields.goal();
        if previous == Some(goal) {
            return Ok(Vec::new());
        }
        self.state.fields.set_goal(Some(goal));
        let evicted = self.sequencer.evict_goal_dependent();
        tracing::info!(
            from = ?previous,
            to = %goal,
            evicted = evicted.len(),
            "listing goal changed"
        );
        if !evicted.is_empty() {
            let labels: Vec<String> = evicted.iter().map(ToString::to_string).collect();
            self.notifier.notify(
                NoticeKind::Warning,
                &format!("Goal changed to {goal}; review {}", labels.join(", ")),
            );
        }
        Ok(evicted)
    }

    /// Switches the session distance unit. Only allowed on the first
    /// proximity step, before any point is entered with the old unit.
    pub fn set_distance_unit(&mut self, unit: DistanceUnit) -> Result<(), ValidationError> {
        self.guard()?;
        if self.current_step() != WizardStep::first_proximity() {
            return self.report(Err(ValidationError::for_field(
                ValidationKind::UnitLocked,
                "unit",
                format!(
                    "The distance unit can only be changed on `{}`",
                    WizardStep::first_proximity().label()
                ),
            )));
        }
        self.state.proximity.set_unit(unit);
        tracing::debug!(%unit, "distance unit changed");
        Ok(())
    }

    pub fn add_point(
        &mut self,
        category: PoiCategory,
        poi_type: &str,
        name: Option<&str>,
        distance_value: &str,
    ) -> Result<Uuid, ValidationError> {
        self.guard()?;
        let result = self
            .state
            .proximity
            .add_point(category, poi_type, name, distance_value);
        self.report(result)
    }

    pub fn remove_point(&mut self, id: Uuid) -> Result<bool, ValidationError> {
        self.guard()?;
        Ok(self.state.proximity.remove_point(id))
    }

    /// Validates and commits an image candidate in one call.
    pub async fn submit_image(&mut self, url: &str) -> Result<ProbeResolution, ValidationError> {
        self.guard()?;
        let result = self.state.images.submit_candidate(url).await;
        self.report(result)
    }

    /// First half of an image submission for hosts that probe out of band.
    pub fn begin_image(&mut self, url: &str) -> Result<PendingProbe, ValidationError> {
        self.guard()?;
        let result = self.state.images.begin_candidate(url);
        self.report(result)
    }

    pub fn resolve_image(
        &mut self,
        pending: PendingProbe,
        outcome: Result<(), ProbeFailure>,
    ) -> Result<ProbeResolution, ValidationError> {
        let result = self.state.images.resolve(pending, outcome);
        self.report(result)
    }

    pub fn remove_image(&mut self, url: &str) -> Result<bool, ValidationError> {
        self.guard()?;
        Ok(self.state.images.remove_image(url))
    }

    /// Probes images loaded as pending and reports the ones that failed.
    pub async fn revalidate_images(&mut self) -> Vec<String> {
        let failed = self.state.images.revalidate_pending().await;
        for url in &failed {
            self.notifier.notify(
                NoticeKind::Warning,
                &format!("Image {url} could not be loaded and was removed"),
            );
        }
        failed
    }

    pub fn advance(&mut self) -> Result<WizardStep, ValidationError> {
        let result = self.sequencer.advance(&self.state, &self.config);
        self.report(result)
    }

    pub fn go_to(&mut self, step_id: u8) -> Result<WizardStep, ValidationError> {
        let result = self.sequencer.go_to(step_id, &self.state);
        self.report(result)
    }

    pub fn go_back(&mut self) -> Option<WizardStep> {
        self.sequencer.go_back(&self.state)
    }

    /// Validates, assembles, and hands the listing to `service`.
    pub async fn submit(
        &mut self,
        service: &dyn ListingService,
    ) -> Result<SubmissionOutcome, WizardError> {
        SubmissionAssembler::submit(self, service).await
    }

    /// Called after the service accepted the listing: the collected data is
    /// discarded and the sequencer is closed.
    pub(crate) fn complete_submission(&mut self, id: ListingId) {
        self.state.images.reset();
        self.state.clear(&self.config);
        self.sequencer = StepSequencer::new();
        self.sequencer.mark_submitted();
        self.last_submitted = Some(id);
    }

    /// Exit without submitting. In-flight probe results are ignored afterwards.
    pub fn teardown(&mut self) {
        self.state.images.reset();
        tracing::debug!(mode = ?self.mode, "wizard session torn down");
    }

    /// Fresh create-mode session with the same config and collaborators.
    pub fn start_over(&mut self) {
        self.teardown();
        self.state = WizardState::new(&self.config, self.probe.clone());
        self.sequencer = StepSequencer::new();
        self.mode = SessionMode::Create;
        self.submission_pending = false;
    }
}

fn parse_choice<T>(
    value: &str,
    field: &'static str,
    label: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Option<T>, ValidationError> {
    if value.is_empty() {
        return Ok(None);
    }
    parse(value)
        .map(Some)
        .ok_or_else(|| ValidationError::invalid(field, format!("`{value}` is not a valid {label}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notifier::RecordingNotifier;

    fn session() -> (WizardSession, RecordingNotifier) {
        let notifier = RecordingNotifier::new();
        let session =
            WizardSession::new(WizardConfig::default()).with_notifier(Arc::new(notifier.clone()));
        (session, notifier)
    }

    #[test]
    fn failed_advance_is_notified_once() {
        let (mut session, notifier) = session();
        let err = session.advance().expect_err("empty step");
        assert_eq!(err.field, Some("goal"));
        assert_eq!(notifier.count(NoticeKind::Validation), 1);
        assert_eq!(session.current_step(), WizardStep::GoalAndType);
    }

    #[test]
    fn set_field_parses_choices_and_rejects_unknown_keys() {
        let (mut session, _) = session();
        session.set_field("type", "flat").expect("type");
        session.set_field("furnishing", "semi-furnished").expect("furnishing");
        session.set_field("rent", " 18000 ").expect("rent");
        assert_eq!(session.fields().property_type, Some(PropertyType::Flat));
        assert_eq!(session.fields().price, "18000");

        let err = session.set_field("colour", "blue").expect_err("unknown key");
        assert_eq!(err.kind, ValidationKind::InvalidField);
        let err = session.set_field("ownership", "rented").expect_err("bad ownership");
        assert_eq!(err.field, Some("ownership"));
    }

    #[test]
    fn repeated_goal_is_a_no_op() {
        let (mut session, notifier) = session();
        session.set_goal(ListingGoal::Rent).expect("goal");
        session.set_field("type", "flat").expect("type");
        session.advance().expect("advance");

        assert!(session.set_goal(ListingGoal::Rent).expect("same goal").is_empty());
        assert!(session.sequencer().is_completed(WizardStep::GoalAndType));

        let evicted = session.set_goal(ListingGoal::Sale).expect("new goal");
        assert_eq!(evicted, vec![WizardStep::GoalAndType]);
        assert_eq!(notifier.count(NoticeKind::Warning), 1);
    }

    #[test]
    fn unit_only_changes_on_first_proximity_step() {
        let (mut session, _) = session();
        let err = session
            .set_distance_unit(DistanceUnit::Meter)
            .expect_err("locked on step 1");
        assert_eq!(err.kind, ValidationKind::UnitLocked);
        assert_eq!(session.state().proximity.unit(), DistanceUnit::Km);
    }

    #[test]
    fn amenities_are_deduplicated_ignoring_case() {
        let (mut session, _) = session();
        assert!(session.add_amenity("Lift").expect("add"));
        assert!(!session.add_amenity("lift").expect("duplicate"));
        assert!(session.add_amenity("  ").is_err());
        assert!(session.remove_amenity("LIFT").expect("remove"));
        assert!(session.fields().amenities.is_empty());
    }

    #[test]
    fn teardown_discards_in_flight_probe() {
        let (mut session, _) = session();
        let pending = session
            .begin_image("https://cdn.example.com/a.jpg")
            .expect("begin");
        session.teardown();
        let resolution = session.resolve_image(pending, Ok(())).expect("resolve");
        assert_eq!(resolution, ProbeResolution::Discarded);
        assert!(session.state().images.images().is_empty());
    }

    #[test]
    fn start_over_returns_to_create_mode() {
        let (mut session, _) = session();
        session.set_goal(ListingGoal::Flatmate).expect("goal");
        session.start_over();
        assert_eq!(session.mode(), SessionMode::Create);
        assert_eq!(session.fields().goal(), None);
        assert_eq!(session.current_step(), WizardStep::GoalAndType);
    }
}
