//! Final validation, payload assembly, and dispatch to the listing service.

use crate::config::WizardConfig;
use crate::core::notifier::NoticeKind;
use crate::core::service::ListingService;
use crate::core::session::{SessionMode, WizardSession};
use crate::core::steps::effective_steps;
use crate::core::store::WizardState;
use crate::core::validation::{
    optional_text, parse_count, parse_optional_amount, parse_optional_date,
    parse_optional_count, parse_optional_floor, parse_optional_total_floors, parse_pincode,
    parse_price, required_text, validate_flatmate_requirements, validate_step,
};
use crate::domain::{ListingGoal, ListingId, ListingPayload, PoiCategory};
use crate::errors::{RemoteError, ValidationError, ValidationKind, WizardError};

/// A prepared submission. Holding one means the session is marked as
/// submitting until [`SubmissionAssembler::finish`] is called.
#[derive(Debug, Clone)]
pub struct SubmissionTicket {
    mode: SessionMode,
    payload: ListingPayload,
}

impl SubmissionTicket {
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    pub fn payload(&self) -> &ListingPayload {
        &self.payload
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Created(ListingId),
    Updated(ListingId),
}

impl SubmissionOutcome {
    pub fn listing_id(self) -> ListingId {
        match self {
            SubmissionOutcome::Created(id) | SubmissionOutcome::Updated(id) => id,
        }
    }
}

pub struct SubmissionAssembler;

impl SubmissionAssembler {
    /// Builds the payload from the aggregate. Fails on the first field that
    /// does not parse.
    pub fn build_payload(
        state: &WizardState,
        config: &WizardConfig,
    ) -> Result<ListingPayload, ValidationError> {
        let fields = &state.fields;
        let goal = fields
            .goal()
            .ok_or_else(|| ValidationError::missing("goal", "Listing goal"))?;
        let property_type = fields
            .property_type
            .ok_or_else(|| ValidationError::missing("property_type", "Property type"))?;
        let flatmate = goal == ListingGoal::Flatmate;

        let mut amenities: Vec<String> = Vec::new();
        for amenity in fields.amenities.iter().filter_map(|a| optional_text(a)) {
            if !amenities.iter().any(|known| known.eq_ignore_ascii_case(&amenity)) {
                amenities.push(amenity);
            }
        }

        Ok(ListingPayload {
            goal,
            property_type,
            city: required_text(&fields.city, "city", "City")?.to_string(),
            state: required_text(&fields.state, "state", "State")?.to_string(),
            district: required_text(&fields.district, "district", "District")?.to_string(),
            locality: optional_text(&fields.locality),
            address: optional_text(&fields.address),
            pincode: parse_pincode(&fields.pincode)?,
            price: parse_price(fields)?,
            deposit: parse_optional_amount(&fields.deposit, "deposit", "Security deposit")?,
            maintenance: parse_optional_amount(&fields.maintenance, "maintenance", "Maintenance")?,
            bedrooms: parse_count(
                &fields.bedrooms,
                "bedrooms",
                "Bedrooms",
                1,
                config.max_bedrooms,
            )?,
            bathrooms: parse_count(
                &fields.bathrooms,
                "bathrooms",
                "Bathrooms",
                1,
                config.max_bathrooms,
            )?,
            balconies: parse_optional_count(
                &fields.balconies,
                "balconies",
                "Balconies",
                config.max_bedrooms,
            )?,
            built_up_area: parse_optional_amount(
                &fields.built_up_area,
                "built_up_area",
                "Built-up area",
            )?,
            carpet_area: parse_optional_amount(&fields.carpet_area, "carpet_area", "Carpet area")?,
            floor: parse_optional_floor(&fields.floor)?,
            total_floors: parse_optional_total_floors(&fields.total_floors)?,
            property_age: optional_text(&fields.property_age),
            facing: optional_text(&fields.facing),
            building_name: optional_text(&fields.building_name),
            ownership: fields.ownership,
            parking: optional_text(&fields.parking),
            furnishing: fields.furnishing,
            amenities,
            description: fields.description.trim().to_string(),
            available_from: parse_optional_date(
                &fields.available_from,
                "available_from",
                "Available from",
            )?,
            preferred_gender: flatmate
                .then(|| optional_text(&fields.preferred_gender))
                .flatten(),
            preferred_occupation: flatmate
                .then(|| optional_text(&fields.preferred_occupation))
                .flatten(),
            transit_points: state.proximity.flatten_category(PoiCategory::Transit),
            essential_points: state.proximity.flatten_category(PoiCategory::Essential),
            utility_points: state.proximity.flatten_category(PoiCategory::Utility),
            images: state.images.validated_urls(),
        })
    }

    /// Checks every cross-step precondition and marks the session as submitting.
    pub fn prepare(session: &mut WizardSession) -> Result<SubmissionTicket, ValidationError> {
        let result = Self::check_and_build(session);
        match result {
            Ok(payload) => {
                session.submission_pending = true;
                tracing::info!(mode = ?session.mode(), "submission prepared");
                Ok(SubmissionTicket {
                    mode: session.mode(),
                    payload,
                })
            }
            Err(err) => {
                session.notifier().validation(&err);
                Err(err)
            }
        }
    }

    fn check_and_build(session: &WizardSession) -> Result<ListingPayload, ValidationError> {
        if session.submission_pending {
            return Err(ValidationError::new(
                ValidationKind::SubmissionInProgress,
                "A submission is already in progress",
            ));
        }
        session.sequencer.ensure_active()?;
        let state = &session.state;
        let config = session.config();
        if !session.sequencer.is_on_last_step(state) {
            return Err(ValidationError::new(
                ValidationKind::NotOnFinalStep,
                "Finish the remaining steps before submitting",
            ));
        }
        for step in effective_steps(state) {
            validate_step(step, state, config)?;
        }
        if !state.images.is_submittable() {
            return Err(ValidationError::for_field(
                ValidationKind::InsufficientImages,
                "images",
                format!("Add at least {} images", state.images.min_images()),
            ));
        }
        if state.fields.goal() == Some(ListingGoal::Flatmate) {
            validate_flatmate_requirements(&state.fields)?;
        }
        Self::build_payload(state, config)
    }

    /// Applies the service response. Success clears the session; failure
    /// leaves it untouched so the user can retry.
    pub fn finish(
        session: &mut WizardSession,
        ticket: SubmissionTicket,
        result: Result<ListingId, RemoteError>,
    ) -> Result<SubmissionOutcome, WizardError> {
        session.submission_pending = false;
        match result {
            Ok(id) => {
                let outcome = match ticket.mode {
                    SessionMode::Create => SubmissionOutcome::Created(id),
                    SessionMode::Edit(_) => SubmissionOutcome::Updated(id),
                };
                let message = match outcome {
                    SubmissionOutcome::Created(_) => format!("Listing {id} created"),
                    SubmissionOutcome::Updated(_) => format!("Listing {id} updated"),
                };
                tracing::info!(listing = %id, "submission succeeded");
                session.notifier().notify(NoticeKind::Success, &message);
                session.complete_submission(id);
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!(error = %err, "submission failed; session kept for retry");
                session.notifier().remote(&err);
                Err(err.into())
            }
        }
    }

    /// Prepares, dispatches to create or update by session mode, and finishes.
    pub async fn submit(
        session: &mut WizardSession,
        service: &dyn ListingService,
    ) -> Result<SubmissionOutcome, WizardError> {
        let ticket = Self::prepare(session)?;
        let result = match ticket.mode {
            SessionMode::Create => service.create_listing(&ticket.payload).await,
            SessionMode::Edit(id) => service.update_listing(id, &ticket.payload).await.map(|()| id),
        };
        Self::finish(session, ticket, result)
    }
}
