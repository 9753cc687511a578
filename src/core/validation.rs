//! Per-step required-field checks and the parsers shared with submission.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::WizardConfig;
use crate::core::steps::{shows_flatmate_requirements, WizardStep};
use crate::core::store::WizardState;
use crate::domain::{ListingFields, ListingGoal};
use crate::errors::{ValidationError, ValidationKind};

static PINCODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("pincode pattern is valid"));

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Checks the fields `step` requires, reporting the first unmet one.
pub fn validate_step(
    step: WizardStep,
    state: &WizardState,
    config: &WizardConfig,
) -> Result<(), ValidationError> {
    let fields = &state.fields;
    match step {
        WizardStep::GoalAndType => validate_goal_and_type(fields),
        WizardStep::LocationAndPricing => validate_location_and_pricing(fields, config),
        WizardStep::PropertyDetails => validate_property_details(fields),
        WizardStep::FurnishingAndAmenities => validate_amenities(fields),
        WizardStep::DescriptionAndRequirements => {
            validate_description(fields, config)?;
            if shows_flatmate_requirements(state) {
                validate_flatmate_requirements(fields)?;
            }
            Ok(())
        }
        WizardStep::Images => validate_images(state),
        WizardStep::ProximityTransit
        | WizardStep::ProximityEssentials
        | WizardStep::ProximityUtility => Ok(()),
    }
}

fn validate_goal_and_type(fields: &ListingFields) -> Result<(), ValidationError> {
    let goal = fields
        .goal()
        .ok_or_else(|| ValidationError::missing("goal", "Listing goal"))?;
    let property_type = fields
        .property_type
        .ok_or_else(|| ValidationError::missing("property_type", "Property type"))?;
    if !goal.allows(property_type) {
        return Err(ValidationError::invalid(
            "property_type",
            format!("{property_type} cannot be listed for {goal}"),
        ));
    }
    Ok(())
}

fn validate_location_and_pricing(
    fields: &ListingFields,
    config: &WizardConfig,
) -> Result<(), ValidationError> {
    required_text(&fields.city, "city", "City")?;
    required_text(&fields.state, "state", "State")?;
    required_text(&fields.district, "district", "District")?;
    parse_pincode(&fields.pincode)?;
    parse_price(fields)?;
    parse_count(&fields.bedrooms, "bedrooms", "Bedrooms", 1, config.max_bedrooms)?;
    parse_count(&fields.bathrooms, "bathrooms", "Bathrooms", 1, config.max_bathrooms)?;
    parse_optional_amount(&fields.deposit, "deposit", "Security deposit")?;
    parse_optional_amount(&fields.maintenance, "maintenance", "Maintenance")?;
    parse_optional_count(&fields.balconies, "balconies", "Balconies", config.max_bedrooms)?;
    Ok(())
}

fn validate_property_details(fields: &ListingFields) -> Result<(), ValidationError> {
    let built_up = parse_optional_amount(&fields.built_up_area, "built_up_area", "Built-up area")?;
    if built_up == Some(0.0) {
        return Err(ValidationError::invalid(
            "built_up_area",
            "Built-up area must be greater than zero",
        ));
    }
    let carpet = parse_optional_amount(&fields.carpet_area, "carpet_area", "Carpet area")?;
    if let (Some(carpet), Some(built_up)) = (carpet, built_up) {
        if carpet > built_up {
            return Err(ValidationError::invalid(
                "carpet_area",
                "Carpet area cannot exceed built-up area",
            ));
        }
    }
    let floor = parse_optional_floor(&fields.floor)?;
    let total = parse_optional_total_floors(&fields.total_floors)?;
    if let (Some(floor), Some(total)) = (floor, total) {
        if floor > 0 && (floor as u32) > total {
            return Err(ValidationError::invalid(
                "floor",
                format!("Floor {floor} is above the building's {total} floors"),
            ));
        }
    }
    if fields.goal() == Some(ListingGoal::Sale) && fields.ownership.is_none() {
        return Err(ValidationError::missing("ownership", "Ownership"));
    }
    Ok(())
}

/// Amenities are free-form; blank entries are the only thing rejected.
fn validate_amenities(fields: &ListingFields) -> Result<(), ValidationError> {
    if fields.amenities.iter().any(|amenity| amenity.trim().is_empty()) {
        return Err(ValidationError::invalid("amenities", "Amenity names cannot be blank"));
    }
    Ok(())
}

fn validate_description(
    fields: &ListingFields,
    config: &WizardConfig,
) -> Result<(), ValidationError> {
    if let Some(description) = optional_text(&fields.description) {
        if description.chars().count() < config.min_description_len {
            return Err(ValidationError::invalid(
                "description",
                format!(
                    "Description must be at least {} characters",
                    config.min_description_len
                ),
            ));
        }
    }
    parse_optional_date(&fields.available_from, "available_from", "Available from")?;
    Ok(())
}

pub(crate) fn validate_flatmate_requirements(
    fields: &ListingFields,
) -> Result<(), ValidationError> {
    required_text(&fields.preferred_gender, "preferred_gender", "Preferred gender")?;
    required_text(
        &fields.preferred_occupation,
        "preferred_occupation",
        "Preferred occupation",
    )?;
    Ok(())
}

fn validate_images(state: &WizardState) -> Result<(), ValidationError> {
    let images = &state.images;
    if images.is_submittable() {
        return Ok(());
    }
    Err(ValidationError::for_field(
        ValidationKind::InsufficientImages,
        "images",
        format!(
            "Add at least {} images ({} added)",
            images.min_images(),
            images.validated_count()
        ),
    ))
}

pub(crate) fn required_text<'a>(
    raw: &'a str,
    field: &'static str,
    label: &str,
) -> Result<&'a str, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::missing(field, label))
    } else {
        Ok(trimmed)
    }
}

pub(crate) fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub(crate) fn parse_pincode(raw: &str) -> Result<String, ValidationError> {
    let pincode = required_text(raw, "pincode", "Pincode")?;
    if PINCODE.is_match(pincode) {
        Ok(pincode.to_string())
    } else {
        Err(ValidationError::invalid("pincode", "Pincode must be 6 digits"))
    }
}

/// Asking amount, reported as `rent` or `price` depending on the goal.
pub(crate) fn parse_price(fields: &ListingFields) -> Result<f64, ValidationError> {
    let goal = fields.goal().unwrap_or(ListingGoal::Rent);
    let (field, label) = match goal {
        ListingGoal::Sale => (goal.price_field(), "Expected price"),
        ListingGoal::Rent | ListingGoal::Flatmate => (goal.price_field(), "Rent"),
    };
    let value = parse_amount(&fields.price, field, label)?;
    if value <= 0.0 {
        return Err(ValidationError::invalid(
            field,
            format!("{label} must be greater than zero"),
        ));
    }
    Ok(value)
}

pub(crate) fn parse_amount(
    raw: &str,
    field: &'static str,
    label: &str,
) -> Result<f64, ValidationError> {
    let text = required_text(raw, field, label)?;
    text.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .ok_or_else(|| ValidationError::invalid(field, format!("{label} must be a number")))
}

pub(crate) fn parse_optional_amount(
    raw: &str,
    field: &'static str,
    label: &str,
) -> Result<Option<f64>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_amount(raw, field, label).map(Some)
}

pub(crate) fn parse_count(
    raw: &str,
    field: &'static str,
    label: &str,
    min: u8,
    max: u8,
) -> Result<u8, ValidationError> {
    let text = required_text(raw, field, label)?;
    let value = text
        .parse::<u32>()
        .map_err(|_| ValidationError::invalid(field, format!("{label} must be a whole number")))?;
    if value < u32::from(min) {
        return Err(ValidationError::invalid(
            field,
            format!("{label} must be at least {min}"),
        ));
    }
    if value > u32::from(max) {
        return Err(ValidationError::invalid(
            field,
            format!("{label} cannot exceed {max}"),
        ));
    }
    Ok(value as u8)
}

pub(crate) fn parse_optional_count(
    raw: &str,
    field: &'static str,
    label: &str,
    max: u8,
) -> Result<Option<u8>, ValidationError> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_count(raw, field, label, 0, max).map(Some)
}

/// Floor number; `ground` is 0 and basements are negative.
pub(crate) fn parse_optional_floor(raw: &str) -> Result<Option<i32>, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if text.eq_ignore_ascii_case("ground") {
        return Ok(Some(0));
    }
    text.parse::<i32>()
        .map(Some)
        .map_err(|_| ValidationError::invalid("floor", "Floor must be a whole number"))
}

pub(crate) fn parse_optional_total_floors(raw: &str) -> Result<Option<u32>, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<u32>() {
        Ok(total) if total >= 1 => Ok(Some(total)),
        _ => Err(ValidationError::invalid(
            "total_floors",
            "Total floors must be a whole number of at least 1",
        )),
    }
}

pub(crate) fn parse_optional_date(
    raw: &str,
    field: &'static str,
    label: &str,
) -> Result<Option<NaiveDate>, ValidationError> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ValidationError::invalid(field, format!("{label} must use YYYY-MM-DD")))
}
