//! Listing form fields, the submission payload, and the persisted record.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Furnishing, ListingGoal, Ownership, PropertyType};
use crate::domain::poi::{PersistedPoi, PoiCategory};

/// Identifier assigned by the listing service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ListingId(pub Uuid);

impl ListingId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for ListingId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An image reference collected by the wizard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub validated: bool,
}

impl ImageRef {
    pub fn validated(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            validated: true,
        }
    }

    pub fn pending(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            validated: false,
        }
    }
}

/// Free-text form inputs, keyed for generic editing. `(key, label)`.
pub const TEXT_FIELDS: &[(&str, &str)] = &[
    ("city", "City"),
    ("state", "State"),
    ("district", "District"),
    ("locality", "Locality"),
    ("address", "Address"),
    ("pincode", "Pincode"),
    ("price", "Rent / Price"),
    ("deposit", "Security Deposit"),
    ("maintenance", "Maintenance"),
    ("bedrooms", "Bedrooms"),
    ("bathrooms", "Bathrooms"),
    ("balconies", "Balconies"),
    ("built_up_area", "Built-up Area (sq ft)"),
    ("carpet_area", "Carpet Area (sq ft)"),
    ("floor", "Floor"),
    ("total_floors", "Total Floors"),
    ("property_age", "Property Age"),
    ("facing", "Facing"),
    ("building_name", "Building / Society"),
    ("parking", "Parking"),
    ("description", "Description"),
    ("available_from", "Available From"),
    ("preferred_gender", "Preferred Gender"),
    ("preferred_occupation", "Preferred Occupation"),
];

/// Raw values entered across the wizard's steps. Empty strings mean unset.
///
/// The goal is only writable from inside the crate so that goal changes
/// always pass through the session, which evicts stale completion flags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFields {
    goal: Option<ListingGoal>,
    pub property_type: Option<PropertyType>,
    pub city: String,
    pub state: String,
    pub district: String,
    pub locality: String,
    pub address: String,
    pub pincode: String,
    pub price: String,
    pub deposit: String,
    pub maintenance: String,
    pub bedrooms: String,
    pub bathrooms: String,
    pub balconies: String,
    pub built_up_area: String,
    pub carpet_area: String,
    pub floor: String,
    pub total_floors: String,
    pub property_age: String,
    pub facing: String,
    pub building_name: String,
    pub ownership: Option<Ownership>,
    pub parking: String,
    pub furnishing: Option<Furnishing>,
    pub amenities: Vec<String>,
    pub description: String,
    pub available_from: String,
    pub preferred_gender: String,
    pub preferred_occupation: String,
}

impl ListingFields {
    pub fn goal(&self) -> Option<ListingGoal> {
        self.goal
    }

    pub(crate) fn set_goal(&mut self, goal: Option<ListingGoal>) {
        self.goal = goal;
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        let value = match key {
            "city" => &self.city,
            "state" => &self.state,
            "district" => &self.district,
            "locality" => &self.locality,
            "address" => &self.address,
            "pincode" => &self.pincode,
            "price" | "rent" => &self.price,
            "deposit" => &self.deposit,
            "maintenance" => &self.maintenance,
            "bedrooms" => &self.bedrooms,
            "bathrooms" => &self.bathrooms,
            "balconies" => &self.balconies,
            "built_up_area" => &self.built_up_area,
            "carpet_area" => &self.carpet_area,
            "floor" => &self.floor,
            "total_floors" => &self.total_floors,
            "property_age" => &self.property_age,
            "facing" => &self.facing,
            "building_name" => &self.building_name,
            "parking" => &self.parking,
            "description" => &self.description,
            "available_from" => &self.available_from,
            "preferred_gender" => &self.preferred_gender,
            "preferred_occupation" => &self.preferred_occupation,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn text_mut(&mut self, key: &str) -> Option<&mut String> {
        let value = match key {
            "city" => &mut self.city,
            "state" => &mut self.state,
            "district" => &mut self.district,
            "locality" => &mut self.locality,
            "address" => &mut self.address,
            "pincode" => &mut self.pincode,
            "price" | "rent" => &mut self.price,
            "deposit" => &mut self.deposit,
            "maintenance" => &mut self.maintenance,
            "bedrooms" => &mut self.bedrooms,
            "bathrooms" => &mut self.bathrooms,
            "balconies" => &mut self.balconies,
            "built_up_area" => &mut self.built_up_area,
            "carpet_area" => &mut self.carpet_area,
            "floor" => &mut self.floor,
            "total_floors" => &mut self.total_floors,
            "property_age" => &mut self.property_age,
            "facing" => &mut self.facing,
            "building_name" => &mut self.building_name,
            "parking" => &mut self.parking,
            "description" => &mut self.description,
            "available_from" => &mut self.available_from,
            "preferred_gender" => &mut self.preferred_gender,
            "preferred_occupation" => &mut self.preferred_occupation,
            _ => return None,
        };
        Some(value)
    }

    /// Rebuilds form inputs from a previously submitted payload.
    pub fn from_payload(payload: &ListingPayload) -> Self {
        fn opt<T: ToString>(value: &Option<T>) -> String {
            value.as_ref().map(ToString::to_string).unwrap_or_default()
        }

        Self {
            goal: Some(payload.goal),
            property_type: Some(payload.property_type),
            city: payload.city.clone(),
            state: payload.state.clone(),
            district: payload.district.clone(),
            locality: opt(&payload.locality),
            address: opt(&payload.address),
            pincode: payload.pincode.clone(),
            price: payload.price.to_string(),
            deposit: opt(&payload.deposit),
            maintenance: opt(&payload.maintenance),
            bedrooms: payload.bedrooms.to_string(),
            bathrooms: payload.bathrooms.to_string(),
            balconies: opt(&payload.balconies),
            built_up_area: opt(&payload.built_up_area),
            carpet_area: opt(&payload.carpet_area),
            floor: opt(&payload.floor),
            total_floors: opt(&payload.total_floors),
            property_age: opt(&payload.property_age),
            facing: opt(&payload.facing),
            building_name: opt(&payload.building_name),
            ownership: payload.ownership,
            parking: opt(&payload.parking),
            furnishing: payload.furnishing,
            amenities: payload.amenities.clone(),
            description: payload.description.clone(),
            available_from: payload
                .available_from
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            preferred_gender: opt(&payload.preferred_gender),
            preferred_occupation: opt(&payload.preferred_occupation),
        }
    }
}

/// The single payload handed to the listing service on submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingPayload {
    pub goal: ListingGoal,
    pub property_type: PropertyType,
    pub city: String,
    pub state: String,
    pub district: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub pincode: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<f64>,
    pub bedrooms: u8,
    pub bathrooms: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balconies: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub built_up_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carpet_area: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_floors: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_age: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub building_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership: Option<Ownership>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnishing: Option<Furnishing>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_occupation: Option<String>,
    #[serde(default)]
    pub transit_points: Vec<PersistedPoi>,
    #[serde(default)]
    pub essential_points: Vec<PersistedPoi>,
    #[serde(default)]
    pub utility_points: Vec<PersistedPoi>,
    #[serde(default)]
    pub images: Vec<String>,
}

impl ListingPayload {
    /// Stored proximity arrays paired with the category each was saved under.
    pub fn point_buckets(&self) -> [(PoiCategory, &[PersistedPoi]); 3] {
        [
            (PoiCategory::Transit, self.transit_points.as_slice()),
            (PoiCategory::Essential, self.essential_points.as_slice()),
            (PoiCategory::Utility, self.utility_points.as_slice()),
        ]
    }
}

/// A listing as returned by the listing service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: ListingId,
    #[serde(flatten)]
    pub listing: ListingPayload,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingRecord {
    pub fn new(id: ListingId, listing: ListingPayload) -> Self {
        let now = Utc::now();
        Self {
            id,
            listing,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_mut_accepts_rent_alias() {
        let mut fields = ListingFields::default();
        *fields.text_mut("rent").expect("rent alias") = "15000".into();
        assert_eq!(fields.price, "15000");
        assert_eq!(fields.text("price"), Some("15000"));
        assert!(fields.text_mut("nonsense").is_none());
    }

    #[test]
    fn every_text_field_key_resolves() {
        let fields = ListingFields::default();
        for (key, _) in TEXT_FIELDS {
            assert!(fields.text(key).is_some(), "unmapped key {key}");
        }
    }
}
