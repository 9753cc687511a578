//! Shared enums and traits for listing primitives.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Converts a value into the label shown next to form inputs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// What the listing offers: a rental, a sale, or a room in a shared flat.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ListingGoal {
    Rent,
    Sale,
    Flatmate,
}

impl ListingGoal {
    pub const ALL: [ListingGoal; 3] =
        [ListingGoal::Rent, ListingGoal::Sale, ListingGoal::Flatmate];

    /// Property types that may be listed under this goal.
    pub fn allowed_property_types(self) -> &'static [PropertyType] {
        match self {
            ListingGoal::Rent => &[
                PropertyType::Flat,
                PropertyType::House,
                PropertyType::Villa,
                PropertyType::Commercial,
                PropertyType::Pg,
            ],
            ListingGoal::Sale => &[
                PropertyType::Flat,
                PropertyType::House,
                PropertyType::Villa,
                PropertyType::Plot,
                PropertyType::Commercial,
            ],
            ListingGoal::Flatmate => {
                &[PropertyType::Flat, PropertyType::House, PropertyType::Villa]
            }
        }
    }

    pub fn allows(self, property_type: PropertyType) -> bool {
        self.allowed_property_types().contains(&property_type)
    }

    /// Field key used for the asking amount on the pricing step.
    pub fn price_field(self) -> &'static str {
        match self {
            ListingGoal::Sale => "price",
            ListingGoal::Rent | ListingGoal::Flatmate => "rent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "rent" => Some(ListingGoal::Rent),
            "sale" | "sell" => Some(ListingGoal::Sale),
            "flatmate" | "flatmates" => Some(ListingGoal::Flatmate),
            _ => None,
        }
    }
}

impl fmt::Display for ListingGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ListingGoal::Rent => "Rent",
            ListingGoal::Sale => "Sale",
            ListingGoal::Flatmate => "Flatmate",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    Flat,
    House,
    Villa,
    Plot,
    Commercial,
    Pg,
}

impl PropertyType {
    pub const ALL: [PropertyType; 6] = [
        PropertyType::Flat,
        PropertyType::House,
        PropertyType::Villa,
        PropertyType::Plot,
        PropertyType::Commercial,
        PropertyType::Pg,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flat" | "apartment" => Some(PropertyType::Flat),
            "house" => Some(PropertyType::House),
            "villa" => Some(PropertyType::Villa),
            "plot" => Some(PropertyType::Plot),
            "commercial" => Some(PropertyType::Commercial),
            "pg" => Some(PropertyType::Pg),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PropertyType::Flat => "Flat",
            PropertyType::House => "House",
            PropertyType::Villa => "Villa",
            PropertyType::Plot => "Plot",
            PropertyType::Commercial => "Commercial",
            PropertyType::Pg => "PG",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Furnishing {
    Unfurnished,
    SemiFurnished,
    FullyFurnished,
}

impl Furnishing {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "").as_str() {
            "unfurnished" => Some(Furnishing::Unfurnished),
            "semifurnished" | "semi" => Some(Furnishing::SemiFurnished),
            "fullyfurnished" | "furnished" | "full" => Some(Furnishing::FullyFurnished),
            _ => None,
        }
    }
}

impl fmt::Display for Furnishing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Furnishing::Unfurnished => "Unfurnished",
            Furnishing::SemiFurnished => "Semi-Furnished",
            Furnishing::FullyFurnished => "Fully Furnished",
        };
        f.write_str(label)
    }
}

/// Legal ownership of a property offered for sale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Ownership {
    Freehold,
    Leasehold,
    CoOperativeSociety,
    PowerOfAttorney,
}

impl Ownership {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "").as_str() {
            "freehold" => Some(Ownership::Freehold),
            "leasehold" => Some(Ownership::Leasehold),
            "cooperativesociety" | "cooperative" => Some(Ownership::CoOperativeSociety),
            "powerofattorney" | "poa" => Some(Ownership::PowerOfAttorney),
            _ => None,
        }
    }
}

impl fmt::Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Ownership::Freehold => "Freehold",
            Ownership::Leasehold => "Leasehold",
            Ownership::CoOperativeSociety => "Co-operative Society",
            Ownership::PowerOfAttorney => "Power of Attorney",
        };
        f.write_str(label)
    }
}

/// Unit attached to every proximity distance in a wizard session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DistanceUnit {
    #[default]
    #[serde(rename = "km")]
    Km,
    #[serde(rename = "meter")]
    Meter,
    #[serde(rename = "min walk")]
    MinWalk,
}

impl DistanceUnit {
    pub const ALL: [DistanceUnit; 3] =
        [DistanceUnit::Km, DistanceUnit::Meter, DistanceUnit::MinWalk];

    /// Suffix written after the value in persisted distances.
    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Km => "km",
            DistanceUnit::Meter => "meter",
            DistanceUnit::MinWalk => "min walk",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        DistanceUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == normalized)
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatmate_goal_rejects_plots() {
        assert!(ListingGoal::Sale.allows(PropertyType::Plot));
        assert!(!ListingGoal::Flatmate.allows(PropertyType::Plot));
        assert!(!ListingGoal::Rent.allows(PropertyType::Plot));
    }

    #[test]
    fn distance_unit_parses_multi_word_suffix() {
        assert_eq!(DistanceUnit::parse("min walk"), Some(DistanceUnit::MinWalk));
        assert_eq!(DistanceUnit::parse(" KM "), Some(DistanceUnit::Km));
        assert_eq!(DistanceUnit::parse("miles"), None);
        assert_eq!(DistanceUnit::default(), DistanceUnit::Km);
    }

    #[test]
    fn distance_unit_serializes_as_suffix() {
        let json = serde_json::to_string(&DistanceUnit::MinWalk).expect("serialize");
        assert_eq!(json, "\"min walk\"");
    }
}
