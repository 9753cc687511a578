//! Domain types for points of interest near a listed property.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, DistanceUnit};

/// Bucket a point of interest belongs to. Declaration order is the
/// order buckets are flattened in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum PoiCategory {
    Transit,
    Essential,
    Utility,
}

impl PoiCategory {
    pub const ALL: [PoiCategory; 3] = [
        PoiCategory::Transit,
        PoiCategory::Essential,
        PoiCategory::Utility,
    ];

    /// Fixed type vocabulary offered for the category.
    pub fn vocabulary(self) -> &'static [&'static str] {
        match self {
            PoiCategory::Transit => &[
                "Railway Station",
                "Metro Station",
                "Bus Stop",
                "Airport",
                "Taxi Stand",
            ],
            PoiCategory::Essential => &[
                "Hospital",
                "School",
                "College",
                "Pharmacy",
                "Supermarket",
                "Market",
                "Bank",
                "Police Station",
            ],
            PoiCategory::Utility => &[
                "ATM",
                "Petrol Pump",
                "Gym",
                "Park",
                "Restaurant",
                "Post Office",
                "Other",
            ],
        }
    }

    /// Finds the category whose vocabulary contains `poi_type`, ignoring case.
    pub fn for_type(poi_type: &str) -> Option<Self> {
        let needle = poi_type.trim();
        PoiCategory::ALL.into_iter().find(|category| {
            category
                .vocabulary()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(needle))
        })
    }

    /// Canonical spelling of `poi_type` within this category's vocabulary.
    pub fn canonical_type(self, poi_type: &str) -> Option<&'static str> {
        let needle = poi_type.trim();
        self.vocabulary()
            .iter()
            .copied()
            .find(|known| known.eq_ignore_ascii_case(needle))
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "transit" => Some(PoiCategory::Transit),
            "essential" | "essentials" => Some(PoiCategory::Essential),
            "utility" | "utilities" => Some(PoiCategory::Utility),
            _ => None,
        }
    }
}

impl fmt::Display for PoiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PoiCategory::Transit => "Transit",
            PoiCategory::Essential => "Essential",
            PoiCategory::Utility => "Utility",
        };
        f.write_str(label)
    }
}

/// A committed point of interest. The unit is frozen when the record is added.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiRecord {
    pub id: Uuid,
    pub category: PoiCategory,
    pub poi_type: String,
    pub name: String,
    pub distance_value: f64,
    pub distance_unit: DistanceUnit,
}

impl PoiRecord {
    pub fn new(
        category: PoiCategory,
        poi_type: impl Into<String>,
        name: impl Into<String>,
        distance_value: f64,
        distance_unit: DistanceUnit,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category,
            poi_type: poi_type.into(),
            name: name.into(),
            distance_value,
            distance_unit,
        }
    }

    /// Distance in its persisted `"<value> <unit>"` form.
    pub fn distance_label(&self) -> String {
        format_distance(self.distance_value, self.distance_unit)
    }

    pub fn to_persisted(&self) -> PersistedPoi {
        PersistedPoi {
            poi_type: self.poi_type.clone(),
            name: self.name.clone(),
            distance: self.distance_label(),
        }
    }
}

impl Displayable for PoiRecord {
    fn display_label(&self) -> String {
        if self.name == self.poi_type {
            format!("{} ({})", self.name, self.distance_label())
        } else {
            format!("{} - {} ({})", self.poi_type, self.name, self.distance_label())
        }
    }
}

/// Point of interest as stored on a listing record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedPoi {
    #[serde(rename = "type")]
    pub poi_type: String,
    #[serde(default)]
    pub name: String,
    pub distance: String,
}

impl PersistedPoi {
    pub fn new(
        poi_type: impl Into<String>,
        name: impl Into<String>,
        distance: impl Into<String>,
    ) -> Self {
        Self {
            poi_type: poi_type.into(),
            name: name.into(),
            distance: distance.into(),
        }
    }
}

pub fn format_distance(value: f64, unit: DistanceUnit) -> String {
    format!("{} {}", value, unit)
}

/// Parses a user-entered distance. Accepts non-negative finite decimals only.
pub fn parse_distance_value(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
}

/// A persisted distance string split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistedDistance {
    Tagged(f64, DistanceUnit),
    /// A number with no unit suffix.
    Bare(f64),
    /// A number followed by a suffix that is not a known unit.
    UnknownUnit(f64, String),
}

/// Splits a persisted `"<value> <unit>"` string.
///
/// Known unit suffixes are matched first so multi-word units such as
/// `min walk` survive; anything else is split on the last space.
pub fn parse_persisted_distance(raw: &str) -> Option<PersistedDistance> {
    let trimmed = raw.trim();
    for unit in DistanceUnit::ALL {
        if let Some(value) = trimmed.strip_suffix(unit.as_str()) {
            if let Some(parsed) = parse_distance_value(value) {
                return Some(PersistedDistance::Tagged(parsed, unit));
            }
        }
    }
    match trimmed.rsplit_once(' ') {
        Some((value, suffix)) => {
            let parsed = parse_distance_value(value)?;
            Some(match DistanceUnit::parse(suffix) {
                Some(unit) => PersistedDistance::Tagged(parsed, unit),
                None => PersistedDistance::UnknownUnit(parsed, suffix.trim().to_string()),
            })
        }
        None => parse_distance_value(trimmed).map(PersistedDistance::Bare),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_type_is_case_insensitive() {
        assert_eq!(PoiCategory::for_type("bus stop"), Some(PoiCategory::Transit));
        assert_eq!(PoiCategory::for_type("Hospital"), Some(PoiCategory::Essential));
        assert_eq!(PoiCategory::for_type("atm"), Some(PoiCategory::Utility));
        assert_eq!(PoiCategory::for_type("Spaceport"), None);
    }

    #[test]
    fn distance_label_drops_trailing_zero() {
        let record =
            PoiRecord::new(PoiCategory::Transit, "Bus Stop", "Bus Stop", 2.0, DistanceUnit::Km);
        assert_eq!(record.distance_label(), "2 km");
        let record = PoiRecord::new(
            PoiCategory::Transit,
            "Bus Stop",
            "Bus Stop",
            1.5,
            DistanceUnit::MinWalk,
        );
        assert_eq!(record.distance_label(), "1.5 min walk");
    }

    #[test]
    fn persisted_distance_parsing() {
        use PersistedDistance::*;
        assert_eq!(parse_persisted_distance("2 km"), Some(Tagged(2.0, DistanceUnit::Km)));
        assert_eq!(
            parse_persisted_distance("5 min walk"),
            Some(Tagged(5.0, DistanceUnit::MinWalk))
        );
        assert_eq!(
            parse_persisted_distance("300 meter"),
            Some(Tagged(300.0, DistanceUnit::Meter))
        );
        assert_eq!(
            parse_persisted_distance("3 miles"),
            Some(UnknownUnit(3.0, "miles".to_string()))
        );
        assert_eq!(parse_persisted_distance("7"), Some(Bare(7.0)));
        assert_eq!(parse_persisted_distance("near km"), None);
        assert_eq!(parse_persisted_distance("-1 km"), None);
    }

    #[test]
    fn persisted_poi_uses_type_key() {
        let poi = PersistedPoi::new("ATM", "HDFC ATM", "200 meter");
        let json = serde_json::to_value(&poi).expect("serialize");
        assert_eq!(json["type"], "ATM");
        assert_eq!(json["distance"], "200 meter");
    }
}
