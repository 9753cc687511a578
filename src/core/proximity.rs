//! Categorized points of interest and their flat persisted form.

use uuid::Uuid;

use crate::domain::{
    parse_distance_value, parse_persisted_distance, DistanceUnit, PersistedDistance,
    PersistedPoi, PoiCategory, PoiRecord,
};
use crate::errors::{ValidationError, ValidationKind};

/// Typed description of one proximity input step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProximityInputConfig {
    pub title: &'static str,
    pub category: PoiCategory,
    pub poi_type_choices: &'static [&'static str],
    /// Utility points carry a mandatory name.
    pub is_utility: bool,
}

impl ProximityInputConfig {
    pub fn for_category(category: PoiCategory) -> Self {
        let title = match category {
            PoiCategory::Transit => "Nearby Transit",
            PoiCategory::Essential => "Nearby Essentials",
            PoiCategory::Utility => "Nearby Utilities",
        };
        Self {
            title,
            category,
            poi_type_choices: category.vocabulary(),
            is_utility: category == PoiCategory::Utility,
        }
    }

    /// Canonical spelling of `poi_type` among this step's choices, ignoring case.
    pub fn choice(&self, poi_type: &str) -> Option<&'static str> {
        let needle = poi_type.trim();
        self.poi_type_choices
            .iter()
            .copied()
            .find(|choice| choice.eq_ignore_ascii_case(needle))
    }
}

/// Something hydration recovered from or dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum HydrationIssue {
    /// Type not in any vocabulary; kept in `category`.
    UnknownType {
        poi_type: String,
        category: PoiCategory,
    },
    /// Stored under `from` but the type belongs to `to`, where it was moved.
    Refiled {
        poi_type: String,
        from: PoiCategory,
        to: PoiCategory,
    },
    /// Distance could not be parsed; the entry was skipped.
    UnparseableDistance { poi_type: String, distance: String },
    /// Distance carries a unit the wizard cannot express; the entry was skipped.
    UnknownUnit { poi_type: String, distance: String },
}

impl HydrationIssue {
    pub fn message(&self) -> String {
        match self {
            HydrationIssue::UnknownType { poi_type, category } => {
                format!("Unrecognised place type `{poi_type}` was kept under {category}")
            }
            HydrationIssue::Refiled { poi_type, from, to } => {
                format!("`{poi_type}` was stored under {from} and moved to {to}")
            }
            HydrationIssue::UnparseableDistance { poi_type, distance } => {
                format!("Dropped `{poi_type}`: cannot read distance `{distance}`")
            }
            HydrationIssue::UnknownUnit { poi_type, distance } => {
                format!("Dropped `{poi_type}`: unsupported unit in `{distance}`")
            }
        }
    }
}

/// Owns the Transit, Essential, and Utility buckets plus the session unit.
#[derive(Debug, Clone, Default)]
pub struct ProximityPointRegistry {
    transit: Vec<PoiRecord>,
    essential: Vec<PoiRecord>,
    utility: Vec<PoiRecord>,
    unit: DistanceUnit,
    default_unit: DistanceUnit,
}

impl ProximityPointRegistry {
    pub fn new(default_unit: DistanceUnit) -> Self {
        Self {
            unit: default_unit,
            default_unit,
            ..Self::default()
        }
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    /// Changes the unit used by subsequent adds. Existing records keep theirs.
    pub fn set_unit(&mut self, unit: DistanceUnit) {
        self.unit = unit;
    }

    /// Commits a new point with the current session unit and returns its id.
    ///
    /// `poi_type` must be one of the category's choices. `name` falls back to
    /// the type outside the Utility category, where it is mandatory.
    pub fn add_point(
        &mut self,
        category: PoiCategory,
        poi_type: &str,
        name: Option<&str>,
        distance_value: &str,
    ) -> Result<Uuid, ValidationError> {
        if distance_value.trim().is_empty() {
            return Err(ValidationError::for_field(
                ValidationKind::MissingDistance,
                "distance",
                "Enter a distance before adding",
            ));
        }
        let value = parse_distance_value(distance_value).ok_or_else(|| {
            ValidationError::for_field(
                ValidationKind::InvalidDistance,
                "distance",
                format!("`{}` is not a valid distance", distance_value.trim()),
            )
        })?;

        let input = ProximityInputConfig::for_category(category);
        let poi_type = input.choice(poi_type).ok_or_else(|| {
            ValidationError::for_field(
                ValidationKind::InvalidField,
                "type",
                format!(
                    "`{}` is not a {} type. Choose one of: {}",
                    poi_type.trim(),
                    category,
                    input.poi_type_choices.join(", ")
                ),
            )
        })?;
        let name = match name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None if input.is_utility => {
                return Err(ValidationError::for_field(
                    ValidationKind::MissingName,
                    "name",
                    "Enter a name for the utility",
                ))
            }
            None => poi_type.to_string(),
        };

        let record = PoiRecord::new(category, poi_type, name, value, self.unit);
        let id = record.id;
        tracing::debug!(
            %category,
            id = %id,
            distance = %record.distance_label(),
            "proximity point added"
        );
        self.bucket_mut(category).push(record);
        Ok(id)
    }

    /// Removes the point with `id`. Absent ids are ignored.
    pub fn remove_point(&mut self, id: Uuid) -> bool {
        for category in PoiCategory::ALL {
            let bucket = self.bucket_mut(category);
            if let Some(index) = bucket.iter().position(|record| record.id == id) {
                bucket.remove(index);
                return true;
            }
        }
        false
    }

    pub fn list_by_category(&self, category: PoiCategory) -> &[PoiRecord] {
        match category {
            PoiCategory::Transit => &self.transit,
            PoiCategory::Essential => &self.essential,
            PoiCategory::Utility => &self.utility,
        }
    }

    pub fn len(&self) -> usize {
        self.transit.len() + self.essential.len() + self.utility.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn flatten_category(&self, category: PoiCategory) -> Vec<PersistedPoi> {
        self.list_by_category(category)
            .iter()
            .map(PoiRecord::to_persisted)
            .collect()
    }

    /// All points in Transit, Essential, Utility order, insertion order within each.
    pub fn flatten_all(&self) -> Vec<PersistedPoi> {
        PoiCategory::ALL
            .into_iter()
            .flat_map(|category| self.flatten_category(category))
            .collect()
    }

    /// Replaces all buckets from a flat list, bucketing each entry by its type.
    /// Unknown types land in Utility.
    pub fn hydrate(&mut self, flat: &[PersistedPoi]) -> Vec<HydrationIssue> {
        self.load(flat.iter().map(|entry| (None, entry)))
    }

    /// Replaces all buckets from per-category persisted arrays.
    ///
    /// The array an entry was stored in decides its bucket. Only a type that
    /// belongs to another category's vocabulary moves the entry there.
    pub fn hydrate_buckets(
        &mut self,
        buckets: &[(PoiCategory, &[PersistedPoi])],
    ) -> Vec<HydrationIssue> {
        self.load(buckets.iter().flat_map(|&(category, entries)| {
            entries.iter().map(move |entry| (Some(category), entry))
        }))
    }

    fn load<'a>(
        &mut self,
        entries: impl Iterator<Item = (Option<PoiCategory>, &'a PersistedPoi)>,
    ) -> Vec<HydrationIssue> {
        self.transit.clear();
        self.essential.clear();
        self.utility.clear();

        let mut issues = Vec::new();
        let mut inferred_unit = None;
        let mut pending = Vec::new();

        for (stored_in, entry) in entries {
            let (value, unit) = match parse_persisted_distance(&entry.distance) {
                Some(PersistedDistance::Tagged(value, unit)) => (value, Some(unit)),
                Some(PersistedDistance::Bare(value)) => (value, None),
                Some(PersistedDistance::UnknownUnit(..)) => {
                    issues.push(HydrationIssue::UnknownUnit {
                        poi_type: entry.poi_type.clone(),
                        distance: entry.distance.clone(),
                    });
                    continue;
                }
                None => {
                    issues.push(HydrationIssue::UnparseableDistance {
                        poi_type: entry.poi_type.clone(),
                        distance: entry.distance.clone(),
                    });
                    continue;
                }
            };
            if inferred_unit.is_none() {
                inferred_unit = unit;
            }
            let category = resolve_category(stored_in, &entry.poi_type, &mut issues);
            pending.push((category, entry, value, unit));
        }

        self.unit = inferred_unit.unwrap_or(self.default_unit);
        for (category, entry, value, unit) in pending {
            let poi_type = category
                .canonical_type(&entry.poi_type)
                .map(str::to_string)
                .unwrap_or_else(|| entry.poi_type.clone());
            let name = if entry.name.trim().is_empty() {
                poi_type.clone()
            } else {
                entry.name.clone()
            };
            let unit = unit.unwrap_or(self.unit);
            let record = PoiRecord::new(category, poi_type, name, value, unit);
            self.bucket_mut(category).push(record);
        }

        for issue in &issues {
            tracing::warn!("{}", issue.message());
        }
        issues
    }

    fn bucket_mut(&mut self, category: PoiCategory) -> &mut Vec<PoiRecord> {
        match category {
            PoiCategory::Transit => &mut self.transit,
            PoiCategory::Essential => &mut self.essential,
            PoiCategory::Utility => &mut self.utility,
        }
    }
}

fn resolve_category(
    stored_in: Option<PoiCategory>,
    poi_type: &str,
    issues: &mut Vec<HydrationIssue>,
) -> PoiCategory {
    if let Some(stored) = stored_in {
        if stored.canonical_type(poi_type).is_some() {
            return stored;
        }
    }
    match (stored_in, PoiCategory::for_type(poi_type)) {
        (Some(from), Some(to)) => {
            issues.push(HydrationIssue::Refiled {
                poi_type: poi_type.to_string(),
                from,
                to,
            });
            to
        }
        (None, Some(category)) => category,
        (stored, None) => {
            let category = stored.unwrap_or(PoiCategory::Utility);
            issues.push(HydrationIssue::UnknownType {
                poi_type: poi_type.to_string(),
                category,
            });
            category
        }
    }
}
