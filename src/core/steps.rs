//! Static description of the nine wizard steps.

use std::fmt;

use crate::core::store::WizardState;
use crate::domain::PoiCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum WizardStep {
    GoalAndType = 1,
    LocationAndPricing = 2,
    PropertyDetails = 3,
    FurnishingAndAmenities = 4,
    DescriptionAndRequirements = 5,
    Images = 6,
    ProximityTransit = 7,
    ProximityEssentials = 8,
    ProximityUtility = 9,
}

impl WizardStep {
    pub const ALL: [WizardStep; 9] = [
        WizardStep::GoalAndType,
        WizardStep::LocationAndPricing,
        WizardStep::PropertyDetails,
        WizardStep::FurnishingAndAmenities,
        WizardStep::DescriptionAndRequirements,
        WizardStep::Images,
        WizardStep::ProximityTransit,
        WizardStep::ProximityEssentials,
        WizardStep::ProximityUtility,
    ];

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        WizardStep::ALL.into_iter().find(|step| step.id() == id)
    }

    pub fn descriptor(self) -> &'static StepDescriptor {
        &STEP_TABLE[usize::from(self.id() - 1)]
    }

    pub fn label(self) -> &'static str {
        self.descriptor().label
    }

    /// Category collected by a proximity step.
    pub fn poi_category(self) -> Option<PoiCategory> {
        match self {
            WizardStep::ProximityTransit => Some(PoiCategory::Transit),
            WizardStep::ProximityEssentials => Some(PoiCategory::Essential),
            WizardStep::ProximityUtility => Some(PoiCategory::Utility),
            _ => None,
        }
    }

    /// The only step from which the session distance unit may be changed.
    pub const fn first_proximity() -> Self {
        WizardStep::ProximityTransit
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.id(), self.label())
    }
}

/// One row of the step table.
pub struct StepDescriptor {
    pub step: WizardStep,
    pub label: &'static str,
    /// Required fields change with the listing goal.
    pub goal_dependent: bool,
    pub applicability: fn(&WizardState) -> bool,
}

impl fmt::Debug for StepDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepDescriptor")
            .field("step", &self.step)
            .field("label", &self.label)
            .field("goal_dependent", &self.goal_dependent)
            .finish()
    }
}

fn always(_: &WizardState) -> bool {
    true
}

/// The flatmate requirements sub-section of step 5 is conditional, but no
/// whole step is ever skipped.
pub static STEP_TABLE: [StepDescriptor; 9] = [
    StepDescriptor {
        step: WizardStep::GoalAndType,
        label: "Goal & Type",
        goal_dependent: true,
        applicability: always,
    },
    StepDescriptor {
        step: WizardStep::LocationAndPricing,
        label: "Location & Pricing",
        goal_dependent: false,
        applicability: always,
    },
    StepDescriptor {
        step: WizardStep::PropertyDetails,
        label: "Property Details",
        goal_dependent: true,
        applicability: always,
    },
    StepDescriptor {
        step: WizardStep::FurnishingAndAmenities,
        label: "Furnishing & Amenities",
        goal_dependent: false,
        applicability: always,
    },
    StepDescriptor {
        step: WizardStep::DescriptionAndRequirements,
        label: "Description & Requirements",
        goal_dependent: true,
        applicability: always,
    },
    StepDescriptor {
        step: WizardStep::Images,
        label: "Images",
        goal_dependent: false,
        applicability: always,
    },
    StepDescriptor {
        step: WizardStep::ProximityTransit,
        label: "Proximity: Transit",
        goal_dependent: false,
        applicability: always,
    },
    StepDescriptor {
        step: WizardStep::ProximityEssentials,
        label: "Proximity: Essentials",
        goal_dependent: false,
        applicability: always,
    },
    StepDescriptor {
        step: WizardStep::ProximityUtility,
        label: "Proximity: Utility",
        goal_dependent: false,
        applicability: always,
    },
];

/// Steps that apply to `state`, in table order.
pub fn effective_steps(state: &WizardState) -> Vec<WizardStep> {
    STEP_TABLE
        .iter()
        .filter(|descriptor| (descriptor.applicability)(state))
        .map(|descriptor| descriptor.step)
        .collect()
}

/// Whether the flatmate requirements sub-section is shown on step 5.
pub fn shows_flatmate_requirements(state: &WizardState) -> bool {
    state.fields.goal() == Some(crate::domain::ListingGoal::Flatmate)
}
