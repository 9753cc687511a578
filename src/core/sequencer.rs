//! Step position, completion tracking, and navigation rules.

use std::collections::BTreeSet;

use crate::config::WizardConfig;
use crate::core::steps::{effective_steps, WizardStep};
use crate::core::store::WizardState;
use crate::core::validation::validate_step;
use crate::errors::{ValidationError, ValidationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerStatus {
    Active,
    Submitted,
}

/// Drives the wizard through its steps. Forward moves are gated by
/// validation; backward moves only reach visited steps.
#[derive(Debug, Clone)]
pub struct StepSequencer {
    current: WizardStep,
    completed: BTreeSet<WizardStep>,
    status: SequencerStatus,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSequencer {
    pub fn new() -> Self {
        Self {
            current: WizardStep::GoalAndType,
            completed: BTreeSet::new(),
            status: SequencerStatus::Active,
        }
    }

    pub fn current_step(&self) -> WizardStep {
        self.current
    }

    pub fn status(&self) -> SequencerStatus {
        self.status
    }

    pub fn is_submitted(&self) -> bool {
        self.status == SequencerStatus::Submitted
    }

    pub fn is_completed(&self, step: WizardStep) -> bool {
        self.completed.contains(&step)
    }

    pub fn completed_steps(&self) -> Vec<WizardStep> {
        self.completed.iter().copied().collect()
    }

    /// Whether the current step is the last applicable one.
    pub fn is_on_last_step(&self, state: &WizardState) -> bool {
        effective_steps(state).last() == Some(&self.current)
    }

    /// Validates the current step and moves to the next applicable one.
    /// On the last step the position is kept and only completion is recorded.
    pub fn advance(
        &mut self,
        state: &WizardState,
        config: &WizardConfig,
    ) -> Result<WizardStep, ValidationError> {
        self.ensure_active()?;
        if let Err(err) = validate_step(self.current, state, config) {
            tracing::debug!(step = %self.current, field = ?err.field, "advance blocked");
            return Err(err);
        }
        self.completed.insert(self.current);

        let steps = effective_steps(state);
        if let Some(next) = steps.iter().copied().find(|step| *step > self.current) {
            tracing::debug!(from = %self.current, to = %next, "advanced");
            self.current = next;
        }
        Ok(self.current)
    }

    /// Jumps to a visited step: anything at or before the current step, or
    /// any step already completed.
    pub fn go_to(
        &mut self,
        step_id: u8,
        state: &WizardState,
    ) -> Result<WizardStep, ValidationError> {
        self.ensure_active()?;
        let step = WizardStep::from_id(step_id)
            .filter(|step| effective_steps(state).contains(step))
            .ok_or_else(|| {
                ValidationError::new(
                    ValidationKind::UnknownStep,
                    format!("There is no step {step_id}"),
                )
            })?;
        if step > self.current && !self.completed.contains(&step) {
            return Err(ValidationError::new(
                ValidationKind::StepLocked,
                format!("Complete the earlier steps before opening `{}`", step.label()),
            ));
        }
        self.current = step;
        Ok(step)
    }

    /// Moves to the previous applicable step, if any.
    pub fn go_back(&mut self, state: &WizardState) -> Option<WizardStep> {
        if self.is_submitted() {
            return None;
        }
        let previous = effective_steps(state)
            .into_iter()
            .rev()
            .find(|step| *step < self.current)?;
        self.current = previous;
        Some(previous)
    }

    /// Forgets completion of goal-dependent steps so they are validated again.
    pub fn evict_goal_dependent(&mut self) -> Vec<WizardStep> {
        let evicted: Vec<WizardStep> = self
            .completed
            .iter()
            .copied()
            .filter(|step| step.descriptor().goal_dependent)
            .collect();
        for step in &evicted {
            self.completed.remove(step);
        }
        if !evicted.is_empty() {
            tracing::debug!(?evicted, "completion flags evicted after goal change");
        }
        evicted
    }

    /// Marks every applicable step that currently validates as completed.
    /// Used when a persisted listing is opened for editing.
    pub fn mark_valid_steps_completed(&mut self, state: &WizardState, config: &WizardConfig) {
        for step in effective_steps(state) {
            if validate_step(step, state, config).is_ok() {
                self.completed.insert(step);
            }
        }
    }

    pub(crate) fn mark_submitted(&mut self) {
        self.status = SequencerStatus::Submitted;
    }

    pub(crate) fn ensure_active(&self) -> Result<(), ValidationError> {
        if self.is_submitted() {
            return Err(ValidationError::new(
                ValidationKind::AlreadySubmitted,
                "This listing has already been submitted",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ListingGoal, PropertyType};

    fn state() -> WizardState {
        WizardState::new(&WizardConfig::default(), None)
    }

    fn choose_goal(state: &mut WizardState) {
        state.fields.set_goal(Some(ListingGoal::Rent));
        state.fields.property_type = Some(PropertyType::Flat);
    }

    #[test]
    fn advance_stays_put_on_validation_failure() {
        let state = state();
        let mut sequencer = StepSequencer::new();
        let err = sequencer
            .advance(&state, &WizardConfig::default())
            .expect_err("nothing selected");
        assert_eq!(err.field, Some("goal"));
        assert_eq!(sequencer.current_step(), WizardStep::GoalAndType);
        assert!(sequencer.completed_steps().is_empty());
    }

    #[test]
    fn advance_marks_completion_and_moves_forward() {
        let mut state = state();
        choose_goal(&mut state);
        let mut sequencer = StepSequencer::new();
        let next = sequencer.advance(&state, &WizardConfig::default()).expect("advance");
        assert_eq!(next, WizardStep::LocationAndPricing);
        assert!(sequencer.is_completed(WizardStep::GoalAndType));
    }

    #[test]
    fn go_to_only_reaches_visited_steps() {
        let mut state = state();
        choose_goal(&mut state);
        let mut sequencer = StepSequencer::new();
        sequencer.advance(&state, &WizardConfig::default()).expect("advance");

        let err = sequencer.go_to(4, &state).expect_err("forward jump");
        assert_eq!(err.kind, ValidationKind::StepLocked);
        let err = sequencer.go_to(12, &state).expect_err("unknown");
        assert_eq!(err.kind, ValidationKind::UnknownStep);

        assert_eq!(sequencer.go_to(1, &state).expect("back"), WizardStep::GoalAndType);
        // Step 2 was visited but never completed, so it is only reachable by advancing.
        let err = sequencer.go_to(2, &state).expect_err("not completed");
        assert_eq!(err.kind, ValidationKind::StepLocked);
        sequencer.advance(&state, &WizardConfig::default()).expect("advance again");

        assert_eq!(sequencer.go_back(&state), Some(WizardStep::GoalAndType));
        assert_eq!(sequencer.go_back(&state), None);
        assert_eq!(
            sequencer.go_to(1, &state).expect("lateral to current"),
            WizardStep::GoalAndType
        );
    }

    #[test]
    fn goal_change_evicts_goal_dependent_steps_only() {
        let mut state = state();
        choose_goal(&mut state);
        let mut sequencer = StepSequencer::new();
        sequencer.mark_valid_steps_completed(&state, &WizardConfig::default());
        sequencer.completed.insert(WizardStep::LocationAndPricing);
        sequencer.completed.insert(WizardStep::DescriptionAndRequirements);

        let evicted = sequencer.evict_goal_dependent();
        assert_eq!(
            evicted,
            vec![WizardStep::GoalAndType, WizardStep::DescriptionAndRequirements]
        );
        assert!(sequencer.is_completed(WizardStep::LocationAndPricing));
    }

    #[test]
    fn submitted_sequencer_rejects_navigation() {
        let state = state();
        let mut sequencer = StepSequencer::new();
        sequencer.mark_submitted();
        let err = sequencer.advance(&state, &WizardConfig::default()).expect_err("submitted");
        assert_eq!(err.kind, ValidationKind::AlreadySubmitted);
        assert!(sequencer.go_back(&state).is_none());
    }
}
