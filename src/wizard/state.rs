//! The wizard's navigation state machine.

use crate::{hlog_debug, Error, Result};

use super::form::{Field, FormData};
use super::preview::{IdeaSubmission, Preview};
use super::tags::TagList;
use super::validate::{ValidationResult, ValidationRules, Validator};

pub const TOTAL_STEPS: usize = 4;

/// Tri-state marker of the progress indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepMarker {
    Completed,
    Active,
    Pending,
}

/// Result of [`WizardState::advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    Blocked(ValidationResult),
    /// Final step reached and valid: the forward action is now "submit".
    ReadyToSubmit,
}

pub struct WizardState {
    current_step: usize,
    total_steps: usize,
    fields: FormData,
    tags: TagList,
    validator: Validator,
    /// Messages from the most recent advance or submit attempt.
    errors: ValidationResult,
    submitting: bool,
}

impl WizardState {
    pub fn new(rules: ValidationRules) -> Self {
        Self::with_validator(Validator::new(rules), TOTAL_STEPS)
    }

    pub fn with_validator(validator: Validator, total_steps: usize) -> Self {
        Self {
            current_step: 1,
            total_steps: total_steps.max(1),
            fields: FormData::new(),
            tags: TagList::new(),
            validator,
            errors: ValidationResult::default(),
            submitting: false,
        }
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn is_final_step(&self) -> bool {
        self.current_step == self.total_steps
    }

    pub fn fields(&self) -> &FormData {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FormData {
        &mut self.fields
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    pub fn tags(&self) -> &TagList {
        &self.tags
    }

    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn rules(&self) -> &ValidationRules {
        self.validator.rules()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Jump to any step. Does not validate.
    pub fn go_to_step(&mut self, step: usize) -> Result<()> {
        if step < 1 || step > self.total_steps {
            return Err(Error::InvalidStep {
                step,
                total: self.total_steps,
            });
        }
        hlog_debug!("Wizard: step {} -> {}", self.current_step, step);
        self.current_step = step;
        Ok(())
    }

    pub fn advance(&mut self) -> Advance {
        let result = self.validate(self.current_step);
        self.errors = result.clone();
        if !result.is_valid() {
            hlog_debug!(
                "Wizard: step {} blocked by {} field(s)",
                self.current_step,
                result.messages().len()
            );
            return Advance::Blocked(result);
        }
        if self.is_final_step() {
            return Advance::ReadyToSubmit;
        }
        let next = self.current_step + 1;
        self.current_step = next;
        hlog_debug!("Wizard: advanced to step {}", next);
        Advance::Moved(next)
    }

    /// Returns whether the step changed.
    pub fn retreat(&mut self) -> bool {
        if self.current_step <= 1 {
            return false;
        }
        self.current_step -= 1;
        true
    }

    pub fn validate(&self, step: usize) -> ValidationResult {
        self.validator.validate(step, &self.fields)
    }

    pub fn step_marker(&self, step: usize) -> StepMarker {
        match step.cmp(&self.current_step) {
            std::cmp::Ordering::Less => StepMarker::Completed,
            std::cmp::Ordering::Equal => StepMarker::Active,
            std::cmp::Ordering::Greater => StepMarker::Pending,
        }
    }

    pub fn add_tag(&mut self, text: &str) -> bool {
        self.tags.add(text)
    }

    pub fn remove_tag(&mut self, index: usize) -> Result<String> {
        let len = self.tags.len();
        self.tags.remove(index).ok_or(Error::TagIndex { index, len })
    }

    /// Live preview, only available on the final step.
    pub fn preview(&self) -> Option<Preview> {
        self.is_final_step()
            .then(|| Preview::build(&self.fields, &self.tags))
    }

    /// Validate every input step and lock the form for the in-flight request.
    pub fn submit(&mut self) -> Result<IdeaSubmission> {
        if self.submitting {
            return Err(Error::Validation("Submission already in progress".to_string()));
        }
        let mut all = ValidationResult::default();
        for step in 1..self.total_steps {
            all.merge(self.validate(step));
        }
        let valid = all.is_valid();
        self.errors = all;
        if !valid {
            return Err(Error::Validation(
                "Please fix the errors before submitting".to_string(),
            ));
        }
        self.submitting = true;
        Ok(IdeaSubmission::from_form(&self.fields, &self.tags))
    }

    /// Unlock the form once the request has completed. A successful
    /// submission also clears the form and returns to the first step; a
    /// failed one keeps everything so the user can retry.
    pub fn finish_submit<E>(&mut self, outcome: &std::result::Result<(), E>) {
        self.submitting = false;
        if outcome.is_ok() {
            self.fields.clear();
            self.tags = TagList::new();
            self.errors = ValidationResult::default();
            self.current_step = 1;
        }
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new(ValidationRules::default())
    }
}
