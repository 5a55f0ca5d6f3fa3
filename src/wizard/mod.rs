//! Guided idea submission wizard.
//!
//! - `form`: fields, values, character counters
//! - `tags`: the bounded tag list
//! - `validate`: configurable per-step rule chain
//! - `preview`: final-step preview and the submission payload
//! - `state`: step navigation and submit locking

pub mod form;
pub mod preview;
pub mod state;
pub mod tags;
pub mod validate;

pub use form::{CharCounter, CounterLevel, Field, FormData};
pub use preview::{IdeaSubmission, Preview, PreviewSection};
pub use state::{Advance, StepMarker, WizardState, TOTAL_STEPS};
pub use tags::{TagList, MAX_TAGS};
pub use validate::{
    BaseRule, CollaborationRule, LengthBounds, StepRule, ValidationResult, ValidationRules,
    Validator,
};
