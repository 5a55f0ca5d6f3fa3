//! Per-step validation.
//!
//! A [`Validator`] runs an ordered chain of [`StepRule`]s over the form. The
//! first rule to reject a field owns that field's message, so every violated
//! field ends up with exactly one message. Validation only reads the form.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::form::{Field, FormData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthBounds {
    pub min: usize,
    pub max: usize,
}

impl LengthBounds {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

/// Configurable limits, loaded from the `[validation]` config table.
///
/// Every key is optional and a bound may set only one end. Bounds with
/// `min > max` and empty enumerations are rejected at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRules")]
pub struct ValidationRules {
    pub title: LengthBounds,
    pub problem_statement: LengthBounds,
    pub solution_description: LengthBounds,
    pub team_needs: LengthBounds,
    pub target_market_max: usize,
    pub inspiration_max: usize,
    pub categories: Vec<String>,
    pub stages: Vec<String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            title: LengthBounds::new(5, 100),
            problem_statement: LengthBounds::new(50, 1000),
            solution_description: LengthBounds::new(50, 1000),
            team_needs: LengthBounds::new(20, 300),
            target_market_max: 500,
            inspiration_max: 400,
            categories: [
                "Technology",
                "Education",
                "Environment",
                "Health",
                "Social Impact",
                "Entertainment",
                "Food",
                "Fashion",
                "Sports",
                "Other",
            ]
            .map(String::from)
            .to_vec(),
            stages: ["Idea", "Research", "Prototype", "Testing", "Launched"]
                .map(String::from)
                .to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
struct PartialBounds {
    min: Option<usize>,
    max: Option<usize>,
}

impl PartialBounds {
    fn over(self, base: LengthBounds, name: &str) -> std::result::Result<LengthBounds, String> {
        let bounds = LengthBounds::new(self.min.unwrap_or(base.min), self.max.unwrap_or(base.max));
        if bounds.min > bounds.max {
            return Err(format!(
                "validation.{}: min {} is greater than max {}",
                name, bounds.min, bounds.max
            ));
        }
        Ok(bounds)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawRules {
    title: PartialBounds,
    problem_statement: PartialBounds,
    solution_description: PartialBounds,
    team_needs: PartialBounds,
    target_market_max: Option<usize>,
    inspiration_max: Option<usize>,
    categories: Option<Vec<String>>,
    stages: Option<Vec<String>>,
}

fn choices(
    configured: Option<Vec<String>>,
    fallback: Vec<String>,
    name: &str,
) -> std::result::Result<Vec<String>, String> {
    match configured {
        Some(list) if list.iter().all(|c| c.trim().is_empty()) => {
            Err(format!("validation.{} must list at least one option", name))
        }
        Some(list) => Ok(list),
        None => Ok(fallback),
    }
}

impl TryFrom<RawRules> for ValidationRules {
    type Error = String;

    fn try_from(raw: RawRules) -> std::result::Result<Self, Self::Error> {
        let base = ValidationRules::default();
        Ok(Self {
            title: raw.title.over(base.title, "title")?,
            problem_statement: raw
                .problem_statement
                .over(base.problem_statement, "problem_statement")?,
            solution_description: raw
                .solution_description
                .over(base.solution_description, "solution_description")?,
            team_needs: raw.team_needs.over(base.team_needs, "team_needs")?,
            target_market_max: raw.target_market_max.unwrap_or(base.target_market_max),
            inspiration_max: raw.inspiration_max.unwrap_or(base.inspiration_max),
            categories: choices(raw.categories, base.categories, "categories")?,
            stages: choices(raw.stages, base.stages, "stages")?,
        })
    }
}

/// Outcome of validating one or more steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    messages: BTreeMap<Field, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn message(&self, field: Field) -> Option<&str> {
        self.messages.get(&field).map(String::as_str)
    }

    pub fn messages(&self) -> &BTreeMap<Field, String> {
        &self.messages
    }

    /// Record a violation unless an earlier rule already flagged the field.
    pub fn reject(&mut self, field: Field, message: impl Into<String>) {
        self.messages.entry(field).or_insert_with(|| message.into());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        for (field, message) in other.messages {
            self.reject(field, message);
        }
    }

    /// Lowest step that has a violation.
    pub fn first_failing_step(&self) -> Option<usize> {
        self.messages.keys().map(Field::step).min()
    }
}

/// One link of the validation chain.
pub trait StepRule: Send + Sync {
    fn check(&self, step: usize, form: &FormData, rules: &ValidationRules, out: &mut ValidationResult);
}

/// Messages for a required, length-bounded text field.
struct LengthMessages<'a> {
    missing: &'a str,
    too_short: &'a str,
    too_long: &'a str,
}

fn check_required(
    out: &mut ValidationResult,
    field: Field,
    value: &str,
    bounds: LengthBounds,
    msgs: LengthMessages<'_>,
) {
    let len = value.chars().count();
    if value.is_empty() {
        out.reject(field, msgs.missing);
    } else if len < bounds.min {
        out.reject(field, format!("{} (at least {} characters)", msgs.too_short, bounds.min));
    } else if len > bounds.max {
        out.reject(field, format!("{} (maximum {} characters)", msgs.too_long, bounds.max));
    }
}

fn check_max(out: &mut ValidationResult, field: Field, value: &str, max: usize, what: &str) {
    if value.chars().count() > max {
        out.reject(field, format!("{} is too long (maximum {} characters)", what, max));
    }
}

fn check_choice(out: &mut ValidationResult, field: Field, value: &str, allowed: &[String], prompt: &str) {
    if value.is_empty() {
        out.reject(field, prompt);
    } else if !allowed.iter().any(|a| a == value) {
        out.reject(field, format!("'{}' is not a valid {}", value, field.label().to_lowercase()));
    }
}

/// Title, choices, problem/solution, and the optional step 3 length caps.
pub struct BaseRule;

impl StepRule for BaseRule {
    fn check(&self, step: usize, form: &FormData, rules: &ValidationRules, out: &mut ValidationResult) {
        match step {
            1 => {
                let title = form.trimmed(Field::Title);
                let len = title.chars().count();
                if title.is_empty() {
                    out.reject(Field::Title, "Title is required");
                } else if len < rules.title.min {
                    out.reject(
                        Field::Title,
                        format!("Title must be at least {} characters", rules.title.min),
                    );
                } else if len > rules.title.max {
                    out.reject(
                        Field::Title,
                        format!("Title must be at most {} characters", rules.title.max),
                    );
                }
                check_choice(
                    out,
                    Field::Category,
                    form.trimmed(Field::Category),
                    &rules.categories,
                    "Please select a category",
                );
                check_choice(
                    out,
                    Field::Stage,
                    form.trimmed(Field::Stage),
                    &rules.stages,
                    "Please select a development stage",
                );
            }
            2 => {
                check_required(
                    out,
                    Field::ProblemStatement,
                    form.trimmed(Field::ProblemStatement),
                    rules.problem_statement,
                    LengthMessages {
                        missing: "Problem statement is required",
                        too_short: "Please provide a more detailed problem description",
                        too_long: "Problem statement is too long",
                    },
                );
                check_required(
                    out,
                    Field::SolutionDescription,
                    form.trimmed(Field::SolutionDescription),
                    rules.solution_description,
                    LengthMessages {
                        missing: "Solution description is required",
                        too_short: "Please provide a more detailed solution description",
                        too_long: "Solution description is too long",
                    },
                );
            }
            3 => {
                check_max(
                    out,
                    Field::TargetMarket,
                    form.trimmed(Field::TargetMarket),
                    rules.target_market_max,
                    "Target market description",
                );
                check_max(
                    out,
                    Field::Inspiration,
                    form.trimmed(Field::Inspiration),
                    rules.inspiration_max,
                    "Inspiration description",
                );
            }
            _ => {}
        }
    }
}

/// Team needs become mandatory once the idea is open for collaborators.
pub struct CollaborationRule;

impl StepRule for CollaborationRule {
    fn check(&self, step: usize, form: &FormData, rules: &ValidationRules, out: &mut ValidationResult) {
        if step != Field::TeamNeeds.step() || !form.seeking_collaborators() {
            return;
        }
        check_required(
            out,
            Field::TeamNeeds,
            form.trimmed(Field::TeamNeeds),
            rules.team_needs,
            LengthMessages {
                missing: "Please describe the team members you need",
                too_short: "Please provide more details about your team needs",
                too_long: "Team needs description is too long",
            },
        );
    }
}

/// Base rule plus any number of extra rules, run in order.
pub struct Validator {
    rules: ValidationRules,
    chain: Vec<Box<dyn StepRule>>,
}

impl Validator {
    /// The standard chain: [`BaseRule`] then [`CollaborationRule`].
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            rules,
            chain: vec![Box::new(BaseRule), Box::new(CollaborationRule)],
        }
    }

    pub fn with_rule(mut self, rule: impl StepRule + 'static) -> Self {
        self.chain.push(Box::new(rule));
        self
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    pub fn validate(&self, step: usize, form: &FormData) -> ValidationResult {
        let mut out = ValidationResult::default();
        for rule in &self.chain {
            rule.check(step, form, &self.rules, &mut out);
        }
        out
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationRules::default())
    }
}
