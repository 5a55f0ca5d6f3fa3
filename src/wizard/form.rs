//! Form fields and the values the user has typed into them.

use std::collections::BTreeMap;

use super::validate::ValidationRules;

/// Every input of the idea form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Title,
    Category,
    Stage,
    ProblemStatement,
    SolutionDescription,
    TargetMarket,
    BudgetRange,
    Timeline,
    TeamNeeds,
    Inspiration,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::Title,
        Field::Category,
        Field::Stage,
        Field::ProblemStatement,
        Field::SolutionDescription,
        Field::TargetMarket,
        Field::BudgetRange,
        Field::Timeline,
        Field::TeamNeeds,
        Field::Inspiration,
    ];

    /// Form name the backend expects.
    pub fn name(&self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Category => "category",
            Field::Stage => "development_stage",
            Field::ProblemStatement => "problem_statement",
            Field::SolutionDescription => "solution_description",
            Field::TargetMarket => "target_market",
            Field::BudgetRange => "budget_range",
            Field::Timeline => "timeline",
            Field::TeamNeeds => "team_needs",
            Field::Inspiration => "inspiration",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Category => "Category",
            Field::Stage => "Development Stage",
            Field::ProblemStatement => "Problem Statement",
            Field::SolutionDescription => "Solution",
            Field::TargetMarket => "Target Market",
            Field::BudgetRange => "Budget Range",
            Field::Timeline => "Timeline",
            Field::TeamNeeds => "Team Needs",
            Field::Inspiration => "Inspiration",
        }
    }

    /// Wizard step (1-indexed) the field is entered on.
    pub fn step(&self) -> usize {
        match self {
            Field::Title | Field::Category | Field::Stage => 1,
            Field::ProblemStatement | Field::SolutionDescription => 2,
            Field::TargetMarket
            | Field::BudgetRange
            | Field::Timeline
            | Field::TeamNeeds
            | Field::Inspiration => 3,
        }
    }

    pub fn for_step(step: usize) -> impl Iterator<Item = Field> {
        Self::ALL.into_iter().filter(move |f| f.step() == step)
    }

    /// Fields picked from a closed list rather than typed.
    pub fn is_choice(&self) -> bool {
        matches!(self, Field::Category | Field::Stage)
    }

    /// Character limit shown next to the field, if it has one.
    pub fn max_len(&self, rules: &ValidationRules) -> Option<usize> {
        match self {
            Field::Title => Some(rules.title.max),
            Field::ProblemStatement => Some(rules.problem_statement.max),
            Field::SolutionDescription => Some(rules.solution_description.max),
            Field::TargetMarket => Some(rules.target_market_max),
            Field::TeamNeeds => Some(rules.team_needs.max),
            Field::Inspiration => Some(rules.inspiration_max),
            _ => None,
        }
    }
}

/// User-entered values. Navigation never touches these.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    values: BTreeMap<Field, String>,
    seeking_collaborators: bool,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn trimmed(&self, field: Field) -> &str {
        self.get(field).trim()
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn push_char(&mut self, field: Field, c: char) {
        self.values.entry(field).or_default().push(c);
    }

    pub fn pop_char(&mut self, field: Field) {
        if let Some(value) = self.values.get_mut(&field) {
            value.pop();
        }
    }

    pub fn seeking_collaborators(&self) -> bool {
        self.seeking_collaborators
    }

    /// Turning the flag off also discards the team needs text.
    pub fn set_seeking_collaborators(&mut self, seeking: bool) {
        self.seeking_collaborators = seeking;
        if !seeking {
            self.values.remove(&Field::TeamNeeds);
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.seeking_collaborators = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterLevel {
    Normal,
    Warning,
    Danger,
}

/// `len/max` counter with the warning thresholds of the web form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharCounter {
    pub len: usize,
    pub max: usize,
}

impl CharCounter {
    pub fn new(value: &str, max: usize) -> Self {
        Self {
            len: value.chars().count(),
            max,
        }
    }

    /// Warning above 80% of the limit, danger above 95%.
    pub fn level(&self) -> CounterLevel {
        let len = self.len * 100;
        if len > self.max * 95 {
            CounterLevel::Danger
        } else if len > self.max * 80 {
            CounterLevel::Warning
        } else {
            CounterLevel::Normal
        }
    }
}

impl std::fmt::Display for CharCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.len, self.max)
    }
}
