//! Read-only preview of the idea and the payload sent on submit.

use serde::Serialize;

use super::form::{Field, FormData};
use super::tags::TagList;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSection {
    pub label: &'static str,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub title: String,
    pub sections: Vec<PreviewSection>,
}

fn or_default(value: &str, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

impl Preview {
    pub fn build(form: &FormData, tags: &TagList) -> Self {
        let field = |f: Field, fallback: &str| PreviewSection {
            label: f.label(),
            content: or_default(form.trimmed(f), fallback),
        };

        let mut sections = vec![
            field(Field::Category, "Uncategorized"),
            field(Field::Stage, "Not specified"),
            PreviewSection {
                label: "Tags",
                content: if tags.is_empty() {
                    "No tags added".to_string()
                } else {
                    tags.as_slice().join(", ")
                },
            },
            field(Field::ProblemStatement, "No problem statement provided"),
            field(Field::SolutionDescription, "No solution description provided"),
            field(Field::TargetMarket, "Not specified"),
            field(Field::BudgetRange, "Not specified"),
            field(Field::Timeline, "Not specified"),
            PreviewSection {
                label: "Team Collaboration",
                content: if form.seeking_collaborators() {
                    "Open for collaboration".to_string()
                } else {
                    "Not looking for collaborators".to_string()
                },
            },
        ];
        if form.seeking_collaborators() {
            sections.push(field(Field::TeamNeeds, "Not specified"));
        }
        sections.push(field(Field::Inspiration, "Not provided"));

        Self {
            title: or_default(form.trimmed(Field::Title), "Untitled Idea"),
            sections,
        }
    }
}

/// Form-encoded body of `POST /submit_idea`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdeaSubmission {
    pub title: String,
    pub problem_statement: String,
    pub solution_description: String,
    pub category: String,
    pub development_stage: String,
    pub target_market: String,
    pub budget_range: String,
    pub timeline: String,
    pub tags: String,
    pub team_needs: String,
    pub inspiration: String,
    /// Checkbox semantics: present as `"on"` when set, absent otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_collaboration: Option<String>,
}

impl IdeaSubmission {
    pub fn from_form(form: &FormData, tags: &TagList) -> Self {
        let value = |f: Field| form.trimmed(f).to_string();
        Self {
            title: value(Field::Title),
            problem_statement: value(Field::ProblemStatement),
            solution_description: value(Field::SolutionDescription),
            category: value(Field::Category),
            development_stage: value(Field::Stage),
            target_market: value(Field::TargetMarket),
            budget_range: value(Field::BudgetRange),
            timeline: value(Field::Timeline),
            tags: tags.joined(),
            team_needs: value(Field::TeamNeeds),
            inspiration: value(Field::Inspiration),
            open_collaboration: form.seeking_collaborators().then(|| "on".to_string()),
        }
    }
}
