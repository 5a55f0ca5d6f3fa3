//! Request and response bodies of the backend routes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chat::TeamId;

/// Points awarded per correct quiz answer.
pub const POINTS_PER_CORRECT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub like_count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewComment<'a> {
    pub idea_id: u64,
    pub text: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Comment {
    pub author: String,
    pub date: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewCount {
    pub views: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizQuestion {
    pub id: u64,
    #[serde(default = "general_category")]
    pub category: String,
    pub question: String,
    pub options: Vec<String>,
    /// Index into `options`.
    pub correct_answer: usize,
    #[serde(default)]
    pub explanation: String,
}

fn general_category() -> String {
    "General".to_string()
}

impl QuizQuestion {
    pub fn is_correct(&self, selected: usize) -> bool {
        selected == self.correct_answer
    }
}

/// Daily quiz. Empty when today's quiz was already taken.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Quiz {
    #[serde(default)]
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuizAnswer {
    pub question_id: u64,
    pub selected_answer: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnsweredQuestion {
    #[serde(rename = "questionId")]
    pub question_id: u64,
    #[serde(rename = "selectedAnswer")]
    pub selected_answer: usize,
    pub correct: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizStats {
    pub questions_answered: usize,
    pub correct_answers: usize,
    /// Whole percent.
    pub accuracy: u32,
    pub points_earned: u32,
    /// Whole minutes.
    pub time_taken: u64,
    pub quiz_data: Vec<AnsweredQuestion>,
}

impl QuizStats {
    pub fn from_answers(answers: Vec<AnsweredQuestion>, minutes: u64) -> Self {
        let correct = answers.iter().filter(|a| a.correct).count();
        let accuracy = if answers.is_empty() {
            0
        } else {
            ((correct as f64 / answers.len() as f64) * 100.0).round() as u32
        };
        Self {
            questions_answered: answers.len(),
            correct_answers: correct,
            accuracy,
            points_earned: correct as u32 * POINTS_PER_CORRECT,
            time_taken: minutes,
            quiz_data: answers,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QuizAnalytics {
    #[serde(default)]
    pub total_quizzes: u64,
    #[serde(default)]
    pub avg_accuracy: f64,
    #[serde(default)]
    pub recent_scores: Vec<u32>,
    #[serde(default)]
    pub improvement_rate: f64,
    #[serde(default)]
    pub best_category: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Booking {
    pub mentor_id: u64,
    pub mentor_name: String,
    pub student_name: String,
    pub student_email: String,
    pub session_date: String,
    pub session_time: String,
    pub session_topic: String,
}

/// Form-encoded.
#[derive(Debug, Clone, Serialize)]
pub struct TeamApplication {
    pub idea_id: u64,
    pub message: String,
    pub skills: String,
    pub experience: String,
    pub availability: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage<'a> {
    pub team_id: TeamId,
    pub message: &'a str,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub age: String,
    pub skills: String,
    pub interests: String,
    pub bio: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Feedback {
    pub name: String,
    pub email: String,
    pub rating: String,
    pub category: String,
    pub message: String,
    pub improvements: String,
}

impl Feedback {
    /// Applies the form defaults for the optional fields.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        rating: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            rating: rating.into(),
            category: "General".to_string(),
            message: message.into(),
            improvements: "N/A".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CategoryScore {
    #[serde(default = "neutral_score")]
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
}

fn neutral_score() -> f64 {
    5.0
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Evaluation {
    #[serde(default = "neutral_score")]
    pub overall_rating: f64,
    #[serde(default)]
    pub overall_feedback: String,
    #[serde(default)]
    pub detailed_analysis: BTreeMap<String, CategoryScore>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
    #[serde(default)]
    pub challenges: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// Coarse band of a 0-10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 8.0 {
            ScoreBand::Excellent
        } else if score >= 6.0 {
            ScoreBand::Good
        } else if score >= 4.0 {
            ScoreBand::Fair
        } else {
            ScoreBand::Poor
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct EvaluationEnvelope {
    #[serde(default)]
    pub success: bool,
    pub evaluation: Option<Evaluation>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
