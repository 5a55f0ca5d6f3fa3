//! Typed access to the platform's REST backend.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{
    AnsweredQuestion, Booking, CategoryScore, Comment, Evaluation, Feedback, LikeResponse,
    ProfileUpdate, Quiz, QuizAnalytics, QuizAnswer, QuizQuestion, QuizStats, ScoreBand,
    TeamApplication, ViewCount,
};
