//! HTTP client for the platform backend.
//!
//! Every request carries the session cookie from config. Non-2xx responses
//! become [`Error::Api`] with a truncated body.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;

use crate::chat::{ChatMessage, ChatTransport, TeamId};
use crate::config::Config;
use crate::wizard::IdeaSubmission;
use crate::{hlog_debug, hlog_trace, hlog_warn, Error, Result};

use super::types::*;

const ERROR_BODY_LIMIT: usize = 200;

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    feedback_url: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, session_cookie: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie.filter(|c| !c.is_empty()) {
            let value = HeaderValue::from_str(&format!("session={}", cookie))
                .map_err(|e| Error::Validation(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ideahub/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            feedback_url: None,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut client = Self::new(
            config.effective_base_url(),
            config.session_cookie.as_deref(),
            config.request_timeout(),
        )?;
        client.feedback_url = config.feedback_url.clone();
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        hlog_trace!("{} {}", status.as_u16(), response.url());
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            hlog_warn!("Backend returned {}: {}", status, body);
            return Err(Error::Api {
                status: status.as_u16(),
                body: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }
        Ok(response)
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Form-encoded POST of the wizard payload.
    pub async fn submit_idea(&self, idea: &IdeaSubmission) -> Result<()> {
        hlog_debug!("submit_idea title={:?}", idea.title);
        self.send(self.http.post(self.url("/submit_idea")).form(idea))
            .await?;
        Ok(())
    }

    pub async fn like_idea(&self, idea_id: u64) -> Result<LikeResponse> {
        self.json(self.http.post(self.url(&format!("/like_idea/{}", idea_id))))
            .await
    }

    pub async fn post_comment(&self, idea_id: u64, text: &str) -> Result<Comment> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::Validation("Comment text is required".to_string()));
        }
        self.json(
            self.http
                .post(self.url("/api/comments"))
                .json(&NewComment { idea_id, text }),
        )
        .await
    }

    pub async fn user_likes(&self) -> Result<Vec<u64>> {
        self.json(self.http.get(self.url("/api/user_likes"))).await
    }

    pub async fn increment_view(&self, idea_id: u64) -> Result<ViewCount> {
        self.json(
            self.http
                .post(self.url(&format!("/api/increment_view/{}", idea_id))),
        )
        .await
    }

    pub async fn daily_quiz(&self) -> Result<Quiz> {
        self.json(self.http.get(self.url("/get_daily_quiz"))).await
    }

    pub async fn submit_quiz_answer(&self, answer: &QuizAnswer) -> Result<()> {
        self.send(self.http.post(self.url("/submit_quiz_answer")).json(answer))
            .await?;
        Ok(())
    }

    pub async fn update_quiz_stats(&self, stats: &QuizStats) -> Result<()> {
        self.send(self.http.post(self.url("/update_quiz_stats")).json(stats))
            .await?;
        Ok(())
    }

    pub async fn quiz_analytics(&self) -> Result<QuizAnalytics> {
        self.json(self.http.get(self.url("/get_quiz_analytics")))
            .await
    }

    pub async fn book_session(&self, booking: &Booking) -> Result<()> {
        self.send(self.http.post(self.url("/book_session")).json(booking))
            .await?;
        Ok(())
    }

    pub async fn apply_to_team(&self, application: &TeamApplication) -> Result<()> {
        if application.message.trim().is_empty() {
            return Err(Error::Validation("Idea ID and message are required".to_string()));
        }
        self.send(self.http.post(self.url("/apply_to_team")).form(application))
            .await?;
        Ok(())
    }

    pub async fn leave_team(&self, team_id: TeamId) -> Result<()> {
        self.send(self.http.post(self.url(&format!("/leave_team/{}", team_id))))
            .await?;
        Ok(())
    }

    pub async fn team_messages(&self, team_id: TeamId) -> Result<Vec<ChatMessage>> {
        self.json(
            self.http
                .get(self.url(&format!("/api/team_messages/{}", team_id))),
        )
        .await
    }

    pub async fn send_team_message(&self, team_id: TeamId, message: &str) -> Result<()> {
        self.send(
            self.http
                .post(self.url("/api/send_team_message"))
                .json(&OutgoingMessage { team_id, message }),
        )
        .await?;
        Ok(())
    }

    pub async fn evaluate_idea(&self, idea_id: u64) -> Result<Evaluation> {
        hlog_debug!("evaluate_idea id={}", idea_id);
        let envelope: EvaluationEnvelope = self
            .json(self.http.post(self.url(&format!("/evaluate_idea/{}", idea_id))))
            .await?;
        match envelope.evaluation {
            Some(evaluation) if envelope.success => Ok(evaluation),
            _ => Err(Error::Api {
                status: 200,
                body: envelope
                    .message
                    .or(envelope.error)
                    .unwrap_or_else(|| "Invalid response format".to_string()),
            }),
        }
    }

    pub async fn update_profile(&self, profile: &ProfileUpdate) -> Result<()> {
        self.send(self.http.post(self.url("/update_profile")).json(profile))
            .await?;
        Ok(())
    }

    pub async fn upload_profile_pic(&self, path: &Path) -> Result<()> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Validation("No file selected".to_string()))?;
        let bytes = tokio::fs::read(path).await?;
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("profile_pic", part);
        self.send(self.http.post(self.url("/upload_profile_pic")).multipart(form))
            .await?;
        Ok(())
    }

    pub async fn delete_idea(&self, idea_id: u64) -> Result<()> {
        self.send(self.http.delete(self.url(&format!("/delete_idea/{}", idea_id))))
            .await?;
        Ok(())
    }

    /// Fire-and-forget post to the third-party feedback endpoint. The
    /// response is never read; a failed send is only logged. Returns `None`
    /// when no feedback URL is configured.
    pub fn send_feedback(&self, feedback: Feedback) -> Option<JoinHandle<Result<()>>> {
        let Some(url) = self.feedback_url.clone() else {
            hlog_debug!("send_feedback: no feedback_url configured");
            return None;
        };
        let http = self.http.clone();
        Some(tokio::spawn(async move {
            match http.post(&url).json(&feedback).send().await {
                Ok(_) => Ok(()),
                Err(e) => {
                    hlog_warn!("Feedback post failed: {}", e);
                    Err(e.into())
                }
            }
        }))
    }
}

#[async_trait]
impl ChatTransport for ApiClient {
    async fn fetch_messages(&self, team_id: TeamId) -> Result<Vec<ChatMessage>> {
        self.team_messages(team_id).await
    }

    async fn post_message(&self, team_id: TeamId, text: &str) -> Result<()> {
        self.send_team_message(team_id, text).await
    }
}
