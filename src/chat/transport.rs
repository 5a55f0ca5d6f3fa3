use async_trait::async_trait;

use crate::Result;

use super::{ChatMessage, TeamId};

/// Backend seam for the chat. Implemented by [`crate::api::ApiClient`].
#[async_trait]
pub trait ChatTransport: Send + Sync + 'static {
    /// Full message list of a team, oldest first.
    async fn fetch_messages(&self, team_id: TeamId) -> Result<Vec<ChatMessage>>;

    async fn post_message(&self, team_id: TeamId, text: &str) -> Result<()>;
}
