//! Chat input glue
//!
//! Session bookkeeping behind the palette's chat input: submitted text is
//! appended to the active session and answered by a stub auto-response.
//! Real message processing is deliberately out of scope; this exists as the
//! consumer the focus guard serves.

use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Canned reply used until a real provider is wired in
const STUB_RESPONSE: &str = "Got it. Message processing isn't wired up yet.";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// system, user or assistant
    pub role: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory chat sessions for the palette
#[derive(Debug, Default)]
pub struct ChatManager {
    sessions: RwLock<Vec<ChatSession>>,
    active_session: RwLock<Option<String>>,
}

impl ChatManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create_session(&self, title: String) -> ChatSession {
        let session = ChatSession {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            messages: Vec::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.sessions.write().await.push(session.clone());
        session
    }

    pub async fn get_session(&self, id: &str) -> Option<ChatSession> {
        self.sessions.read().await.iter().find(|s| s.id == id).cloned()
    }

    pub async fn list_sessions(&self) -> Vec<ChatSession> {
        self.sessions.read().await.clone()
    }

    pub async fn add_message(&self, session_id: &str, message: Message) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or_else(|| AppError::not_found("Chat session not found"))?;
        session.messages.push(message);
        session.updated_at = Utc::now();
        Ok(())
    }

    /// Submit text from the palette input: appends the user message to the
    /// active session (created on first use) plus the stub auto-response.
    /// Returns both appended messages.
    pub async fn submit(&self, text: &str) -> AppResult<Vec<Message>> {
        if text.trim().is_empty() {
            return Err(AppError::invalid_input("empty message"));
        }

        let session_id = self.ensure_active_session().await;
        let user = Message::user(text);
        let reply = Message::assistant(STUB_RESPONSE);
        self.add_message(&session_id, user.clone()).await?;
        self.add_message(&session_id, reply.clone()).await?;
        Ok(vec![user, reply])
    }

    async fn ensure_active_session(&self) -> String {
        {
            let active = self.active_session.read().await;
            if let Some(id) = active.as_ref() {
                return id.clone();
            }
        }
        let session = self.create_session("New conversation".to_string()).await;
        *self.active_session.write().await = Some(session.id.clone());
        session.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn submit_appends_user_message_and_stub_reply() {
        let chat = ChatManager::new();
        let appended = chat.submit("open downloads folder").await.unwrap();

        assert_eq!(appended.len(), 2);
        assert_eq!(appended[0].role, "user");
        assert_eq!(appended[0].content, "open downloads folder");
        assert_eq!(appended[1].role, "assistant");

        let sessions = chat.list_sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn repeated_submits_reuse_the_active_session() {
        let chat = ChatManager::new();
        chat.submit("first").await.unwrap();
        chat.submit("second").await.unwrap();

        let sessions = chat.list_sessions().await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].messages.len(), 4);
    }

    #[tokio::test]
    async fn empty_submit_is_rejected() {
        let chat = ChatManager::new();
        assert!(chat.submit("   ").await.is_err());
        assert!(chat.list_sessions().await.is_empty());
    }

    #[tokio::test]
    async fn sessions_are_retrievable_by_id() {
        let chat = ChatManager::new();
        let session = chat.create_session("scratch".to_string()).await;

        let found = chat.get_session(&session.id).await.unwrap();
        assert_eq!(found.title, "scratch");
        assert!(chat.get_session("missing").await.is_none());
    }

    #[tokio::test]
    async fn add_message_to_unknown_session_errors() {
        let chat = ChatManager::new();
        let result = chat.add_message("nope", Message::user("hi")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
