//! Session state machine: upload, ask, clear, export

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::history::export_filename;
use super::ChatHistory;
use crate::documents::UploadedFile;
use crate::embeddings::has_embeddable_text;
use crate::errors::DocChatError;
use crate::errors::Result;
use crate::rag::ConversationChain;
use crate::rag::IndexReport;
use crate::rag::RagResponse;
use crate::rag::RagService;

/// Whether a session has documents to answer from
#[derive(Clone, Default)]
pub enum SessionState {
    #[default]
    Empty,
    Ready(ConversationChain),
}

/// Serializable summary of a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub ready: bool,
    pub passages: usize,
    pub turns: usize,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Chat history rendered for download
#[derive(Debug, Clone)]
pub struct ChatExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// One user's conversation with their documents
pub struct Session {
    id: String,
    rag: Arc<RagService>,
    state: SessionState,
    history: ChatHistory,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(rag: Arc<RagService>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            rag,
            state: SessionState::Empty,
            history: ChatHistory::default(),
            created_at: now,
            last_activity: now,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.state, SessionState::Ready(_))
    }

    #[must_use]
    pub const fn history(&self) -> &ChatHistory {
        &self.history
    }

    /// Replace the session's documents.
    ///
    /// The new index is built completely before anything changes; on any
    /// error the previous index and history stay as they were.
    pub async fn upload(&mut self, files: Vec<UploadedFile>) -> Result<IndexReport> {
        self.touch();
        if files.is_empty() {
            return Err(DocChatError::EmptyDocument);
        }

        let (chain, report) = self.rag.index_documents(files).await?;

        self.state = SessionState::Ready(chain);
        self.history.clear();
        info!(
            "Session {} ready with {} passages",
            self.id, report.passages
        );
        Ok(report)
    }

    /// Answer a question and record the exchange.
    ///
    /// History changes only when an answer was produced.
    pub async fn ask(&mut self, question: &str) -> Result<RagResponse> {
        self.touch();
        let asked_at = Utc::now();
        let question = question.trim();
        if !has_embeddable_text(question) {
            return Err(DocChatError::EmptyQuestion);
        }

        let SessionState::Ready(chain) = &self.state else {
            return Err(DocChatError::EmptyIndex);
        };

        let response = self.rag.query(chain, question, self.history.turns()).await?;
        self.history
            .push_exchange(asked_at, question, response.answer.clone());
        Ok(response)
    }

    /// Drop the history and the index
    pub fn clear(&mut self) {
        self.touch();
        self.state = SessionState::Empty;
        self.history.clear();
        info!("Session {} cleared", self.id);
    }

    pub fn export(&self) -> Result<ChatExport> {
        Ok(ChatExport {
            filename: export_filename(Utc::now()),
            bytes: self.history.export_csv()?,
        })
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            session_id: self.id.clone(),
            ready: self.is_ready(),
            passages: match &self.state {
                SessionState::Empty => 0,
                SessionState::Ready(chain) => chain.index().len(),
            },
            turns: self.history.len(),
            created_at: self.created_at,
            last_activity: self.last_activity,
        }
    }

    /// Idle for longer than `timeout`
    #[must_use]
    pub fn is_expired(&self, timeout: Duration) -> bool {
        let idle = Utc::now().signed_duration_since(self.last_activity);
        idle.to_std().is_ok_and(|idle| idle > timeout)
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}
