//! Chat history and CSV export

use std::fmt;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::errors::DocChatError;
use crate::errors::Result;

/// Timestamp format used in exported rows
const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Assistant => write!(f, "Assistant"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// Ordered turns of one session.
///
/// Turns are only added in user/assistant pairs.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    turns: Vec<ConversationTurn>,
}

impl ChatHistory {
    /// Record a question, asked at `asked_at`, and the answer to it
    pub fn push_exchange(
        &mut self,
        asked_at: DateTime<Utc>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) {
        self.turns.push(ConversationTurn {
            role: Role::User,
            content: question.into(),
            timestamp: asked_at,
        });
        self.turns.push(ConversationTurn {
            role: Role::Assistant,
            content: answer.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render as CSV with a `Timestamp,Role,Message` header, one row per turn
    pub fn export_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Timestamp", "Role", "Message"])?;

        for turn in &self.turns {
            writer.write_record([
                turn.timestamp.format(EXPORT_TIMESTAMP_FORMAT).to_string(),
                turn.role.to_string(),
                turn.content.clone(),
            ])?;
        }

        writer
            .into_inner()
            .map_err(|e| DocChatError::Io(e.into_error()))
    }
}

/// `chat_history_YYYYMMDD_HHMMSS.csv` for the given moment
#[must_use]
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("chat_history_{}.csv", at.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_push_exchange_orders_user_first() {
        let mut history = ChatHistory::default();
        history.push_exchange(Utc::now(), "Q", "A");

        let roles: Vec<Role> = history.turns().iter().map(|t| t.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
        assert!(history.turns()[0].timestamp <= history.turns()[1].timestamp);
    }

    #[test]
    fn test_user_turn_keeps_question_time() {
        let asked_at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        let mut history = ChatHistory::default();
        history.push_exchange(asked_at, "Q", "A");

        assert_eq!(history.turns()[0].timestamp, asked_at);
        assert!(history.turns()[1].timestamp > asked_at);

        let bytes = history.export_csv().unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let first = reader.records().next().unwrap().unwrap();
        assert_eq!(&first[0], "2024-03-09 14:05:07");
    }

    #[test]
    fn test_export_csv_rows() {
        let mut history = ChatHistory::default();
        history.push_exchange(Utc::now(), "What color is the sky?", "Blue, with a comma");

        let bytes = history.export_csv().unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers, vec!["Timestamp", "Role", "Message"]);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][1], "User");
        assert_eq!(&rows[0][2], "What color is the sky?");
        assert_eq!(&rows[1][1], "Assistant");
        assert_eq!(&rows[1][2], "Blue, with a comma");
    }

    #[test]
    fn test_export_empty_history_has_header_only() {
        let bytes = ChatHistory::default().export_csv().unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "Timestamp,Role,Message\n");
    }

    #[test]
    fn test_export_filename() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(export_filename(at), "chat_history_20240309_140507.csv");
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(Role::User.to_string(), "User");
    }
}
