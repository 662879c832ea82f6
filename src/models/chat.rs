// src/models/chat.rs
use crate::models::events::ResultItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    User,
    Assistant,
    Results,
}

/// One entry in the conversation transcript. Transcript entries are
/// append-only: once created they are never mutated or reordered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub kind: MessageKind,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Vec<ResultItem>>,
}

impl ChatMessage {
    fn new(kind: MessageKind, text: impl Into<String>, payload: Option<Vec<ResultItem>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            text: text.into(),
            created_at: Utc::now(),
            payload,
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageKind::User, text, None)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Assistant, text, None)
    }

    pub fn results(text: impl Into<String>, items: Vec<ResultItem>) -> Self {
        Self::new(MessageKind::Results, text, Some(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn results_message_keeps_payload_order() {
        let items = vec![
            ResultItem::stub("a", "Museum of the City"),
            ResultItem::stub("b", "Harbor Market"),
            ResultItem::stub("c", "Night Run"),
        ];
        let msg = ChatMessage::results("Found 3 places", items);
        let payload = msg.payload.expect("results message carries a payload");
        let ids: Vec<_> = payload.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn plain_messages_carry_no_payload() {
        assert!(ChatMessage::user("hi").payload.is_none());
        assert!(ChatMessage::assistant("hello").payload.is_none());
    }
}
