//! Conversation types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sidetalk_protocol::Jid;
use uuid::Uuid;

/// Which side wrote a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

/// Message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub direction: Direction,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(direction: Direction, body: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            direction,
            body,
            sent_at: Utc::now(),
        }
    }

    pub fn incoming(body: String) -> Self {
        Self::new(Direction::Incoming, body)
    }

    pub fn outgoing(body: String) -> Self {
        Self::new(Direction::Outgoing, body)
    }
}

/// One-to-one conversation with a contact. Sending and receiving happen
/// elsewhere; this only keeps the history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub peer: Jid,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(peer: Jid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            peer,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
