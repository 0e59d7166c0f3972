use chrono::{DateTime, Utc};
use quill_types::{Message, Role, Thread};
use serde::{Deserialize, Serialize};

/// Row in the `threads` collection. Messages live in their own collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row in the `messages` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub thread_id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Insertion sequence within the thread.
    pub seq: i64,
}

impl MongoThread {
    pub fn into_thread(self, messages: Vec<Message>) -> Thread {
        Thread {
            id: self.id,
            title: self.title,
            messages,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<&Thread> for MongoThread {
    fn from(thread: &Thread) -> Self {
        Self {
            id: thread.id.clone(),
            title: thread.title.clone(),
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

impl MongoMessage {
    pub fn new(thread_id: &str, message: Message, seq: i64) -> Self {
        Self {
            id: message.id,
            thread_id: thread_id.to_string(),
            role: message.role,
            content: message.content,
            timestamp: message.timestamp,
            seq,
        }
    }
}

impl From<MongoMessage> for Message {
    fn from(msg: MongoMessage) -> Self {
        Self {
            id: msg.id,
            role: msg.role,
            content: msg.content,
            timestamp: msg.timestamp,
        }
    }
}
