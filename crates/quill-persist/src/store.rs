use async_trait::async_trait;
use chrono::Utc;
use quill_types::{Message, Thread};

use crate::error::Result;

/// Title given to threads created without one, e.g. `Chat 2024-05-01 09:30`.
pub fn default_title() -> String {
    format!("Chat {}", Utc::now().format("%Y-%m-%d %H:%M"))
}

/// Storage for named conversations.
///
/// Operations on an unknown id fail with
/// [`PersistError::ThreadNotFound`](crate::PersistError::ThreadNotFound).
/// Writes to one thread are applied in call order.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Create a thread. A missing or blank `title` gets [`default_title`].
    async fn create_thread(
        &self,
        title: Option<String>,
        initial_message: Option<Message>,
    ) -> Result<Thread>;

    async fn get_thread(&self, thread_id: &str) -> Result<Thread>;

    /// All threads, most recently updated first.
    async fn list_threads(&self) -> Result<Vec<Thread>>;

    async fn append_message(&self, thread_id: &str, message: Message) -> Result<Thread> {
        self.append_messages(thread_id, vec![message]).await
    }

    /// Append `messages` as one write. They land contiguously and in order,
    /// even when other writers target the same thread.
    async fn append_messages(&self, thread_id: &str, messages: Vec<Message>) -> Result<Thread>;

    async fn rename_thread(&self, thread_id: &str, title: &str) -> Result<Thread>;

    async fn delete_thread(&self, thread_id: &str) -> Result<()>;

    /// Messages in conversation order.
    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>>;
}

pub(crate) fn resolve_title(title: Option<String>) -> String {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(default_title)
}
