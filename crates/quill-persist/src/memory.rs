use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use quill_types::{Message, Thread};
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::locks::ThreadLocks;
use crate::store::{resolve_title, ThreadStore};

/// Process-local thread store.
#[derive(Debug, Default)]
pub struct InMemoryThreadStore {
    threads: RwLock<HashMap<String, Thread>>,
    locks: ThreadLocks,
}

impl InMemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn update<F>(&self, thread_id: &str, apply: F) -> Result<Thread>
    where
        F: FnOnce(&mut Thread) + Send,
    {
        let _guard = self.locks.acquire(thread_id).await;
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;

        apply(thread);
        thread.updated_at = Utc::now();
        Ok(thread.clone())
    }
}

#[async_trait]
impl ThreadStore for InMemoryThreadStore {
    async fn create_thread(
        &self,
        title: Option<String>,
        initial_message: Option<Message>,
    ) -> Result<Thread> {
        let mut thread = Thread::new(resolve_title(title));
        thread.messages.extend(initial_message);

        self.threads
            .write()
            .await
            .insert(thread.id.clone(), thread.clone());

        tracing::debug!(thread_id = %thread.id, "Created thread");
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Thread> {
        self.threads
            .read()
            .await
            .get(thread_id)
            .cloned()
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn list_threads(&self) -> Result<Vec<Thread>> {
        let mut threads: Vec<Thread> = self.threads.read().await.values().cloned().collect();
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(threads)
    }

    async fn append_messages(&self, thread_id: &str, messages: Vec<Message>) -> Result<Thread> {
        self.update(thread_id, |thread| thread.messages.extend(messages))
            .await
    }

    async fn rename_thread(&self, thread_id: &str, title: &str) -> Result<Thread> {
        let title = resolve_title(Some(title.to_string()));
        self.update(thread_id, |thread| thread.title = title).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        {
            let _guard = self.locks.acquire(thread_id).await;
            self.threads
                .write()
                .await
                .remove(thread_id)
                .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        }
        self.locks.forget(thread_id);
        Ok(())
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        Ok(self.get_thread(thread_id).await?.messages)
    }
}
