use async_trait::async_trait;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection};
use quill_types::{Message, Thread};

use super::models::{MongoMessage, MongoThread};
use crate::error::{PersistError, Result};
use crate::locks::ThreadLocks;
use crate::store::{resolve_title, ThreadStore};

/// MongoDB-backed thread store using the `threads` and `messages` collections.
pub struct MongoThreadStore {
    threads: Collection<MongoThread>,
    messages: Collection<MongoMessage>,
    locks: ThreadLocks,
}

impl MongoThreadStore {
    /// Connect to MongoDB and create the store
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        Ok(Self::with_client(&client, database))
    }

    pub fn with_client(client: &Client, database: &str) -> Self {
        let db = client.database(database);
        Self {
            threads: db.collection("threads"),
            messages: db.collection("messages"),
            locks: ThreadLocks::new(),
        }
    }

    async fn find_thread(&self, thread_id: &str) -> Result<MongoThread> {
        self.threads
            .find_one(doc! { "_id": thread_id })
            .await?
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))
    }

    async fn load_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let messages: Vec<MongoMessage> = self
            .messages
            .find(doc! { "thread_id": thread_id })
            .sort(doc! { "seq": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages.into_iter().map(Message::from).collect())
    }

    async fn touch(&self, thread_id: &str) -> Result<()> {
        let now = bson::to_bson(&Utc::now())?;
        self.threads
            .update_one(doc! { "_id": thread_id }, doc! { "$set": { "updated_at": now } })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ThreadStore for MongoThreadStore {
    async fn create_thread(
        &self,
        title: Option<String>,
        initial_message: Option<Message>,
    ) -> Result<Thread> {
        let mut thread = Thread::new(resolve_title(title));
        self.threads.insert_one(MongoThread::from(&thread)).await?;

        if let Some(message) = initial_message {
            self.messages
                .insert_one(MongoMessage::new(&thread.id, message.clone(), 0))
                .await?;
            thread.messages.push(message);
        }

        tracing::debug!(thread_id = %thread.id, "Created thread");
        Ok(thread)
    }

    async fn get_thread(&self, thread_id: &str) -> Result<Thread> {
        let row = self.find_thread(thread_id).await?;
        let messages = self.load_messages(thread_id).await?;
        Ok(row.into_thread(messages))
    }

    async fn list_threads(&self) -> Result<Vec<Thread>> {
        let rows: Vec<MongoThread> = self
            .threads
            .find(doc! {})
            .sort(doc! { "updated_at": -1 })
            .await?
            .try_collect()
            .await?;

        let mut threads = Vec::with_capacity(rows.len());
        for row in rows {
            let messages = self.load_messages(&row.id).await?;
            threads.push(row.into_thread(messages));
        }
        Ok(threads)
    }

    async fn append_messages(&self, thread_id: &str, messages: Vec<Message>) -> Result<Thread> {
        let _guard = self.locks.acquire(thread_id).await;
        self.find_thread(thread_id).await?;

        if !messages.is_empty() {
            let next_seq = self
                .messages
                .count_documents(doc! { "thread_id": thread_id })
                .await? as i64;
            let rows: Vec<MongoMessage> = messages
                .into_iter()
                .zip(next_seq..)
                .map(|(message, seq)| MongoMessage::new(thread_id, message, seq))
                .collect();
            self.messages.insert_many(rows).await?;
            self.touch(thread_id).await?;
        }

        self.get_thread(thread_id).await
    }

    async fn rename_thread(&self, thread_id: &str, title: &str) -> Result<Thread> {
        let _guard = self.locks.acquire(thread_id).await;
        let title = resolve_title(Some(title.to_string()));
        let now = bson::to_bson(&Utc::now())?;

        let result = self
            .threads
            .update_one(
                doc! { "_id": thread_id },
                doc! { "$set": { "title": title, "updated_at": now } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }

        self.get_thread(thread_id).await
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        {
            let _guard = self.locks.acquire(thread_id).await;
            let result = self.threads.delete_one(doc! { "_id": thread_id }).await?;
            if result.deleted_count == 0 {
                return Err(PersistError::ThreadNotFound(thread_id.to_string()));
            }
            self.messages
                .delete_many(doc! { "thread_id": thread_id })
                .await?;
        }
        self.locks.forget(thread_id);
        Ok(())
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        self.find_thread(thread_id).await?;
        self.load_messages(thread_id).await
    }
}
