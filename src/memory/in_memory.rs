//! Process-Local Memory Store
//!
//! DashMap-backed store for single-run CLI use and tests. Lock-free
//! concurrent access; nothing survives the process.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{ConversationMemory, MemoryMessage};
use crate::llm::ChatRole;
use crate::types::Result;

/// Thread-safe in-process conversation store
#[derive(Default)]
pub struct InMemoryStore {
    /// thread_id -> resource_id
    threads: DashMap<String, String>,
    /// sub_thread_id -> messages in append order
    messages: DashMap<String, Vec<MemoryMessage>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages held for a sub-thread
    pub fn message_count(&self, sub_thread_id: &str) -> usize {
        self.messages
            .get(sub_thread_id)
            .map(|entry| entry.value().len())
            .unwrap_or(0)
    }

    /// Number of messages across all sub-threads
    pub fn total_messages(&self) -> usize {
        self.messages.iter().map(|entry| entry.value().len()).sum()
    }

    /// Number of registered threads
    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }
}

#[async_trait]
impl ConversationMemory for InMemoryStore {
    async fn ensure_thread(&self, resource_id: &str, thread_id: &str) -> Result<()> {
        self.threads
            .entry(thread_id.to_string())
            .or_insert_with(|| resource_id.to_string());
        Ok(())
    }

    async fn last_messages(
        &self,
        sub_thread_id: &str,
        limit: usize,
    ) -> Result<Vec<MemoryMessage>> {
        Ok(self
            .messages
            .get(sub_thread_id)
            .map(|entry| {
                let messages = entry.value();
                let start = messages.len().saturating_sub(limit);
                messages[start..].to_vec()
            })
            .unwrap_or_default())
    }

    async fn append_message(
        &self,
        sub_thread_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<()> {
        self.messages
            .entry(sub_thread_id.to_string())
            .or_default()
            .push(MemoryMessage::new(role, content));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_read_in_order() {
        let store = InMemoryStore::new();
        store.append_message("t1_summary", ChatRole::User, "first").await.unwrap();
        store
            .append_message("t1_summary", ChatRole::Assistant, "second")
            .await
            .unwrap();

        let messages = store.last_messages("t1_summary", 10).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "first");
        assert_eq!(messages[1].content, "second");
        assert_eq!(messages[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_limit_keeps_most_recent() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            store
                .append_message("t1_detail", ChatRole::User, &format!("msg {}", i))
                .await
                .unwrap();
        }

        let messages = store.last_messages("t1_detail", 3).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "msg 2");
        assert_eq!(messages[2].content, "msg 4");
    }

    #[tokio::test]
    async fn test_unknown_sub_thread_reads_empty() {
        let store = InMemoryStore::new();
        let messages = store.last_messages("nope", 10).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_sub_threads_are_isolated() {
        let store = InMemoryStore::new();
        store.append_message("t1_analyzer", ChatRole::User, "a").await.unwrap();
        store.append_message("t1_summary", ChatRole::User, "b").await.unwrap();

        assert_eq!(store.message_count("t1_analyzer"), 1);
        assert_eq!(store.message_count("t1_summary"), 1);
        let analyzer = store.last_messages("t1_analyzer", 10).await.unwrap();
        assert_eq!(analyzer[0].content, "a");
    }

    #[tokio::test]
    async fn test_ensure_thread_idempotent() {
        let store = InMemoryStore::new();
        store.ensure_thread("res-1", "t1").await.unwrap();
        store.ensure_thread("res-1", "t1").await.unwrap();
        assert_eq!(store.thread_count(), 1);
    }
}
