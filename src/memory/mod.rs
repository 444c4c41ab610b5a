//! Conversation Memory
//!
//! Each pipeline stage keeps its own context in a per-stage sub-thread
//! (`{thread}_analyzer`, `{thread}_summary`, `{thread}_detail`). The store
//! is a consumed interface: this crate ships a process-local default and
//! callers may plug in a durable backend behind the same trait.
//!
//! Memory is best-effort for the pipeline: a failed recall or append is
//! logged and the stage proceeds without it.
//!
//! Within one run each stage writes only its own sub-thread, so stages never
//! contend. Two runs sharing a thread id may interleave appends; that race
//! is accepted rather than locked against.

pub mod in_memory;

pub use in_memory::InMemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::llm::ChatRole;
use crate::types::Result;

/// One remembered message in a sub-thread
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryMessage {
    pub role: ChatRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MemoryMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Shared memory store handle for use across pipeline stages
pub type SharedMemory = Arc<dyn ConversationMemory + Send + Sync>;

/// Store interface the pipeline consumes
#[async_trait]
pub trait ConversationMemory: Send + Sync {
    /// Register a thread under a resource; safe to call repeatedly
    async fn ensure_thread(&self, resource_id: &str, thread_id: &str) -> Result<()>;

    /// Most recent `limit` messages of a sub-thread, oldest first.
    /// Unknown sub-threads read back empty.
    async fn last_messages(&self, sub_thread_id: &str, limit: usize)
    -> Result<Vec<MemoryMessage>>;

    /// Append one message to a sub-thread, creating it if needed
    async fn append_message(
        &self,
        sub_thread_id: &str,
        role: ChatRole,
        content: &str,
    ) -> Result<()>;
}
